//! cvtpl core library: data record access, domain types, template library,
//! configuration, errors.
//!
//! - [`value`] — dotted-path resolution, truthiness, stringification
//! - [`types`] — [`Orientation`], [`CvTemplate`] and newtypes
//! - [`library`] — load / save / list stored templates
//! - [`config`] — `~/.cvtpl/config.yaml`
//! - [`error`] — [`LibraryError`], [`ConfigError`]

pub mod config;
pub mod error;
pub mod library;
pub mod types;
pub mod value;

pub use config::Config;
pub use error::{ConfigError, LibraryError};
pub use types::{CvTemplate, Orientation, TemplateName};
