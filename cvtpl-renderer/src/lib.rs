//! # cvtpl-renderer
//!
//! Directive processor that turns a CV HTML template plus a data record into
//! finished HTML: conditionals, equality helpers, loops, variables with
//! filters, then orientation styling.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use cvtpl_renderer::{CvRenderer, DocumentOptions};
//! use serde_json::json;
//!
//! fn render(template: &str) -> Result<String, cvtpl_renderer::RenderError> {
//!     let renderer = CvRenderer::new()?;
//!     let data = json!({ "firstName": "Ann", "skills": [{ "name": "Rust", "level": 9 }] });
//!     renderer.render_document(template, &data, &DocumentOptions::default())
//! }
//! ```

pub mod context;
pub mod date;
pub mod directives;
pub mod engine;
pub mod error;
pub mod filters;
pub mod orientation;

pub use context::{unwrap_employee, EmployeeProfile};
pub use engine::{CvRenderer, DocumentOptions, TemplateProcessor};
pub use error::{FilterError, RenderError};
pub use filters::{apply_filter, Filter};
pub use orientation::apply_orientation;
