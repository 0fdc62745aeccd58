//! Error types for cvtpl-export.

use std::path::PathBuf;

use thiserror::Error;

use cvtpl_core::{ConfigError, LibraryError};
use cvtpl_renderer::RenderError;

/// All errors that can arise from export operations.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("render error: {0}")]
    Render(#[from] RenderError),

    #[error("template library error: {0}")]
    Library(#[from] LibraryError),

    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// An I/O error, with annotated path for context.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// JSON serialization/deserialization error (hash store).
    #[error("hash store JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A data file that is neither `.json`, `.yaml` nor `.yml`.
    #[error("unsupported data file {path}: expected .json, .yaml or .yml")]
    UnsupportedData { path: PathBuf },

    #[error("failed to parse JSON data file {path}: {source}")]
    DataJson {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to parse YAML data file {path}: {source}")]
    DataYaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// A directory scope with no data files in it.
    #[error("no data files found in {path}")]
    NoData { path: PathBuf },
}

/// Convenience constructor for [`ExportError::Io`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> ExportError {
    ExportError::Io {
        path: path.into(),
        source,
    }
}
