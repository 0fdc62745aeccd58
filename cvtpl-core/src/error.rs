//! Error types for cvtpl-core.

use std::path::PathBuf;

use thiserror::Error;

/// All errors that can arise from template library operations.
#[derive(Debug, Error)]
pub enum LibraryError {
    /// Underlying I/O failure (file not found, permission denied, etc.).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML serialization error (write/save path).
    #[error("YAML serialization error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// YAML parse error on load; includes file path and line context from serde_yaml.
    #[error("failed to parse template at {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// No template file exists under the requested name.
    #[error("template not found at {path}")]
    TemplateNotFound { path: PathBuf },

    /// Template names end up as file names: letters, digits, `-` and `_` only.
    #[error("invalid template name '{0}'")]
    InvalidName(String),
}

/// Errors from loading `~/.cvtpl/config.yaml`.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error reading config at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config at {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}
