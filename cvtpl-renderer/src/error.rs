//! Error types for cvtpl-renderer.

use thiserror::Error;

/// A processing failure. Returned whole: no partially rendered output
/// accompanies it.
#[derive(Debug, Error)]
pub enum RenderError {
    /// A directive pattern failed to compile.
    #[error("template processing failed: invalid directive pattern: {0}")]
    Pattern(#[from] regex::Error),

    /// The data record root is not a mapping.
    #[error("template processing failed: data record must be a mapping, found {found}")]
    InvalidRecord { found: &'static str },

    /// Tera template engine error (document shell).
    #[error("template processing failed: document shell error: {0}")]
    Tera(#[from] tera::Error),

    /// JSON serialization error (building a data record from typed input).
    #[error("template processing failed: record serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Failure inside a single filter body.
///
/// Never escapes the filter library; `apply_filter` logs it and falls back
/// to the stringified raw value.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FilterError {
    #[error("{filter}: invalid argument '{arg}'")]
    InvalidArgument { filter: &'static str, arg: String },

    #[error("{filter}: expected a number, got '{got}'")]
    NotANumber { filter: &'static str, got: String },

    #[error("{filter}: expected a mapping with startDate")]
    NotARange { filter: &'static str },

    #[error("unsupported date pattern token '{0}'")]
    UnknownDateToken(String),

    #[error("unterminated quote in date pattern '{0}'")]
    UnterminatedQuote(String),
}
