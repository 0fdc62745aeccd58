//! Subcommand implementations.

pub mod diff;
pub mod export;
pub mod filters;
pub mod render;
pub mod template;

use std::path::PathBuf;

use anyhow::{Context, Result};

pub(crate) fn home_dir() -> Result<PathBuf> {
    dirs::home_dir().context("could not determine home directory")
}
