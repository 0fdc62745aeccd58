//! # cvtpl-export
//!
//! Batch export of CV documents: load data records, render them through a
//! template, and write `<out_dir>/<slug>.html` with hash-gated atomic writes.
//!
//! Call [`pipeline::run`] with an [`ExportScope`] to export, or
//! [`pipeline::diff`] to preview the changes as unified diffs.

pub mod data;
pub mod diff;
pub mod error;
pub mod hash_store;
pub mod pipeline;
pub mod writer;

pub use data::DataRecord;
pub use diff::{diff_export, ExportDiff, FileDiff};
pub use error::ExportError;
pub use pipeline::{resolve_template, ExportScope};
pub use writer::{atomic_write, export_records, ExportOptions, ExportResult, WriteResult};
