//! Atomic writer and export orchestration.
//!
//! ## `atomic_write`: 6-step protocol
//!
//! 1. Normalise line endings to LF.
//! 2. SHA-256 hash the normalised content.
//! 3. Compare with the stored hash → skip if identical.
//! 4. Write to `<path>.cvtpl.tmp`.
//! 5. Rename to the final path (atomic on POSIX); remove the temp on failure.
//! 6. Update the hash store entry (the caller saves the store).

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use chrono::Utc;

use cvtpl_core::{CvTemplate, Orientation};
use cvtpl_renderer::{CvRenderer, DocumentOptions};

use crate::data::DataRecord;
use crate::error::{io_err, ExportError};
use crate::hash_store;

// ---------------------------------------------------------------------------
// Write result
// ---------------------------------------------------------------------------

/// Outcome of an individual file write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteResult {
    /// File was written (content changed or did not previously exist).
    Written { path: PathBuf },
    /// File was skipped; rendered content matches the stored hash.
    Unchanged { path: PathBuf },
    /// Dry run: the file *would* have been written.
    WouldWrite { path: PathBuf },
}

impl WriteResult {
    pub fn path(&self) -> &Path {
        match self {
            WriteResult::Written { path }
            | WriteResult::Unchanged { path }
            | WriteResult::WouldWrite { path } => path,
        }
    }
}

// ---------------------------------------------------------------------------
// atomic_write
// ---------------------------------------------------------------------------

/// Atomically write one rendered file, gated on `hash_store`.
pub fn atomic_write(
    path: &Path,
    content: &str,
    hash_store: &mut hash_store::HashStore,
    dry_run: bool,
) -> Result<WriteResult, ExportError> {
    let tmp = PathBuf::from(format!("{}.cvtpl.tmp", path.display()));
    atomic_write_with_tmp(path, content, hash_store, dry_run, &tmp)
}

fn atomic_write_with_tmp(
    path: &Path,
    content: &str,
    hash_store: &mut hash_store::HashStore,
    dry_run: bool,
    tmp: &Path,
) -> Result<WriteResult, ExportError> {
    let normalized = normalize_line_endings(content);
    let digest = hash_store::digest(&normalized);

    let key = path.to_string_lossy().to_string();
    if hash_store.get(&key) == Some(&digest) && path.exists() {
        tracing::debug!("unchanged: {}", path.display());
        return Ok(WriteResult::Unchanged {
            path: path.to_path_buf(),
        });
    }

    if dry_run {
        tracing::info!("[dry-run] would write: {}", path.display());
        return Ok(WriteResult::WouldWrite {
            path: path.to_path_buf(),
        });
    }

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| io_err(parent, e))?;
    }
    if let Some(tmp_parent) = tmp.parent() {
        std::fs::create_dir_all(tmp_parent).map_err(|e| io_err(tmp_parent, e))?;
    }
    std::fs::write(tmp, &normalized).map_err(|e| io_err(tmp, e))?;

    if let Err(e) = std::fs::rename(tmp, path) {
        let _ = std::fs::remove_file(tmp);
        return Err(io_err(path, e));
    }

    hash_store.insert(key, digest);

    tracing::info!("wrote: {}", path.display());
    Ok(WriteResult::Written {
        path: path.to_path_buf(),
    })
}

pub(crate) fn normalize_line_endings(content: &str) -> String {
    content.replace("\r\n", "\n")
}

// ---------------------------------------------------------------------------
// Rendering records
// ---------------------------------------------------------------------------

/// How records are rendered and where they land.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportOptions {
    pub out_dir: PathBuf,
    /// Overrides the template's own orientation.
    pub orientation: Option<Orientation>,
    pub dry_run: bool,
}

impl ExportOptions {
    pub fn new(out_dir: impl Into<PathBuf>) -> Self {
        ExportOptions {
            out_dir: out_dir.into(),
            orientation: None,
            dry_run: false,
        }
    }
}

/// `opts.out_dir` resolved against the current directory.
///
/// Hash-store keys are output paths, so they must name the same file no
/// matter where the export runs from.
pub(crate) fn absolute_out_dir(opts: &ExportOptions) -> Result<PathBuf, ExportError> {
    std::path::absolute(&opts.out_dir).map_err(|e| io_err(&opts.out_dir, e))
}

/// Render every record into `(output_path, document)` pairs.
///
/// Paths are absolute. Output names come from [`DataRecord::slug`]; a
/// repeated slug gets a `-2`, `-3`, … suffix in record order.
pub(crate) fn render_records(
    renderer: &CvRenderer,
    template: &CvTemplate,
    records: &[DataRecord],
    opts: &ExportOptions,
) -> Result<Vec<(PathBuf, String)>, ExportError> {
    let doc_opts = DocumentOptions::with_orientation(opts.orientation.unwrap_or(template.orientation));
    let out_dir = absolute_out_dir(opts)?;
    let mut taken = HashSet::new();
    let mut outputs = Vec::with_capacity(records.len());

    for record in records {
        let base = record.slug();
        let mut slug = base.clone();
        let mut n = 2;
        while !taken.insert(slug.clone()) {
            slug = format!("{base}-{n}");
            n += 1;
        }
        let html = renderer.render_document(&template.html, &record.record, &doc_opts)?;
        outputs.push((out_dir.join(format!("{slug}.html")), html));
    }
    Ok(outputs)
}

// ---------------------------------------------------------------------------
// export_records
// ---------------------------------------------------------------------------

/// Outcome of exporting one template over a set of records.
#[derive(Debug)]
pub struct ExportResult {
    pub template_name: String,
    pub writes: Vec<WriteResult>,
}

impl ExportResult {
    pub fn written(&self) -> usize {
        self.writes
            .iter()
            .filter(|w| matches!(w, WriteResult::Written { .. }))
            .count()
    }
}

/// Render `template` for each record and write `<out_dir>/<slug>.html`.
///
/// Writes are hash-gated against `~/.cvtpl/hashes/<template>.json`; a dry run
/// touches neither the output files nor the hash store.
pub fn export_records(
    home: &Path,
    renderer: &CvRenderer,
    template: &CvTemplate,
    records: &[DataRecord],
    opts: &ExportOptions,
) -> Result<ExportResult, ExportError> {
    let started_at = Utc::now();
    let name = template.name.0.as_str();
    let mut store = hash_store::load_at(home, name)?;
    let mut writes = Vec::with_capacity(records.len());

    for (path, html) in render_records(renderer, template, records, opts)? {
        writes.push(atomic_write(&path, &html, &mut store.files, opts.dry_run)?);
    }

    if !opts.dry_run {
        store.exported_at = Some(started_at);
        hash_store::save_at(home, name, &store)?;
    }

    Ok(ExportResult {
        template_name: name.to_string(),
        writes,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
