//! Shared export entrypoints used by `cvtpl export` and `cvtpl diff`.

use std::path::{Path, PathBuf};

use chrono::Utc;

use cvtpl_core::{config, library, Config, CvTemplate, TemplateName};
use cvtpl_renderer::CvRenderer;

use crate::data::{self, DataRecord};
use crate::diff::{diff_export, ExportDiff};
use crate::error::{io_err, ExportError};
use crate::writer::{export_records, ExportOptions, ExportResult};

/// Which data files an export reads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportScope {
    /// A single `.json` / `.yaml` / `.yml` file.
    File(PathBuf),
    /// Every data file directly inside a directory.
    Directory(PathBuf),
}

impl ExportScope {
    /// `Directory` when `path` is a directory, `File` otherwise.
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        if path.is_dir() {
            ExportScope::Directory(path)
        } else {
            ExportScope::File(path)
        }
    }

    pub fn load(&self) -> Result<Vec<DataRecord>, ExportError> {
        match self {
            ExportScope::File(path) => Ok(vec![data::load_record(path)?]),
            ExportScope::Directory(dir) => data::load_dir(dir),
        }
    }
}

/// Resolve `spec` to a template: a path to an existing `.html` file, or the
/// name of a template stored in the library under `home`.
///
/// A file template is named after its stem and uses the configured default
/// orientation.
pub fn resolve_template(home: &Path, spec: &str, config: &Config) -> Result<CvTemplate, ExportError> {
    let path = Path::new(spec);
    let is_html = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("html") || e.eq_ignore_ascii_case("htm"));

    if is_html && path.is_file() {
        let html = std::fs::read_to_string(path).map_err(|e| io_err(path, e))?;
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "template".to_string());
        let now = Utc::now();
        return Ok(CvTemplate {
            name: TemplateName(data::slugify(&stem)),
            orientation: config.default_orientation,
            description: None,
            html,
            created_at: now,
            updated_at: now,
        });
    }

    Ok(library::load_template_at(home, &TemplateName::from(spec))?)
}

/// Load the config under `home` and build a renderer from it.
pub fn renderer_at(home: &Path) -> Result<(Config, CvRenderer), ExportError> {
    let config = config::load_at(home)?;
    let renderer = CvRenderer::with_config(&config)?;
    Ok((config, renderer))
}

/// Export `template` over every record in `scope`.
pub fn run(
    home: &Path,
    template: &CvTemplate,
    scope: &ExportScope,
    opts: &ExportOptions,
) -> Result<ExportResult, ExportError> {
    let (_, renderer) = renderer_at(home)?;
    let records = scope.load()?;
    tracing::debug!(
        template = %template.name,
        records = records.len(),
        dry_run = opts.dry_run,
        "exporting"
    );
    export_records(home, &renderer, template, &records, opts)
}

/// Diff `template` over every record in `scope` against `opts.out_dir`.
pub fn diff(
    home: &Path,
    template: &CvTemplate,
    scope: &ExportScope,
    opts: &ExportOptions,
) -> Result<ExportDiff, ExportError> {
    let (_, renderer) = renderer_at(home)?;
    let records = scope.load()?;
    diff_export(&renderer, template, &records, opts)
}
