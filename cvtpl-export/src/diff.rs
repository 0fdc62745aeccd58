//! Unified diffs between what an export would write and what is on disk.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use similar::TextDiff;

use cvtpl_core::CvTemplate;
use cvtpl_renderer::CvRenderer;

use crate::data::DataRecord;
use crate::error::{io_err, ExportError};
use crate::writer::{absolute_out_dir, normalize_line_endings, render_records, ExportOptions};

/// A single rendered file diff.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileDiff {
    pub path: PathBuf,
    pub unified_diff: String,
}

/// Diff result for one template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportDiff {
    pub template_name: String,
    pub diffs: Vec<FileDiff>,
}

/// Render `template` for each record and compare with the current files
/// under `opts.out_dir`. Missing files diff against empty content.
///
/// No files are written.
pub fn diff_export(
    renderer: &CvRenderer,
    template: &CvTemplate,
    records: &[DataRecord],
    opts: &ExportOptions,
) -> Result<ExportDiff, ExportError> {
    let out_dir = absolute_out_dir(opts)?;
    let mut diffs = Vec::new();

    for (path, rendered) in render_records(renderer, template, records, opts)? {
        let rendered = normalize_line_endings(&rendered);
        let existing = read_existing_or_empty(&path)?;
        if existing == rendered {
            continue;
        }

        let relative = path.strip_prefix(&out_dir).unwrap_or(path.as_path());
        let old_header = format!("a/{}", relative.display());
        let new_header = format!("b/{}", relative.display());
        let unified = TextDiff::from_lines(&existing, &rendered)
            .unified_diff()
            .header(&old_header, &new_header)
            .context_radius(3)
            .to_string();

        diffs.push(FileDiff {
            path,
            unified_diff: unified,
        });
    }

    Ok(ExportDiff {
        template_name: template.name.0.clone(),
        diffs,
    })
}

fn read_existing_or_empty(path: &Path) -> Result<String, ExportError> {
    match std::fs::read_to_string(path) {
        Ok(content) => Ok(normalize_line_endings(&content)),
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(String::new()),
        Err(err) => Err(io_err(path, err)),
    }
}
