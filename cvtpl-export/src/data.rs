//! Data record loading: JSON / YAML files into [`serde_json::Value`] records.

use std::path::{Path, PathBuf};

use serde_json::Value;

use cvtpl_core::value::{resolve, stringify};
use cvtpl_renderer::unwrap_employee;

use crate::error::{io_err, ExportError};

/// Extensions recognised as data files.
pub const DATA_EXTENSIONS: &[&str] = &["json", "yaml", "yml"];

/// One data record and the file it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct DataRecord {
    pub source: PathBuf,
    pub record: Value,
}

impl DataRecord {
    /// File-name-safe identifier: `firstName-lastName`, else the file stem.
    pub fn slug(&self) -> String {
        let name = ["firstName", "lastName"]
            .iter()
            .map(|key| stringify(resolve(&self.record, key)))
            .collect::<Vec<_>>()
            .join(" ");
        let slug = slugify(&name);
        if !slug.is_empty() {
            return slug;
        }
        let stem = self
            .source
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        match slugify(&stem) {
            s if s.is_empty() => "cv".to_string(),
            s => s,
        }
    }
}

/// Lower-case, runs of non-alphanumerics collapsed to a single `-`.
pub fn slugify(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if c.is_alphanumeric() {
            out.extend(c.to_lowercase());
        } else if !out.is_empty() && !out.ends_with('-') {
            out.push('-');
        }
    }
    out.trim_end_matches('-').to_string()
}

/// Whether `path` carries one of [`DATA_EXTENSIONS`].
pub fn is_data_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| DATA_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
}

/// Read and parse one data file. A lone root `employee` mapping is unwrapped.
pub fn load_record(path: &Path) -> Result<DataRecord, ExportError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    let contents = || std::fs::read_to_string(path).map_err(|e| io_err(path, e));

    let record: Value = match ext.as_deref() {
        Some("json") => serde_json::from_str(&contents()?).map_err(|source| ExportError::DataJson {
            path: path.to_path_buf(),
            source,
        })?,
        Some("yaml" | "yml") => serde_yaml::from_str(&contents()?).map_err(|source| ExportError::DataYaml {
            path: path.to_path_buf(),
            source,
        })?,
        _ => {
            return Err(ExportError::UnsupportedData {
                path: path.to_path_buf(),
            })
        }
    };

    tracing::debug!("loaded data record from {}", path.display());
    Ok(DataRecord {
        source: path.to_path_buf(),
        record: unwrap_employee(record),
    })
}

/// Load every data file directly inside `dir`, sorted by file name.
///
/// Subdirectories and files with other extensions are skipped.
pub fn load_dir(dir: &Path) -> Result<Vec<DataRecord>, ExportError> {
    let entries = std::fs::read_dir(dir).map_err(|e| io_err(dir, e))?;
    let mut paths = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| io_err(dir, e))?;
        let path = entry.path();
        if path.is_file() && is_data_file(&path) {
            paths.push(path);
        }
    }
    if paths.is_empty() {
        return Err(ExportError::NoData {
            path: dir.to_path_buf(),
        });
    }
    paths.sort();
    paths.iter().map(|p| load_record(p)).collect()
}
