//! On-disk CV template library.
//!
//! # Storage layout
//!
//! ```text
//! ~/.cvtpl/
//!   templates/
//!     <template_name>.yaml   (one file per template — mode 0600)
//! ```
//!
//! # API pattern
//!
//! Every function takes an explicit `home: &Path`; the CLI passes
//! `dirs::home_dir()` and tests pass a `TempDir`.

use std::path::{Path, PathBuf};

use chrono::Utc;

use crate::error::LibraryError;
use crate::types::{CvTemplate, Orientation, TemplateName};

// ---------------------------------------------------------------------------
// 1. Path helpers
// ---------------------------------------------------------------------------

/// `<home>/.cvtpl/templates/`
///
/// Creates the directory (mode `0700`) if it does not yet exist.
pub fn templates_dir_at(home: &Path) -> Result<PathBuf, LibraryError> {
    let dir = home.join(".cvtpl").join("templates");
    if !dir.exists() {
        std::fs::create_dir_all(&dir)?;
        set_dir_permissions(&dir)?;
    }
    Ok(dir)
}

/// `<home>/.cvtpl/templates/<name>.yaml`. Pure, no I/O.
pub fn template_path_at(home: &Path, name: &TemplateName) -> PathBuf {
    home.join(".cvtpl")
        .join("templates")
        .join(format!("{}.yaml", name.0))
}

/// Names are non-empty and made of letters, digits, `-` and `_`.
fn validate_name(name: &TemplateName) -> Result<(), LibraryError> {
    let raw = name.0.as_str();
    let valid = !raw.is_empty()
        && raw.chars().all(|c| c.is_alphanumeric() || c == '-' || c == '_');
    if !valid {
        return Err(LibraryError::InvalidName(raw.to_string()));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// 2. Load
// ---------------------------------------------------------------------------

/// Load a single template from `<home>/.cvtpl/templates/<name>.yaml`.
///
/// Returns `LibraryError::TemplateNotFound` if absent,
/// `LibraryError::Parse` (with path + line context) if malformed YAML.
pub fn load_template_at(home: &Path, name: &TemplateName) -> Result<CvTemplate, LibraryError> {
    validate_name(name)?;
    let path = template_path_at(home, name);
    if !path.exists() {
        return Err(LibraryError::TemplateNotFound { path });
    }
    let contents = std::fs::read_to_string(&path)?;
    serde_yaml::from_str(&contents).map_err(|e| LibraryError::Parse { path, source: e })
}


/// Read every `<home>/.cvtpl/templates/*.yaml`, sorted by template name.
pub fn list_templates_at(home: &Path) -> Result<Vec<CvTemplate>, LibraryError> {
    let dir = home.join(".cvtpl").join("templates");
    if !dir.exists() {
        return Ok(vec![]);
    }

    let mut entries: Vec<_> = std::fs::read_dir(&dir)?
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().map(|t| t.is_file()).unwrap_or(false))
        .collect();
    entries.sort_by_key(|e| e.file_name());

    let mut templates = Vec::new();
    for entry in entries {
        let fname = entry.file_name();
        if !fname.to_string_lossy().ends_with(".yaml") {
            continue;
        }
        let contents = std::fs::read_to_string(entry.path())?;
        let template: CvTemplate = serde_yaml::from_str(&contents)
            .map_err(|e| LibraryError::Parse { path: entry.path(), source: e })?;
        templates.push(template);
    }
    templates.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(templates)
}


// ---------------------------------------------------------------------------
// 3. Save
// ---------------------------------------------------------------------------

/// Atomically save a template to `<home>/.cvtpl/templates/<name>.yaml`.
///
/// Write flow: serialize → `.yaml.tmp` sibling → `chmod 0600` → `rename`.
pub fn save_template_at(home: &Path, template: &CvTemplate) -> Result<(), LibraryError> {
    validate_name(&template.name)?;
    templates_dir_at(home)?;
    let path = template_path_at(home, &template.name);
    let tmp_path = path.with_file_name(format!("{}.yaml.tmp", template.name.0));

    let yaml = serde_yaml::to_string(template)?;
    std::fs::write(&tmp_path, yaml)?;
    set_file_permissions(&tmp_path)?;
    if let Err(e) = std::fs::rename(&tmp_path, &path) {
        let _ = std::fs::remove_file(&tmp_path);
        return Err(e.into());
    }
    Ok(())
}


// ---------------------------------------------------------------------------
// 4. Add / remove
// ---------------------------------------------------------------------------

/// Store `html` under `name`.
///
/// Idempotent: without `replace`, an existing template is loaded and returned
/// unchanged. With `replace`, the stored body is overwritten while
/// `created_at` is preserved.
pub fn add_template_at(
    home: &Path,
    name: TemplateName,
    html: String,
    orientation: Orientation,
    description: Option<String>,
    replace: bool,
) -> Result<CvTemplate, LibraryError> {
    validate_name(&name)?;
    let now = Utc::now();
    let path = template_path_at(home, &name);

    let created_at = if path.exists() {
        let existing = load_template_at(home, &name)?;
        if !replace {
            return Ok(existing);
        }
        existing.created_at
    } else {
        now
    };

    let template = CvTemplate {
        name,
        orientation,
        description,
        html,
        created_at,
        updated_at: now,
    };
    save_template_at(home, &template)?;
    Ok(template)
}


/// Delete `<home>/.cvtpl/templates/<name>.yaml`.
pub fn remove_template_at(home: &Path, name: &TemplateName) -> Result<(), LibraryError> {
    validate_name(name)?;
    let path = template_path_at(home, name);
    if !path.exists() {
        return Err(LibraryError::TemplateNotFound { path });
    }
    std::fs::remove_file(&path)?;
    Ok(())
}


// ---------------------------------------------------------------------------
// Private helpers
// ---------------------------------------------------------------------------

#[cfg(unix)]
fn set_dir_permissions(path: &Path) -> Result<(), LibraryError> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o700))?;
    Ok(())
}
#[cfg(not(unix))]
fn set_dir_permissions(_path: &Path) -> Result<(), LibraryError> {
    Ok(())
}

#[cfg(unix)]
fn set_file_permissions(path: &Path) -> Result<(), LibraryError> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))?;
    Ok(())
}
#[cfg(not(unix))]
fn set_file_permissions(_path: &Path) -> Result<(), LibraryError> {
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
