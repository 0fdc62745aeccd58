//! User configuration at `~/.cvtpl/config.yaml`.
//!
//! Every key is optional; a missing file yields [`Config::default`].
//!
//! ```yaml
//! default_orientation: landscape
//! date_format: "MMMM yyyy"
//! export_dir: /home/ann/cvs
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::types::Orientation;

/// Date pattern used by date filters when a directive names none.
pub const DEFAULT_DATE_FORMAT: &str = "MMM yyyy";

/// Resolved cvtpl configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Orientation for templates and renders that do not specify one.
    pub default_orientation: Orientation,
    /// date-fns style pattern for `formatDate`, `formatDateRange` and `this.dateRange`.
    pub date_format: String,
    /// Default output directory for `cvtpl export`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub export_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            default_orientation: Orientation::Portrait,
            date_format: DEFAULT_DATE_FORMAT.to_string(),
            export_dir: None,
        }
    }
}

/// `<home>/.cvtpl`
pub fn root_at(home: &Path) -> PathBuf {
    home.join(".cvtpl")
}

/// `<home>/.cvtpl/config.yaml`. Pure, no I/O.
pub fn config_path_at(home: &Path) -> PathBuf {
    root_at(home).join("config.yaml")
}

/// Load the config rooted at `home`, falling back to defaults when absent.
pub fn load_at(home: &Path) -> Result<Config, ConfigError> {
    let path = config_path_at(home);
    if !path.exists() {
        return Ok(Config::default());
    }
    let contents = std::fs::read_to_string(&path).map_err(|source| ConfigError::Io {
        path: path.clone(),
        source,
    })?;
    if contents.trim().is_empty() {
        return Ok(Config::default());
    }
    serde_yaml::from_str(&contents).map_err(|source| ConfigError::Parse { path, source })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_config(home: &Path, contents: &str) {
        let path = config_path_at(home);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, contents).unwrap();
    }

    #[test]
    fn missing_file_yields_defaults() {
        let home = TempDir::new().unwrap();
        let config = load_at(home.path()).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.date_format, "MMM yyyy");
    }

    #[test]
    fn partial_file_keeps_remaining_defaults() {
        let home = TempDir::new().unwrap();
        write_config(home.path(), "default_orientation: landscape\n");
        let config = load_at(home.path()).unwrap();
        assert_eq!(config.default_orientation, Orientation::Landscape);
        assert_eq!(config.date_format, DEFAULT_DATE_FORMAT);
        assert!(config.export_dir.is_none());
    }

    #[test]
    fn empty_file_yields_defaults() {
        let home = TempDir::new().unwrap();
        write_config(home.path(), "\n");
        assert_eq!(load_at(home.path()).unwrap(), Config::default());
    }

    #[test]
    fn malformed_file_reports_path() {
        let home = TempDir::new().unwrap();
        write_config(home.path(), "default_orientation: [sideways\n");
        let err = load_at(home.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }), "got: {err}");
        assert!(err.to_string().contains("config.yaml"));
    }
}
