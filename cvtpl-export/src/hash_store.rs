//! Hash store: SHA-256 idempotency tracking for exported CV files.
//!
//! One JSON document per template at `<home>/.cvtpl/hashes/<template>.json`,
//! mapping output paths to the digest of the content last written there.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use cvtpl_core::config;

use crate::error::{io_err, ExportError};

/// Output path string → last exported SHA-256 hex digest.
pub type HashStore = BTreeMap<String, String>;

/// On-disk hash store payload.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HashStoreFile {
    /// When the last real (non-dry-run) export finished; `None` before the first.
    #[serde(default)]
    pub exported_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub files: HashStore,
}

impl HashStoreFile {
    pub fn empty() -> Self {
        HashStoreFile {
            exported_at: None,
            files: HashStore::new(),
        }
    }
}

/// SHA-256 hex digest of `content`.
pub fn digest(content: &str) -> String {
    let mut h = Sha256::new();
    h.update(content.as_bytes());
    hex::encode(h.finalize())
}

/// `~/.cvtpl/hashes/<template_name>.json`
pub fn store_path_at(home: &Path, template_name: &str) -> PathBuf {
    config::root_at(home)
        .join("hashes")
        .join(format!("{template_name}.json"))
}

/// Load the hash store for `template_name`; empty if it does not exist yet.
pub fn load_at(home: &Path, template_name: &str) -> Result<HashStoreFile, ExportError> {
    let path = store_path_at(home, template_name);
    if !path.exists() {
        return Ok(HashStoreFile::empty());
    }
    let contents = std::fs::read_to_string(&path).map_err(|e| io_err(&path, e))?;
    Ok(serde_json::from_str(&contents)?)
}

/// Save the hash store atomically (`<path>.tmp` then rename).
pub fn save_at(home: &Path, template_name: &str, store: &HashStoreFile) -> Result<(), ExportError> {
    let path = store_path_at(home, template_name);
    let Some(dir) = path.parent() else {
        return Err(io_err(path, std::io::Error::other("invalid hash store path")));
    };
    std::fs::create_dir_all(dir).map_err(|e| io_err(dir, e))?;

    let json = serde_json::to_string_pretty(store)?;
    let tmp = path.with_extension("json.tmp");
    std::fs::write(&tmp, &json).map_err(|e| io_err(&tmp, e))?;
    if let Err(e) = std::fs::rename(&tmp, &path) {
        let _ = std::fs::remove_file(&tmp);
        return Err(io_err(&path, e));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn empty_store_when_file_missing() {
        let tmp = TempDir::new().unwrap();
        let store = load_at(tmp.path(), "nonexistent").unwrap();
        assert_eq!(store, HashStoreFile::empty());
    }

    #[test]
    fn roundtrip_save_load() {
        let tmp = TempDir::new().unwrap();
        let mut store = HashStoreFile::empty();
        store.exported_at = Some(Utc::now());
        store.files.insert("/out/ann-lee.html".to_string(), digest("<p>Ann</p>"));

        save_at(tmp.path(), "modern", &store).unwrap();
        assert!(tmp.path().join(".cvtpl/hashes/modern.json").exists());
        assert_eq!(load_at(tmp.path(), "modern").unwrap(), store);
        assert!(
            !store_path_at(tmp.path(), "modern").with_extension("json.tmp").exists(),
            "tmp file should be removed after atomic rename"
        );
    }

    #[test]
    fn tolerates_missing_fields() {
        let tmp = TempDir::new().unwrap();
        let path = store_path_at(tmp.path(), "sparse");
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, r#"{"files":{"a.html":"deadbeef"}}"#).unwrap();

        let loaded = load_at(tmp.path(), "sparse").unwrap();
        assert_eq!(loaded.files.get("a.html").map(String::as_str), Some("deadbeef"));
        assert!(loaded.exported_at.is_none());
    }

    #[test]
    fn corrupt_store_is_an_error() {
        let tmp = TempDir::new().unwrap();
        let path = store_path_at(tmp.path(), "broken");
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, "{not json").unwrap();
        assert!(matches!(load_at(tmp.path(), "broken"), Err(ExportError::Json(_))));
    }

    #[test]
    fn digest_is_stable_hex() {
        let d = digest("abc");
        assert_eq!(d.len(), 64);
        assert_eq!(d, digest("abc"));
        assert_ne!(d, digest("abd"));
    }
}
