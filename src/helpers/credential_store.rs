// Credential store for SpotControl
// Keeps the Spotify tokens in a single JSON file next to the server.
// The file is not encrypted.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use log::{debug, info};
use tempfile::NamedTempFile;
use thiserror::Error;

use crate::data::CredentialRecord;

// Error type for credential store operations
#[derive(Error, Debug)]
pub enum CredentialStoreError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Malformed credential file {}: {source}", path.display())]
    Malformed {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

// Type alias for results
pub type Result<T> = std::result::Result<T, CredentialStoreError>;

/// File backed store for the credential record
#[derive(Debug, Clone)]
pub struct CredentialStore {
    file_path: PathBuf,
}

impl CredentialStore {
    pub fn new<P: Into<PathBuf>>(file_path: P) -> Self {
        CredentialStore {
            file_path: file_path.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.file_path
    }

    /// Load the stored record.
    ///
    /// Returns `Ok(None)` if no file exists. A file that exists but does not
    /// parse is reported as [`CredentialStoreError::Malformed`].
    pub fn load(&self) -> Result<Option<CredentialRecord>> {
        if !self.file_path.exists() {
            info!("No credential file found at {}", self.file_path.display());
            return Ok(None);
        }

        let content = fs::read_to_string(&self.file_path)?;
        let record: CredentialRecord = serde_json::from_str(&content).map_err(|source| {
            CredentialStoreError::Malformed {
                path: self.file_path.clone(),
                source,
            }
        })?;

        info!("Credentials loaded from {}", self.file_path.display());
        Ok(Some(record))
    }

    /// Overwrite the stored record.
    ///
    /// The record is written to a temporary file in the same directory and
    /// renamed over the old file, so readers never see a truncated file.
    pub fn save(&self, record: &CredentialRecord) -> Result<()> {
        let parent = match self.file_path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };

        if !parent.exists() {
            fs::create_dir_all(&parent)?;
        }

        let json = serde_json::to_string_pretty(record)?;

        let mut tmp = NamedTempFile::new_in(&parent)?;
        tmp.write_all(json.as_bytes())?;
        tmp.as_file().sync_all()?;
        tmp.persist(&self.file_path).map_err(|e| e.error)?;

        debug!("Credentials written to {}", self.file_path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_load_missing_file() {
        let dir = tempdir().unwrap();
        let store = CredentialStore::new(dir.path().join("spotify-token.json"));
        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = tempdir().unwrap();
        let store = CredentialStore::new(dir.path().join("spotify-token.json"));
        let record = CredentialRecord::new("A1", Some("R1".to_string()), Some(3600));

        store.save(&record).unwrap();
        let loaded = store.load().unwrap().unwrap();

        assert_eq!(loaded, record);
    }

    #[test]
    fn test_save_overwrites_whole_record() {
        let dir = tempdir().unwrap();
        let store = CredentialStore::new(dir.path().join("spotify-token.json"));

        store.save(&CredentialRecord::new("A1", Some("R1".to_string()), Some(3600))).unwrap();
        store.save(&CredentialRecord::new("A2", Some("R2".to_string()), None)).unwrap();

        let loaded = store.load().unwrap().unwrap();
        assert_eq!(loaded.access_token, "A2");
        assert_eq!(loaded.refresh_token.as_deref(), Some("R2"));
        assert_eq!(loaded.expires_in, None);
    }

    #[test]
    fn test_save_leaves_no_temporary_files() {
        let dir = tempdir().unwrap();
        let store = CredentialStore::new(dir.path().join("spotify-token.json"));
        store.save(&CredentialRecord::new("A1", None, None)).unwrap();
        store.save(&CredentialRecord::new("A2", None, None)).unwrap();

        let entries: Vec<_> = fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn test_save_creates_parent_directory() {
        let dir = tempdir().unwrap();
        let store = CredentialStore::new(dir.path().join("nested").join("spotify-token.json"));
        store.save(&CredentialRecord::new("A1", None, None)).unwrap();
        assert!(store.path().exists());
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("spotify-token.json");
        fs::write(&path, "{ not json").unwrap();

        let store = CredentialStore::new(&path);
        match store.load() {
            Err(CredentialStoreError::Malformed { path: p, .. }) => assert_eq!(p, path),
            other => panic!("expected Malformed, got {:?}", other),
        }
    }

    #[test]
    fn test_file_without_access_token_is_malformed() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("spotify-token.json");
        fs::write(&path, r#"{"refreshToken":"R1"}"#).unwrap();

        let store = CredentialStore::new(&path);
        assert!(matches!(store.load(), Err(CredentialStoreError::Malformed { .. })));
    }
}
