//! Directory-backed blob store: one `<key>.json` file per key.

use crate::domain::error::JournalError;
use crate::ports::blob_port::BlobStore;
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;
use tracing::debug;

pub struct FileBlobStore {
    base_path: PathBuf,
}

impl FileBlobStore {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn blob_path(&self, key: &str) -> Result<PathBuf, JournalError> {
        let safe = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !safe {
            return Err(JournalError::storage(format!(
                "key {key:?} must be non-empty and use only letters, digits, '_' or '-'"
            )));
        }
        Ok(self.base_path.join(format!("{}.json", key)))
    }
}

impl BlobStore for FileBlobStore {
    fn get(&self, key: &str) -> Result<Option<String>, JournalError> {
        let path = self.blob_path(key)?;
        match fs::read_to_string(&path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(JournalError::storage(format!(
                "failed to read {}: {}",
                path.display(),
                e
            ))),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), JournalError> {
        let path = self.blob_path(key)?;
        fs::create_dir_all(&self.base_path).map_err(|e| {
            JournalError::storage(format!(
                "failed to create {}: {}",
                self.base_path.display(),
                e
            ))
        })?;

        // staged write; the rename swaps the blob in whole
        let staging = path.with_extension("json.tmp");
        fs::write(&staging, value).map_err(|e| {
            JournalError::storage(format!("failed to write {}: {}", staging.display(), e))
        })?;
        fs::rename(&staging, &path).map_err(|e| {
            JournalError::storage(format!("failed to replace {}: {}", path.display(), e))
        })?;
        debug!(path = %path.display(), bytes = value.len(), "blob written");
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), JournalError> {
        let path = self.blob_path(key)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(JournalError::storage(format!(
                "failed to remove {}: {}",
                path.display(),
                e
            ))),
        }
    }
}
