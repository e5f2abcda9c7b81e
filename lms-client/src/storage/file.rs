//! JSON file backed key-value store

use super::KeyValueStore;
use lms_core::{storage_error, ErrorContext, LmsError, LmsResult};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::{debug, warn};

/// Stores all keys in a single JSON object on disk.
///
/// Every write rewrites the file through a temporary sibling and a rename,
/// so a crash never leaves a half-written file behind.
pub struct FileStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileStore {
    /// Create a store at `path`, creating parent directories as needed
    pub fn new<P: AsRef<Path>>(path: P) -> LmsResult<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| LmsError::Storage {
                message: format!("Failed to create storage directory: {}", e),
                source: Some(Box::new(e)),
                context: ErrorContext::new("file_store")
                    .with_operation("new")
                    .with_metadata("path", &parent.display().to_string()),
            })?;
        }

        debug!("Key-value storage at {}", path.display());
        Ok(Self {
            path,
            lock: Mutex::new(()),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> LmsResult<BTreeMap<String, String>> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(e) => return Err(storage_error!("Failed to read storage file", "file_store", e)),
        };

        if content.trim().is_empty() {
            return Ok(BTreeMap::new());
        }

        match serde_json::from_str(&content) {
            Ok(entries) => Ok(entries),
            Err(e) => {
                warn!(
                    "Ignoring unreadable storage file {}: {}",
                    self.path.display(),
                    e
                );
                Ok(BTreeMap::new())
            }
        }
    }

    fn write_all(&self, entries: &BTreeMap<String, String>) -> LmsResult<()> {
        let json = serde_json::to_string_pretty(entries)?;
        let tmp = self.path.with_extension("json.tmp");

        std::fs::write(&tmp, json)
            .map_err(|e| storage_error!("Failed to write storage file", "file_store", e))?;
        std::fs::rename(&tmp, &self.path)
            .map_err(|e| storage_error!("Failed to replace storage file", "file_store", e))?;

        Ok(())
    }

    fn update<F>(&self, apply: F) -> LmsResult<()>
    where
        F: FnOnce(&mut BTreeMap<String, String>) -> bool,
    {
        let _guard = self.lock.lock().unwrap_or_else(|e| e.into_inner());
        let mut entries = self.read_all()?;
        if apply(&mut entries) {
            self.write_all(&entries)?;
        }
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> LmsResult<Option<String>> {
        let _guard = self.lock.lock().unwrap_or_else(|e| e.into_inner());
        Ok(self.read_all()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> LmsResult<()> {
        self.update(|entries| {
            entries.insert(key.to_string(), value.to_string());
            true
        })
    }

    fn remove(&self, key: &str) -> LmsResult<()> {
        self.update(|entries| entries.remove(key).is_some())
    }

    fn set_many(&self, batch: &[(&str, &str)]) -> LmsResult<()> {
        self.update(|entries| {
            for (key, value) in batch {
                entries.insert(key.to_string(), value.to_string());
            }
            !batch.is_empty()
        })
    }

    fn remove_many(&self, keys: &[&str]) -> LmsResult<()> {
        self.update(|entries| {
            let mut changed = false;
            for key in keys {
                changed |= entries.remove(*key).is_some();
            }
            changed
        })
    }
}
