use std::collections::HashMap;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing::debug;

use crate::snapshot::SnapshotError;

/// Durable string key-value storage the snapshot store writes through.
///
/// Available for the whole session; implementations need no init or teardown.
pub trait StoragePort: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, SnapshotError>;
    fn set(&self, key: &str, value: &str) -> Result<(), SnapshotError>;
}

/// One file per key (`<dir>/<key>.json`).
///
/// Writes go to a temporary file in the same directory and are renamed into
/// place, so a reader sees either the old value or the new one.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl StoragePort for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>, SnapshotError> {
        let path = self.path_for(key);
        match fs::read_to_string(&path) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(SnapshotError::Storage(format!(
                "failed to read {}: {e}",
                path.display()
            ))),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), SnapshotError> {
        let path = self.path_for(key);
        fs::create_dir_all(&self.dir).map_err(|e| {
            SnapshotError::Storage(format!("failed to create {}: {e}", self.dir.display()))
        })?;

        let mut tmp = tempfile::NamedTempFile::new_in(&self.dir)
            .map_err(|e| SnapshotError::Storage(format!("failed to create temp file: {e}")))?;
        tmp.write_all(value.as_bytes())
            .map_err(|e| SnapshotError::Storage(format!("failed to write snapshot: {e}")))?;
        tmp.persist(&path).map_err(|e| {
            SnapshotError::Storage(format!("failed to persist {}: {}", path.display(), e.error))
        })?;

        debug!(path = %path.display(), bytes = value.len(), "Wrote storage key");
        Ok(())
    }
}

/// In-process storage for tests and throwaway sessions.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-seeds a raw value, bypassing the snapshot encoder.
    pub fn with_entry(key: &str, value: &str) -> Self {
        let storage = Self::new();
        storage
            .entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .insert(key.to_string(), value.to_string());
        storage
    }
}

impl StoragePort for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>, SnapshotError> {
        let entries = self
            .entries
            .lock()
            .map_err(|_| SnapshotError::Storage("memory storage lock poisoned".to_string()))?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), SnapshotError> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| SnapshotError::Storage("memory storage lock poisoned".to_string()))?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_storage_missing_key_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path());
        assert_eq!(storage.get("resumeData").unwrap(), None);
    }

    #[test]
    fn test_file_storage_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path().join("nested"));
        storage.set("resumeData", "first").unwrap();
        storage.set("resumeData", "second").unwrap();
        assert_eq!(storage.get("resumeData").unwrap().as_deref(), Some("second"));
        assert!(dir.path().join("nested").join("resumeData.json").exists());
    }

    #[test]
    fn test_file_storage_leaves_no_temp_files() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path());
        storage.set("resumeData", "{}").unwrap();
        let names: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().into_string().unwrap())
            .collect();
        assert_eq!(names, vec!["resumeData.json".to_string()]);
    }

    #[test]
    fn test_memory_storage_round_trip() {
        let storage = MemoryStorage::new();
        assert_eq!(storage.get("k").unwrap(), None);
        storage.set("k", "v").unwrap();
        assert_eq!(storage.get("k").unwrap().as_deref(), Some("v"));
        assert_eq!(
            MemoryStorage::with_entry("a", "b").get("a").unwrap().as_deref(),
            Some("b")
        );
    }
}
