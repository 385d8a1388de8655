//! Key-value persistence adapter.
//!
//! A deliberately thin surface: `read` returns `None` for anything missing
//! or unreadable, `write` flushes immediately. Callers that persist
//! low-severity state (calibration) log write failures and move on; callers
//! with user data (the record store) propagate them.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage io: {0}")]
    Io(#[from] std::io::Error),
}

pub trait Storage {
    fn read(&self, key: &str) -> Option<String>;
    fn write(&self, key: &str, value: &str) -> Result<(), StorageError>;
}

/// In-memory store for tests and scripted sessions.
#[derive(Default)]
pub struct MemoryStorage {
    map: RefCell<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Storage for MemoryStorage {
    fn read(&self, key: &str) -> Option<String> {
        self.map.borrow().get(key).cloned()
    }

    fn write(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.map.borrow_mut().insert(key.into(), value.into());
        Ok(())
    }
}

/// One file per key under a data directory.
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    pub fn open(dir: impl AsRef<Path>) -> Result<Self, StorageError> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl Storage for FileStorage {
    fn read(&self, key: &str) -> Option<String> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(s) => Some(s),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
            Err(e) => {
                log::warn!("storage read {key:?} failed: {e}");
                None
            }
        }
    }

    fn write(&self, key: &str, value: &str) -> Result<(), StorageError> {
        fs::write(self.path_for(key), value)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_round_trip_and_missing_key() {
        let s = MemoryStorage::new();
        assert_eq!(s.read("nope"), None);
        s.write("k", "v").unwrap();
        assert_eq!(s.read("k").as_deref(), Some("v"));
    }

    #[test]
    fn file_storage_round_trip() {
        let dir = std::env::temp_dir().join(format!("tapeline-storage-{}", std::process::id()));
        let s = FileStorage::open(&dir).unwrap();
        assert_eq!(s.read("bias"), None);
        s.write("bias", "{\"weight\":1.5}").unwrap();
        assert_eq!(s.read("bias").as_deref(), Some("{\"weight\":1.5}"));
        let _ = fs::remove_dir_all(dir);
    }
}
