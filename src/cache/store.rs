//! Key-value stores backing the client's persisted state
//!
//! The cache and favorites are persisted as serialized blobs under fixed
//! keys. `FileStore` keeps one file per key in an XDG-compliant cache
//! directory; `MemoryStore` is used in tests and for throwaway sessions.

use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

use directories::ProjectDirs;
use parking_lot::Mutex;
use thiserror::Error;

/// Errors that can occur when persisting client state
#[derive(Debug, Error)]
pub enum StoreError {
    /// Reading or writing the backing file failed
    #[error("Storage I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// The value could not be serialized
    #[error("Failed to serialize stored value: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Minimal string key-value interface for persisted client state
pub trait KeyValueStore: Send + Sync {
    /// Returns the value stored under `key`, if any
    fn get(&self, key: &str) -> Option<String>;

    /// Stores `value` under `key`, replacing any previous value
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;
}

/// In-memory store
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.lock().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.entries.lock().insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Stores each key as a JSON file on disk
///
/// Uses `~/.cache/skyexplorer/` on Linux, or the equivalent XDG path on other
/// platforms.
#[derive(Debug, Clone)]
pub struct FileStore {
    /// Directory where store files are kept
    dir: PathBuf,
}

impl FileStore {
    /// Creates a FileStore in the platform cache directory
    ///
    /// Returns `None` if the cache directory cannot be determined (e.g., no home directory).
    pub fn new() -> Option<Self> {
        let project_dirs = ProjectDirs::from("", "", "skyexplorer")?;
        Some(Self {
            dir: project_dirs.cache_dir().to_path_buf(),
        })
    }

    /// Creates a FileStore rooted at a custom directory
    pub fn with_dir(dir: PathBuf) -> Self {
        Self { dir }
    }

    /// Returns the path of the file holding `key`
    fn path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        match fs::read_to_string(self.path(key)) {
            Ok(content) => Some(content),
            Err(e) if e.kind() == ErrorKind::NotFound => None,
            Err(e) => {
                tracing::warn!(key, error = %e, "failed to read stored value");
                None
            }
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        fs::create_dir_all(&self.dir)?;
        fs::write(self.path(key), value)?;
        Ok(())
    }
}
