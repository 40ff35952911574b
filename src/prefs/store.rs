//! Key-Value Persistence Port
//!
//! Where UI preferences live between runs: a JSON file for the CLI, memory
//! for tests and embedders.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use thiserror::Error;

/// Errors raised by a preference store
#[derive(Error, Debug)]
pub enum PrefsError {
    #[error("Failed to access preferences file {path:?}: {error}")]
    Io { path: PathBuf, error: String },

    #[error("Corrupt preferences file {path:?}: {error}")]
    Parse { path: PathBuf, error: String },

    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: String, value: String },

    #[error("Preference store lock poisoned")]
    Lock,
}

/// Minimal string key-value store
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, PrefsError>;
    fn set(&self, key: &str, value: &str) -> Result<(), PrefsError>;
}

/// In-memory store
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: Mutex<BTreeMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, PrefsError> {
        let values = self.values.lock().map_err(|_| PrefsError::Lock)?;
        Ok(values.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), PrefsError> {
        let mut values = self.values.lock().map_err(|_| PrefsError::Lock)?;
        values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// JSON object on disk, rewritten on every `set`
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    values: Mutex<BTreeMap<String, String>>,
}

impl FileStore {
    /// Open (or lazily create) the store at `path`
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, PrefsError> {
        let path = path.into();
        let values = if path.exists() {
            let content = std::fs::read_to_string(&path).map_err(|e| PrefsError::Io {
                path: path.clone(),
                error: e.to_string(),
            })?;
            if content.trim().is_empty() {
                BTreeMap::new()
            } else {
                serde_json::from_str(&content).map_err(|e| PrefsError::Parse {
                    path: path.clone(),
                    error: e.to_string(),
                })?
            }
        } else {
            BTreeMap::new()
        };

        tracing::debug!(path = ?path, entries = values.len(), "Preferences loaded");
        Ok(Self {
            path,
            values: Mutex::new(values),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self, values: &BTreeMap<String, String>) -> Result<(), PrefsError> {
        let io_err = |e: std::io::Error| PrefsError::Io {
            path: self.path.clone(),
            error: e.to_string(),
        };

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(io_err)?;
            }
        }

        let content = serde_json::to_string_pretty(values).map_err(|e| PrefsError::Parse {
            path: self.path.clone(),
            error: e.to_string(),
        })?;

        // Write-then-rename so a crash never leaves half a file
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, content).map_err(io_err)?;
        std::fs::rename(&tmp, &self.path).map_err(io_err)?;
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, PrefsError> {
        let values = self.values.lock().map_err(|_| PrefsError::Lock)?;
        Ok(values.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), PrefsError> {
        let mut values = self.values.lock().map_err(|_| PrefsError::Lock)?;
        values.insert(key.to_string(), value.to_string());
        self.persist(&values)
    }
}
