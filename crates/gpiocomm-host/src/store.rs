//! Persistent key-value storage for replay blobs and the host identifier.

use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::debug;

use crate::error::{HostError, Result};

/// String key-value store that outlives a session.
pub trait KeyValueStore {
    /// Value under `key`, if any.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Replace the value under `key`.
    fn set(&mut self, key: &str, value: &str) -> Result<()>;
}

/// In-memory store. Clones share the same map.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: Arc<Mutex<BTreeMap<String, String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of keys held.
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.lock().get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.entries
            .lock()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Store backed by a JSON object file.
///
/// The file is read once on open and rewritten on every `set`. A missing
/// file is an empty store.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    entries: BTreeMap<String, String>,
}

impl FileStore {
    /// Open (or lazily create) the store at `path`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let entries = match std::fs::read(&path) {
            Ok(raw) if raw.iter().all(u8::is_ascii_whitespace) => BTreeMap::new(),
            Ok(raw) => serde_json::from_slice(&raw)?,
            Err(err) if err.kind() == ErrorKind::NotFound => BTreeMap::new(),
            Err(err) => {
                return Err(HostError::Store(format!(
                    "failed reading {}: {err}",
                    path.display()
                )))
            }
        };
        debug!(path = ?path, keys = entries.len(), "opened file store");
        Ok(Self { path, entries })
    }

    /// Backing file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self) -> Result<()> {
        let raw = serde_json::to_vec_pretty(&self.entries)?;
        std::fs::write(&self.path, raw).map_err(|err| {
            HostError::Store(format!("failed writing {}: {err}", self.path.display()))
        })
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.entries.insert(key.to_string(), value.to_string());
        self.persist()
    }
}
