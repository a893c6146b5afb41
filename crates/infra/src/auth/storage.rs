//! Key/value stores backing the credential lifecycle
//!
//! - [`MemoryStore`]: process-local map, entries never expire
//! - [`ExpiringStore`]: cookie-like map whose entries lapse after their TTL
//! - [`FileStore`]: JSON document on disk that survives restarts

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use edubrain_common::SharedClock;
use edubrain_core::KeyValueStore;
use edubrain_domain::{ClientError, Result};
use parking_lot::{Mutex, RwLock};
use tracing::{debug, warn};

use crate::errors::InfraError;

/// In-memory store; TTLs are ignored.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.read().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str, _ttl: Option<Duration>) -> Result<()> {
        self.entries.write().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.entries.write().remove(key);
        Ok(())
    }
}

/// Store whose entries expire, measured on the injected clock.
pub struct ExpiringStore {
    entries: Mutex<HashMap<String, (String, Option<Instant>)>>,
    clock: SharedClock,
}

impl ExpiringStore {
    pub fn new(clock: SharedClock) -> Self {
        Self { entries: Mutex::new(HashMap::new()), clock }
    }
}

impl KeyValueStore for ExpiringStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let now = self.clock.now();
        let mut entries = self.entries.lock();
        match entries.get(key) {
            Some((_, Some(deadline))) if now >= *deadline => {
                debug!(key, "expiring stored entry");
                entries.remove(key);
                Ok(None)
            }
            Some((value, _)) => Ok(Some(value.clone())),
            None => Ok(None),
        }
    }

    fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> Result<()> {
        let deadline = ttl.map(|ttl| self.clock.now() + ttl);
        self.entries.lock().insert(key.to_string(), (value.to_string(), deadline));
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.entries.lock().remove(key);
        Ok(())
    }
}

/// Durable store persisted as a flat JSON object.
///
/// The whole document is rewritten on every change via a temporary file and
/// rename. TTLs are ignored.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    entries: Mutex<HashMap<String, String>>,
}

impl FileStore {
    /// Open `path`, creating an empty store when the file does not exist.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let entries = if path.exists() {
            let contents = fs::read_to_string(&path).map_err(InfraError::from)?;
            if contents.trim().is_empty() {
                HashMap::new()
            } else {
                serde_json::from_str(&contents).map_err(|e| {
                    ClientError::storage(format!("corrupt store {}: {e}", path.display()))
                })?
            }
        } else {
            HashMap::new()
        };

        debug!(path = %path.display(), entries = entries.len(), "opened file store");
        Ok(Self { path, entries: Mutex::new(entries) })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self, entries: &HashMap<String, String>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(InfraError::from)?;
            }
        }

        let contents = serde_json::to_string_pretty(entries)?;
        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, contents).map_err(InfraError::from)?;
        fs::rename(&tmp, &self.path).map_err(|err| {
            warn!(path = %self.path.display(), error = %err, "failed to replace store file");
            ClientError::from(InfraError::from(err))
        })
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.lock().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str, _ttl: Option<Duration>) -> Result<()> {
        let mut entries = self.entries.lock();
        entries.insert(key.to_string(), value.to_string());
        self.persist(&entries)
    }

    fn remove(&self, key: &str) -> Result<()> {
        let mut entries = self.entries.lock();
        if entries.remove(key).is_some() {
            self.persist(&entries)?;
        }
        Ok(())
    }
}
