//! # Snapshot Persistence Port
//!
//! An explicit, injectable key-value port owned by the session reconciler -
//! the replacement for ambient global browser storage. Nothing else in the
//! subsystem touches persistence; everything depends on the reconciler's
//! in-memory session value and its change subscription.
//!
//! The port mirrors web-storage semantics: string keys to string values,
//! best-effort durability, reads of missing keys are simply `None`.
//! Implementations log I/O trouble and carry on rather than failing the
//! session mutation that triggered the write.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Mutex;

/// Key-value persistence for session snapshots
pub trait SnapshotStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str);
    fn remove(&self, key: &str);
}

/// In-memory store - the default for tests and for embedders that opt out of
/// cross-restart session restore
#[derive(Debug, Default)]
pub struct MemoryStore {
    map: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SnapshotStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.map.lock().expect("snapshot store poisoned").get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) {
        self.map
            .lock()
            .expect("snapshot store poisoned")
            .insert(key.to_string(), value.to_string());
    }

    fn remove(&self, key: &str) {
        self.map.lock().expect("snapshot store poisoned").remove(key);
    }
}

/// File-backed store: one JSON object on disk, rewritten on every mutation
///
/// Snapshots are tiny (two short keys), so rewriting the whole file keeps each
/// write atomic from the caller's perspective without any incremental format.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    map: Mutex<HashMap<String, String>>,
}

impl FileStore {
    /// Open (or create) the store at `path`. An unreadable or malformed file
    /// starts empty - stale snapshots are not worth failing startup over.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let map = match std::fs::read_to_string(&path) {
            Ok(contents) => serde_json::from_str(&contents).unwrap_or_else(|e| {
                tracing::warn!(path = %path.display(), "discarding malformed snapshot file: {}", e);
                HashMap::new()
            }),
            Err(_) => HashMap::new(),
        };
        FileStore {
            path,
            map: Mutex::new(map),
        }
    }

    fn flush(&self, map: &HashMap<String, String>) {
        let json = match serde_json::to_string(map) {
            Ok(json) => json,
            Err(e) => {
                tracing::warn!("could not serialize snapshot store: {}", e);
                return;
            }
        };
        if let Err(e) = std::fs::write(&self.path, json) {
            tracing::warn!(path = %self.path.display(), "could not persist snapshot store: {}", e);
        }
    }
}

impl SnapshotStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.map.lock().expect("snapshot store poisoned").get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) {
        let mut map = self.map.lock().expect("snapshot store poisoned");
        map.insert(key.to_string(), value.to_string());
        self.flush(&map);
    }

    fn remove(&self, key: &str) {
        let mut map = self.map.lock().expect("snapshot store poisoned");
        map.remove(key);
        self.flush(&map);
    }
}
