use crate::error::{GeoTrackerError, TrackerResult};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Mutex;

/// Durable string-keyed storage, injected into the log pipeline.
/// Writes are synchronous: when `set` returns, the value is durable.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> TrackerResult<Option<String>>;
    fn set(&self, key: &str, value: &str) -> TrackerResult<()>;
}

/// In-memory store for tests and ephemeral runs
#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> TrackerResult<Option<String>> {
        let entries = self
            .entries
            .lock()
            .map_err(|_| GeoTrackerError::Internal("Failed to acquire store lock".to_string()))?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> TrackerResult<()> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| GeoTrackerError::Internal("Failed to acquire store lock".to_string()))?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// File-backed store persisting the key-value map as one JSON object.
/// Absent file reads as an empty map.
pub struct FileStore {
    path: PathBuf,
    entries: Mutex<HashMap<String, String>>,
}

impl FileStore {
    pub fn open(path: impl Into<PathBuf>) -> TrackerResult<Self> {
        let path = path.into();

        let entries = match std::fs::read_to_string(&path) {
            Ok(contents) => serde_json::from_str(&contents).map_err(|e| {
                GeoTrackerError::Storage(format!("Corrupt store file {}: {e}", path.display()))
            })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => HashMap::new(),
            Err(e) => {
                return Err(GeoTrackerError::Storage(format!(
                    "Failed to read {}: {e}",
                    path.display()
                )))
            }
        };

        Ok(Self {
            path,
            entries: Mutex::new(entries),
        })
    }

    fn flush(&self, entries: &HashMap<String, String>) -> TrackerResult<()> {
        let json = serde_json::to_string_pretty(entries)
            .map_err(|e| GeoTrackerError::Storage(format!("Failed to serialize store: {e}")))?;

        std::fs::write(&self.path, json).map_err(|e| {
            GeoTrackerError::Storage(format!("Failed to write {}: {e}", self.path.display()))
        })
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> TrackerResult<Option<String>> {
        let entries = self
            .entries
            .lock()
            .map_err(|_| GeoTrackerError::Internal("Failed to acquire store lock".to_string()))?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> TrackerResult<()> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| GeoTrackerError::Internal("Failed to acquire store lock".to_string()))?;
        entries.insert(key.to_string(), value.to_string());
        self.flush(&entries)
    }
}
