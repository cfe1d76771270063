use crate::error::{GeoTrackerError, TrackerResult};
use crate::storage::KeyValueStore;
use chrono::{Local, NaiveTime, Timelike};
use std::sync::{Arc, Mutex};

/// Storage key holding the full rendered log text
pub const LOG_STORAGE_KEY: &str = "log";

/// Separator between rendered entries; the log is displayed as HTML
pub const ENTRY_SEPARATOR: &str = "<br>";

/// Single timestamped log line; immutable once appended
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    time: NaiveTime,
    message: String,
}

impl LogEntry {
    /// Entry stamped with the current local time of day
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            time: Local::now().time(),
            message: message.into(),
        }
    }

    /// Entry at an explicit time, for deterministic tests
    pub fn at(time: NaiveTime, message: impl Into<String>) -> Self {
        Self {
            time,
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Rendered form: `[HH:MM:SS.mmm] message`, zero-padded
    pub fn render(&self) -> String {
        format!(
            "[{:02}:{:02}:{:02}.{:03}] {}",
            self.time.hour(),
            self.time.minute(),
            self.time.second(),
            self.time.nanosecond() / 1_000_000,
            self.message
        )
    }
}

/// Append-only log over injected durable storage. The persisted text always
/// equals the in-memory text when a mutating call returns: the storage write
/// happens inside the same lock hold, and the in-memory copy is only updated
/// after the write succeeds.
pub struct LogStore {
    storage: Arc<dyn KeyValueStore>,
    text: Mutex<String>,
}

impl LogStore {
    /// Load the persisted log once at startup; missing entry means empty.
    pub fn load(storage: Arc<dyn KeyValueStore>) -> TrackerResult<Self> {
        let text = storage.get(LOG_STORAGE_KEY)?.unwrap_or_default();
        Ok(Self {
            storage,
            text: Mutex::new(text),
        })
    }

    /// Prepend a rendered entry (newest first), persist the full text, and
    /// mirror the message to the diagnostic channel.
    pub fn append(&self, entry: LogEntry) -> TrackerResult<()> {
        log::info!("{}", entry.message());

        let mut text = self.lock_text()?;
        let updated = format!("{}{}{}", entry.render(), ENTRY_SEPARATOR, *text);
        self.storage.set(LOG_STORAGE_KEY, &updated)?;
        *text = updated;
        Ok(())
    }

    /// Reset to empty and persist the empty state
    pub fn clear(&self) -> TrackerResult<()> {
        let mut text = self.lock_text()?;
        self.storage.set(LOG_STORAGE_KEY, "")?;
        text.clear();
        Ok(())
    }

    /// Current full log text, newest entry first
    pub fn rendered(&self) -> TrackerResult<String> {
        Ok(self.lock_text()?.clone())
    }

    /// Number of entries currently in the log
    pub fn entry_count(&self) -> TrackerResult<usize> {
        Ok(self.lock_text()?.matches(ENTRY_SEPARATOR).count())
    }

    fn lock_text(&self) -> TrackerResult<std::sync::MutexGuard<'_, String>> {
        self.text
            .lock()
            .map_err(|_| GeoTrackerError::Internal("Failed to acquire log lock".to_string()))
    }
}
