// Geo tracker core
// Tracking-session state machine and persisted log pipeline for a
// two-strategy (foreground polling / background continuous) location demo

pub mod controller;
pub mod error;
pub mod log_store;
pub mod options;
pub mod provider;
pub mod session;
pub mod simulated;
pub mod storage;

pub use controller::{AppController, LifecycleEvent, START_LABEL, STOP_LABEL};
pub use error::{GeoTrackerError, TrackerResult};
pub use log_store::{LogEntry, LogStore, LOG_STORAGE_KEY};
pub use options::{
    DesiredAccuracy, JsPollingOptions, NativeBackgroundOptions, RawOptions, Strategy,
    TrackingOptions,
};
pub use provider::{
    BackgroundProvider, EmailRequest, Fix, FixCallbacks, FixError, ForegroundProvider,
    MailComposer, WatchHandle,
};
pub use session::{SessionState, TrackingSession};
pub use simulated::{SimulatedBackgroundProvider, SimulatedForegroundProvider};
pub use storage::{FileStore, KeyValueStore, MemoryStore};
