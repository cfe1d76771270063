use thiserror::Error;

/// Geo tracker error types
#[derive(Error, Debug, Clone)]
pub enum GeoTrackerError {
    #[error("Invalid option: {0}")]
    InvalidOption(String),

    #[error("Tracking already active")]
    AlreadyTracking,

    #[error("Provider failed to start: {0}")]
    ProviderStart(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Mail composer error: {0}")]
    Mail(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type for tracker operations
pub type TrackerResult<T> = Result<T, GeoTrackerError>;
