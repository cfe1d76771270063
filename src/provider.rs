use crate::error::TrackerResult;
use crate::options::{JsPollingOptions, NativeBackgroundOptions};
use serde::{Deserialize, Serialize};

/// Single location measurement delivered by a provider
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Fix {
    pub latitude: f64,
    pub longitude: f64,
    pub accuracy: f64,
    pub speed: f64,
}

impl Fix {
    pub fn new(latitude: f64, longitude: f64, accuracy: f64, speed: f64) -> Self {
        Self {
            latitude,
            longitude,
            accuracy,
            speed,
        }
    }

    /// Log line for a received fix, raw payload values verbatim
    pub fn log_line(&self) -> String {
        format!(
            "Lat: {} Lng: {} Acc: {} Spd: {}",
            self.latitude, self.longitude, self.accuracy, self.speed
        )
    }
}

/// Error payload reported by a provider for an in-progress session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FixError {
    /// Numeric code, present for the foreground provider only
    pub code: Option<i32>,
    pub message: String,
}

impl FixError {
    pub fn with_code(code: i32, message: impl Into<String>) -> Self {
        Self {
            code: Some(code),
            message: message.into(),
        }
    }

    pub fn message_only(message: impl Into<String>) -> Self {
        Self {
            code: None,
            message: message.into(),
        }
    }

    pub fn log_line(&self) -> String {
        match self.code {
            Some(code) => format!("Error {}: {}", code, self.message),
            None => format!("Error: {}", self.message),
        }
    }
}

/// Subscription handle returned by the foreground provider
pub type WatchHandle = u64;

/// Callback pair a provider invokes for fix and error deliveries
pub struct FixCallbacks {
    pub on_fix: Box<dyn Fn(Fix) + Send + Sync>,
    pub on_error: Box<dyn Fn(FixError) + Send + Sync>,
}

impl FixCallbacks {
    pub fn new<F, E>(on_fix: F, on_error: E) -> Self
    where
        F: Fn(Fix) + Send + Sync + 'static,
        E: Fn(FixError) + Send + Sync + 'static,
    {
        Self {
            on_fix: Box::new(on_fix),
            on_error: Box::new(on_error),
        }
    }
}

/// Foreground polling provider: per-subscription watch with a cancel handle
pub trait ForegroundProvider: Send + Sync {
    /// Begin delivering fixes; the handle cancels this watch later.
    /// Delivery is asynchronous: implementations must not invoke the
    /// callbacks from inside this call.
    fn start_watch(
        &self,
        callbacks: FixCallbacks,
        options: &JsPollingOptions,
    ) -> TrackerResult<WatchHandle>;

    fn stop_watch(&self, handle: WatchHandle);
}

/// Background continuous provider: a global singleton toggle
pub trait BackgroundProvider: Send + Sync {
    /// Register callbacks and options ahead of `start`. Asynchronous
    /// delivery only, as with the foreground provider.
    fn configure(
        &self,
        callbacks: FixCallbacks,
        options: &NativeBackgroundOptions,
    ) -> TrackerResult<()>;

    fn start(&self) -> TrackerResult<()>;

    fn stop(&self);

    /// Must be called once per delivered fix after processing; the native
    /// side stalls further delivery until it sees the acknowledgement.
    fn acknowledge_fix_processed(&self);
}

/// Outgoing email request handed to the platform mail composer
#[derive(Debug, Clone)]
pub struct EmailRequest {
    pub subject: String,
    pub body: String,
    pub is_html: bool,
}

/// Platform mail composer seam; no result is consumed beyond errors
pub trait MailComposer: Send + Sync {
    fn compose(&self, request: EmailRequest) -> TrackerResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fix_log_line_keeps_raw_precision() {
        let fix = Fix::new(52.520008, 13.404954, 12.5, 0.0);
        assert_eq!(
            fix.log_line(),
            "Lat: 52.520008 Lng: 13.404954 Acc: 12.5 Spd: 0"
        );
    }

    #[test]
    fn test_fix_log_line_integral_values() {
        let fix = Fix::new(1.0, 2.0, 3.0, 4.0);
        assert_eq!(fix.log_line(), "Lat: 1 Lng: 2 Acc: 3 Spd: 4");
    }

    #[test]
    fn test_fix_error_log_line() {
        let err = FixError::with_code(3, "Timeout expired");
        assert_eq!(err.log_line(), "Error 3: Timeout expired");

        let err = FixError::message_only("location services disabled");
        assert_eq!(err.log_line(), "Error: location services disabled");
    }
}
