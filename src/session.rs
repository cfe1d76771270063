use crate::error::{GeoTrackerError, TrackerResult};
use crate::log_store::{LogEntry, LogStore};
use crate::options::{RawOptions, Strategy, TrackingOptions};
use crate::provider::{
    BackgroundProvider, Fix, FixCallbacks, FixError, ForegroundProvider, WatchHandle,
};
use std::sync::{Arc, Mutex};

/// Session state machine states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No provider engaged
    Idle,
    /// One provider delivering fixes
    Active,
}

struct SessionInner {
    state: SessionState,
    strategy: Option<Strategy>,
    handle: Option<WatchHandle>,
    /// Bumped on every start attempt and every stop; callbacks carry the
    /// generation they were created under and are dropped on mismatch.
    generation: u64,
}

/// Tracking session: owns the Idle/Active transitions, selects a provider
/// strategy at start, and routes fix/error callbacks into the log.
///
/// `start`/`stop` hold the session lock across the provider call. Providers
/// deliver callbacks asynchronously (`provider.rs` contract), so the
/// callbacks never run inside that hold.
pub struct TrackingSession {
    inner: Arc<Mutex<SessionInner>>,
    log: Arc<LogStore>,
    foreground: Arc<dyn ForegroundProvider>,
    background: Arc<dyn BackgroundProvider>,
}

impl TrackingSession {
    /// Create a session in Idle state
    pub fn new(
        log: Arc<LogStore>,
        foreground: Arc<dyn ForegroundProvider>,
        background: Arc<dyn BackgroundProvider>,
    ) -> Self {
        Self {
            inner: Arc::new(Mutex::new(SessionInner {
                state: SessionState::Idle,
                strategy: None,
                handle: None,
                generation: 0,
            })),
            log,
            foreground,
            background,
        }
    }

    /// Transition Idle → Active: validate options, engage the provider for
    /// `strategy`, then log the start entry. Options are validated before
    /// any provider contact; the start entry is appended only after the
    /// provider call succeeded. Starting while Active is rejected.
    pub fn start(&self, strategy: Strategy, raw: &RawOptions) -> TrackerResult<()> {
        let mut inner = self.lock_inner()?;

        if inner.state == SessionState::Active {
            return Err(GeoTrackerError::AlreadyTracking);
        }

        let options = TrackingOptions::normalize(strategy, raw)?;
        let options_json = options.to_json()?;

        inner.generation += 1;
        let callbacks = self.make_callbacks(strategy, inner.generation);

        let handle = match &options {
            TrackingOptions::JsPolling(js) => Some(
                self.foreground
                    .start_watch(callbacks, js)
                    .map_err(|e| GeoTrackerError::ProviderStart(e.to_string()))?,
            ),
            TrackingOptions::NativeBackground(native) => {
                // The background provider is a global singleton toggle;
                // there is no per-subscription handle to retain.
                self.background
                    .configure(callbacks, native)
                    .map_err(|e| GeoTrackerError::ProviderStart(e.to_string()))?;
                self.background
                    .start()
                    .map_err(|e| GeoTrackerError::ProviderStart(e.to_string()))?;
                None
            }
        };

        inner.state = SessionState::Active;
        inner.strategy = Some(strategy);
        inner.handle = handle;

        self.log.append(LogEntry::new(format!(
            "Started tracking in {} mode ({})",
            strategy.mode_name(),
            options_json
        )))
    }

    /// Transition Active → Idle: cancel the provider, invalidate in-flight
    /// callbacks, log the stop entry. Stopping while Idle is a no-op.
    pub fn stop(&self) -> TrackerResult<()> {
        let mut inner = self.lock_inner()?;

        if inner.state == SessionState::Idle {
            return Ok(());
        }

        let strategy = inner
            .strategy
            .ok_or_else(|| GeoTrackerError::Internal("Active session without strategy".to_string()))?;

        match strategy {
            Strategy::JsPolling => {
                if let Some(handle) = inner.handle.take() {
                    self.foreground.stop_watch(handle);
                }
            }
            Strategy::NativeBackground => self.background.stop(),
        }

        inner.state = SessionState::Idle;
        inner.strategy = None;
        inner.handle = None;
        // Providers do not guarantee synchronous unsubscription; the
        // generation bump is what cancels callbacks already in flight.
        inner.generation += 1;

        self.log.append(LogEntry::new(format!(
            "Stopped tracking in {} mode",
            strategy.mode_name()
        )))
    }

    /// Current state
    pub fn state(&self) -> TrackerResult<SessionState> {
        Ok(self.lock_inner()?.state)
    }

    pub fn is_active(&self) -> TrackerResult<bool> {
        Ok(self.lock_inner()?.state == SessionState::Active)
    }

    /// Strategy of the active session, if any
    pub fn strategy(&self) -> TrackerResult<Option<Strategy>> {
        Ok(self.lock_inner()?.strategy)
    }

    fn make_callbacks(&self, strategy: Strategy, generation: u64) -> FixCallbacks {
        let context = Arc::new(CallbackContext {
            inner: Arc::clone(&self.inner),
            log: Arc::clone(&self.log),
            background: Arc::clone(&self.background),
            strategy,
            generation,
        });

        let fix_context = Arc::clone(&context);
        FixCallbacks::new(
            move |fix| fix_context.deliver_fix(fix),
            move |error| context.deliver_error(error),
        )
    }

    fn lock_inner(&self) -> TrackerResult<std::sync::MutexGuard<'_, SessionInner>> {
        self.inner
            .lock()
            .map_err(|_| GeoTrackerError::Internal("Failed to acquire session lock".to_string()))
    }
}

/// Everything a provider callback needs, captured at start time
struct CallbackContext {
    inner: Arc<Mutex<SessionInner>>,
    log: Arc<LogStore>,
    background: Arc<dyn BackgroundProvider>,
    strategy: Strategy,
    generation: u64,
}

impl CallbackContext {
    /// Stale-callback guard: deliveries for a generation that has since
    /// been stopped (or was never committed) are silently dropped.
    fn is_current(&self) -> bool {
        match self.inner.lock() {
            Ok(inner) => {
                inner.state == SessionState::Active && inner.generation == self.generation
            }
            Err(_) => false,
        }
    }

    fn deliver_fix(&self, fix: Fix) {
        if !self.is_current() {
            log::debug!("Dropping stale fix callback: {}", fix.log_line());
            return;
        }

        if let Err(e) = self.log.append(LogEntry::new(fix.log_line())) {
            log::warn!("Failed to log fix: {e}");
        }

        // Native delivery stalls until each fix is acknowledged
        if self.strategy == Strategy::NativeBackground {
            self.background.acknowledge_fix_processed();
        }
    }

    fn deliver_error(&self, error: FixError) {
        if !self.is_current() {
            log::debug!("Dropping stale error callback: {}", error.log_line());
            return;
        }

        // Non-fatal: the session stays as it was
        if let Err(e) = self.log.append(LogEntry::new(error.log_line())) {
            log::warn!("Failed to log provider error: {e}");
        }
    }
}
