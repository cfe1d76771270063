use crate::error::{GeoTrackerError, TrackerResult};
use crate::options::{JsPollingOptions, NativeBackgroundOptions};
use crate::provider::{BackgroundProvider, Fix, FixCallbacks, ForegroundProvider, WatchHandle};
use crossbeam::channel::{bounded, unbounded, Receiver, Sender};
use crossbeam::select;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use std::thread;
use std::time::Duration;

// Synthetic walk start point and per-tick step
const BASE_LATITUDE: f64 = 48.137154;
const BASE_LONGITUDE: f64 = 11.576124;
const STEP_DEGREES: f64 = 0.0005;

fn synthetic_fix(tick: u64, accuracy: f64) -> Fix {
    let offset = tick as f64 * STEP_DEGREES;
    Fix::new(
        BASE_LATITUDE + offset,
        BASE_LONGITUDE + offset / 2.0,
        accuracy,
        1.5 + (tick % 5) as f64,
    )
}

/// Simulated foreground polling provider: each watch is a thread emitting
/// fixes on a timer until its handle is cancelled.
pub struct SimulatedForegroundProvider {
    interval: Duration,
    next_handle: AtomicU64,
    watches: Mutex<HashMap<WatchHandle, Sender<()>>>,
}

impl SimulatedForegroundProvider {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            next_handle: AtomicU64::new(1),
            watches: Mutex::new(HashMap::new()),
        }
    }
}

impl ForegroundProvider for SimulatedForegroundProvider {
    fn start_watch(
        &self,
        callbacks: FixCallbacks,
        options: &JsPollingOptions,
    ) -> TrackerResult<WatchHandle> {
        let handle = self.next_handle.fetch_add(1, Ordering::SeqCst);
        let (stop_tx, stop_rx) = bounded::<()>(1);

        self.watches
            .lock()
            .map_err(|_| GeoTrackerError::Internal("Failed to acquire watch lock".to_string()))?
            .insert(handle, stop_tx);

        let interval = self.interval;
        let accuracy = if options.high_accuracy { 5.0 } else { 20.0 };

        thread::spawn(move || {
            let mut tick = 0u64;
            loop {
                select! {
                    recv(stop_rx) -> _ => break,
                    default(interval) => {}
                }
                (callbacks.on_fix)(synthetic_fix(tick, accuracy));
                tick += 1;
            }
        });

        Ok(handle)
    }

    fn stop_watch(&self, handle: WatchHandle) {
        if let Ok(mut watches) = self.watches.lock() {
            if let Some(stop_tx) = watches.remove(&handle) {
                let _ = stop_tx.send(());
            }
        }
    }
}

struct BackgroundState {
    callbacks: Option<FixCallbacks>,
    options: Option<NativeBackgroundOptions>,
    stop_tx: Option<Sender<()>>,
}

/// Simulated background provider: a global singleton toggle that stalls
/// after each fix until the consumer acknowledges it, like the native
/// plugin it stands in for.
pub struct SimulatedBackgroundProvider {
    interval: Duration,
    state: Mutex<BackgroundState>,
    ack_tx: Sender<()>,
    ack_rx: Receiver<()>,
}

impl SimulatedBackgroundProvider {
    pub fn new(interval: Duration) -> Self {
        let (ack_tx, ack_rx) = unbounded();
        Self {
            interval,
            state: Mutex::new(BackgroundState {
                callbacks: None,
                options: None,
                stop_tx: None,
            }),
            ack_tx,
            ack_rx,
        }
    }

    fn lock_state(&self) -> TrackerResult<std::sync::MutexGuard<'_, BackgroundState>> {
        self.state
            .lock()
            .map_err(|_| GeoTrackerError::Internal("Failed to acquire provider lock".to_string()))
    }
}

impl BackgroundProvider for SimulatedBackgroundProvider {
    fn configure(
        &self,
        callbacks: FixCallbacks,
        options: &NativeBackgroundOptions,
    ) -> TrackerResult<()> {
        let mut state = self.lock_state()?;
        state.callbacks = Some(callbacks);
        state.options = Some(options.clone());
        Ok(())
    }

    fn start(&self) -> TrackerResult<()> {
        let mut state = self.lock_state()?;

        let callbacks = state.callbacks.take().ok_or_else(|| {
            GeoTrackerError::ProviderStart("start called before configure".to_string())
        })?;
        let options = state.options.clone().ok_or_else(|| {
            GeoTrackerError::ProviderStart("start called before configure".to_string())
        })?;

        let (stop_tx, stop_rx) = bounded::<()>(1);
        state.stop_tx = Some(stop_tx);

        // Drain acknowledgements left over from a previous run
        while self.ack_rx.try_recv().is_ok() {}

        let interval = self.interval;
        let ack_rx = self.ack_rx.clone();
        let accuracy = f64::from(options.desired_accuracy_meters.max(5));

        thread::spawn(move || {
            let mut tick = 0u64;
            loop {
                select! {
                    recv(stop_rx) -> _ => break,
                    default(interval) => {}
                }
                (callbacks.on_fix)(synthetic_fix(tick, accuracy));
                tick += 1;

                // Stall until the fix is acknowledged, as the native
                // plugin does
                select! {
                    recv(stop_rx) -> _ => break,
                    recv(ack_rx) -> _ => {}
                }
            }
        });

        Ok(())
    }

    fn stop(&self) {
        if let Ok(mut state) = self.state.lock() {
            if let Some(stop_tx) = state.stop_tx.take() {
                let _ = stop_tx.send(());
            }
        }
    }

    fn acknowledge_fix_processed(&self) {
        let _ = self.ack_tx.send(());
    }
}
