use crate::error::TrackerResult;
use crate::log_store::{LogEntry, LogStore};
use crate::options::{RawOptions, Strategy};
use crate::provider::{EmailRequest, MailComposer};
use crate::session::TrackingSession;
use std::sync::Arc;

/// Device lifecycle notifications forwarded by the host. Each one produces
/// a single log entry and never touches the tracking session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleEvent {
    /// App is about to lose focus
    Resign,
    /// App moved to the background
    Pause,
    /// App regained focus
    Active,
    /// App moved back to the foreground
    Resume,
}

impl LifecycleEvent {
    fn message(&self) -> &'static str {
        match self {
            LifecycleEvent::Resign => "--- App became inactive ---",
            LifecycleEvent::Pause => "--- App went into background ---",
            LifecycleEvent::Active => "--- App became active ---",
            LifecycleEvent::Resume => "--- App moved into foreground ---",
        }
    }
}

/// Label shown on the tracking toggle affordance
pub const START_LABEL: &str = "Start tracking";
pub const STOP_LABEL: &str = "Stop tracking";

/// Thin orchestrator between the host UI, the session, and the log
pub struct AppController {
    session: TrackingSession,
    log: Arc<LogStore>,
    mail: Arc<dyn MailComposer>,
}

impl AppController {
    pub fn new(session: TrackingSession, log: Arc<LogStore>, mail: Arc<dyn MailComposer>) -> Self {
        Self { session, log, mail }
    }

    /// Log the startup marker; the persisted log was already loaded when
    /// the `LogStore` was constructed.
    pub fn on_app_start(&self) -> TrackerResult<()> {
        self.log.append(LogEntry::new("--- App started ---"))
    }

    /// Toggle tracking: start with the UI's current selection when idle,
    /// stop when active. Returns the label the toggle should show next.
    pub fn toggle_tracking(
        &self,
        strategy: Strategy,
        raw: &RawOptions,
    ) -> TrackerResult<&'static str> {
        if self.session.is_active()? {
            self.session.stop()?;
        } else {
            self.session.start(strategy, raw)?;
        }
        self.toggle_label()
    }

    /// Current toggle label for the session state
    pub fn toggle_label(&self) -> TrackerResult<&'static str> {
        Ok(if self.session.is_active()? {
            STOP_LABEL
        } else {
            START_LABEL
        })
    }

    pub fn on_lifecycle(&self, event: LifecycleEvent) -> TrackerResult<()> {
        self.log.append(LogEntry::new(event.message()))
    }

    /// Reset the persisted log to empty
    pub fn clear_log(&self) -> TrackerResult<()> {
        self.log.clear()
    }

    /// Hand the current rendered log to the platform mail composer
    pub fn send_log_email(&self) -> TrackerResult<()> {
        self.mail.compose(EmailRequest {
            subject: "Geo tracking log".to_string(),
            body: self.log.rendered()?,
            is_html: true,
        })
    }

    pub fn session(&self) -> &TrackingSession {
        &self.session
    }

    pub fn log(&self) -> &LogStore {
        &self.log
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TrackerResult;
    use crate::options::{JsPollingOptions, NativeBackgroundOptions};
    use crate::provider::{BackgroundProvider, FixCallbacks, ForegroundProvider, WatchHandle};
    use crate::storage::MemoryStore;
    use std::sync::Mutex;

    struct NoopForeground;

    impl ForegroundProvider for NoopForeground {
        fn start_watch(
            &self,
            _callbacks: FixCallbacks,
            _options: &JsPollingOptions,
        ) -> TrackerResult<WatchHandle> {
            Ok(1)
        }

        fn stop_watch(&self, _handle: WatchHandle) {}
    }

    struct NoopBackground;

    impl BackgroundProvider for NoopBackground {
        fn configure(
            &self,
            _callbacks: FixCallbacks,
            _options: &NativeBackgroundOptions,
        ) -> TrackerResult<()> {
            Ok(())
        }

        fn start(&self) -> TrackerResult<()> {
            Ok(())
        }

        fn stop(&self) {}

        fn acknowledge_fix_processed(&self) {}
    }

    #[derive(Default)]
    struct RecordingMail {
        sent: Mutex<Vec<EmailRequest>>,
    }

    impl MailComposer for RecordingMail {
        fn compose(&self, request: EmailRequest) -> TrackerResult<()> {
            self.sent.lock().unwrap().push(request);
            Ok(())
        }
    }

    fn controller() -> (AppController, Arc<RecordingMail>) {
        let log = Arc::new(LogStore::load(Arc::new(MemoryStore::new())).unwrap());
        let session = TrackingSession::new(
            Arc::clone(&log),
            Arc::new(NoopForeground),
            Arc::new(NoopBackground),
        );
        let mail = Arc::new(RecordingMail::default());
        (
            AppController::new(session, log, Arc::clone(&mail) as Arc<dyn MailComposer>),
            mail,
        )
    }

    #[test]
    fn test_toggle_flips_label_and_state() {
        let (controller, _) = controller();

        assert_eq!(controller.toggle_label().unwrap(), START_LABEL);

        let label = controller
            .toggle_tracking(Strategy::JsPolling, &RawOptions::default())
            .unwrap();
        assert_eq!(label, STOP_LABEL);
        assert!(controller.session().is_active().unwrap());

        let label = controller
            .toggle_tracking(Strategy::JsPolling, &RawOptions::default())
            .unwrap();
        assert_eq!(label, START_LABEL);
        assert!(!controller.session().is_active().unwrap());
    }

    #[test]
    fn test_lifecycle_events_log_without_touching_session() {
        let (controller, _) = controller();

        controller
            .toggle_tracking(Strategy::JsPolling, &RawOptions::default())
            .unwrap();

        controller.on_lifecycle(LifecycleEvent::Resign).unwrap();
        controller.on_lifecycle(LifecycleEvent::Pause).unwrap();
        controller.on_lifecycle(LifecycleEvent::Resume).unwrap();
        controller.on_lifecycle(LifecycleEvent::Active).unwrap();

        let rendered = controller.log().rendered().unwrap();
        assert!(rendered.contains("--- App became inactive ---"));
        assert!(rendered.contains("--- App went into background ---"));
        assert!(rendered.contains("--- App moved into foreground ---"));
        assert!(rendered.contains("--- App became active ---"));
        assert!(controller.session().is_active().unwrap());
    }

    #[test]
    fn test_app_start_marker() {
        let (controller, _) = controller();
        controller.on_app_start().unwrap();
        assert!(controller
            .log()
            .rendered()
            .unwrap()
            .contains("--- App started ---"));
    }

    #[test]
    fn test_send_log_email_uses_rendered_log() {
        let (controller, mail) = controller();

        controller.on_app_start().unwrap();
        controller.send_log_email().unwrap();

        let sent = mail.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].subject, "Geo tracking log");
        assert!(sent[0].is_html);
        assert_eq!(sent[0].body, controller.log().rendered().unwrap());
    }

    #[test]
    fn test_clear_log() {
        let (controller, _) = controller();

        controller.on_app_start().unwrap();
        controller.clear_log().unwrap();

        assert_eq!(controller.log().rendered().unwrap(), "");
    }
}
