//! Application state: the poll driver and command interface.
//!
//! [`App`] owns the display list, the overflow monitor, and the queue of
//! user-facing notices. The view layer reads a snapshot of this state and
//! dispatches the three commands (fetch, submit, clear); it holds no state
//! of its own.

use tokio::sync::{mpsc, watch};
use tracing::{error, info};

use crate::data::{MonitorConfig, OverflowAlert, OverflowMonitor};
use crate::source::{NewReading, Reading, ReadingSource};

/// Severity of a user-facing notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Error,
}

/// A one-shot user-facing notification.
#[derive(Debug, Clone, PartialEq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
}

impl Notice {
    fn success(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Success,
            message: message.into(),
        }
    }

    fn error(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Error,
            message: message.into(),
        }
    }
}

/// Main application state.
///
/// All three command failures are terminal here: they become a notice (and
/// for source failures a log entry) and are never propagated to the
/// caller. No retries; the user re-triggers the action.
#[derive(Debug)]
pub struct App {
    source: Box<dyn ReadingSource>,
    monitor: OverflowMonitor,
    alerts: mpsc::UnboundedReceiver<OverflowAlert>,
    /// Local display list, replaced wholesale on each successful fetch.
    readings: Vec<Reading>,
    last_error: Option<String>,
    notices: Vec<Notice>,
}

impl App {
    /// Create a new App with the given reading source and monitor tuning.
    pub fn new(source: Box<dyn ReadingSource>, config: MonitorConfig) -> Self {
        let (monitor, alerts) = OverflowMonitor::new(config);
        Self {
            source,
            monitor,
            alerts,
            readings: Vec::new(),
            last_error: None,
            notices: Vec::new(),
        }
    }

    /// Pull the full snapshot from the source and re-evaluate the alert.
    ///
    /// On success the display list is replaced wholesale and the monitor
    /// observes the most recent reading's flow rate. On failure the
    /// previous display state and monitor state are retained
    /// (stale-but-valid) and the error is reported as a notice.
    ///
    /// Returns whether the fetch succeeded.
    pub async fn fetch_latest(&mut self) -> bool {
        match self.source.fetch().await {
            Ok(snapshot) => {
                self.monitor.observe(snapshot.last().map(|r| r.flow_rate));
                info!(readings = snapshot.len(), "fetched snapshot");
                self.readings = snapshot;
                self.last_error = None;
                true
            }
            Err(e) => {
                error!(error = %e, source = self.source.description(), "failed to fetch readings");
                self.last_error = Some(e.to_string());
                self.notices.push(Notice::error("Error fetching data"));
                false
            }
        }
    }

    /// Record a new reading, then refresh.
    ///
    /// Fields arrive as raw user input. An empty field or a value that is
    /// not a non-negative number is rejected locally; no call reaches the
    /// source.
    ///
    /// Returns whether the reading was accepted by the source.
    pub async fn submit(&mut self, flow_rate: &str, quantity: &str) -> bool {
        if flow_rate.trim().is_empty() || quantity.trim().is_empty() {
            self.notices.push(Notice::error("Both fields are required"));
            return false;
        }

        let parsed = (
            flow_rate.trim().parse::<f64>(),
            quantity.trim().parse::<f64>(),
        );
        let (Ok(flow_rate), Ok(quantity)) = parsed else {
            self.notices.push(Notice::error(
                "Flow rate and quantity must be non-negative numbers",
            ));
            return false;
        };
        if !flow_rate.is_finite() || flow_rate < 0.0 || !quantity.is_finite() || quantity < 0.0 {
            self.notices.push(Notice::error(
                "Flow rate and quantity must be non-negative numbers",
            ));
            return false;
        }

        match self
            .source
            .submit(NewReading {
                flow_rate,
                quantity,
            })
            .await
        {
            Ok(()) => {
                self.notices
                    .push(Notice::success("Data submitted successfully"));
                self.fetch_latest().await;
                true
            }
            Err(e) => {
                error!(error = %e, source = self.source.description(), "failed to submit reading");
                self.last_error = Some(e.to_string());
                self.notices.push(Notice::error("Error submitting data"));
                false
            }
        }
    }

    /// Reset the local display list. Source data is untouched.
    ///
    /// Rejected locally when there is nothing to clear.
    pub fn clear(&mut self) -> bool {
        if self.readings.is_empty() {
            self.notices.push(Notice::error("No data to clear"));
            return false;
        }
        self.readings.clear();
        self.notices
            .push(Notice::success("Data cleared successfully"));
        true
    }

    /// Drain queued notices, including any overflow alerts that fired
    /// since the last call.
    pub fn drain_notices(&mut self) -> Vec<Notice> {
        while let Ok(alert) = self.alerts.try_recv() {
            error!(flow_rate = alert.flow_rate, "overflow alert");
            self.notices.push(Notice::error("Water is overflowing!"));
        }
        std::mem::take(&mut self.notices)
    }

    /// The current display list, oldest first.
    pub fn readings(&self) -> &[Reading] {
        &self.readings
    }

    /// Whether the sustained-overflow alert is active.
    pub fn overflowing(&self) -> bool {
        self.monitor.is_overflowing()
    }

    /// The last source error, if the most recent fetch or submit failed.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Returns a description of the reading source.
    pub fn source_description(&self) -> &str {
        self.source.description()
    }

    /// Subscribe to overflow state transitions.
    pub fn subscribe_overflow(&self) -> watch::Receiver<bool> {
        self.monitor.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::{MemoryReadingSource, ReadingSnapshot, SourceError};
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::time::sleep;

    /// Delegates to an in-memory store but can be switched to fail, for
    /// exercising the stale-but-valid path.
    #[derive(Debug, Clone)]
    struct FlakySource {
        inner: MemoryReadingSource,
        fail: Arc<AtomicBool>,
    }

    impl FlakySource {
        fn new() -> Self {
            Self {
                inner: MemoryReadingSource::new(),
                fail: Arc::new(AtomicBool::new(false)),
            }
        }
    }

    #[async_trait::async_trait]
    impl ReadingSource for FlakySource {
        async fn fetch(&self) -> Result<ReadingSnapshot, SourceError> {
            if self.fail.load(Ordering::Relaxed) {
                return Err(SourceError::Connection("backend down".to_string()));
            }
            self.inner.fetch().await
        }

        async fn submit(&self, reading: NewReading) -> Result<(), SourceError> {
            if self.fail.load(Ordering::Relaxed) {
                return Err(SourceError::Connection("backend down".to_string()));
            }
            self.inner.submit(reading).await
        }

        fn description(&self) -> &str {
            "flaky"
        }
    }

    fn app_with_memory() -> (App, MemoryReadingSource) {
        let source = MemoryReadingSource::new();
        let backend = source.clone();
        (App::new(Box::new(source), MonitorConfig::default()), backend)
    }

    fn error_messages(app: &mut App) -> Vec<String> {
        app.drain_notices()
            .into_iter()
            .filter(|n| n.kind == NoticeKind::Error)
            .map(|n| n.message)
            .collect()
    }

    #[tokio::test]
    async fn test_submit_round_trip() {
        let (mut app, _backend) = app_with_memory();

        assert!(app.submit("5", "20").await);

        let readings = app.readings();
        assert_eq!(readings.len(), 1);
        assert_eq!(readings[0].flow_rate, 5.0);
        assert_eq!(readings[0].quantity, 20.0);
    }

    #[tokio::test]
    async fn test_submit_rejects_empty_fields_locally() {
        let (mut app, backend) = app_with_memory();

        assert!(!app.submit("", "10").await);
        assert!(!app.submit("10", "  ").await);

        // Nothing reached the source.
        assert!(backend.is_empty());
        let errors = error_messages(&mut app);
        assert_eq!(errors, vec!["Both fields are required"; 2]);
    }

    #[tokio::test]
    async fn test_submit_rejects_non_numeric_input_locally() {
        let (mut app, backend) = app_with_memory();

        assert!(!app.submit("fast", "10").await);
        assert!(!app.submit("-5", "10").await);

        assert!(backend.is_empty());
        assert_eq!(error_messages(&mut app).len(), 2);
    }

    #[tokio::test]
    async fn test_clear_with_no_readings_is_rejected() {
        let (mut app, _backend) = app_with_memory();

        assert!(!app.clear());
        assert_eq!(error_messages(&mut app), vec!["No data to clear"]);
    }

    #[tokio::test]
    async fn test_clear_resets_display_but_not_source() {
        let (mut app, backend) = app_with_memory();

        app.submit("5", "20").await;
        assert_eq!(app.readings().len(), 1);

        assert!(app.clear());
        assert!(app.readings().is_empty());
        // The source still holds the reading; the next fetch restores it.
        assert_eq!(backend.len(), 1);

        app.fetch_latest().await;
        assert_eq!(app.readings().len(), 1);
    }

    #[tokio::test]
    async fn test_fetch_failure_retains_previous_display_state() {
        let source = FlakySource::new();
        let toggle = source.clone();
        let mut app = App::new(Box::new(source), MonitorConfig::default());

        app.submit("5", "20").await;
        assert_eq!(app.readings().len(), 1);
        assert!(app.last_error().is_none());

        toggle.fail.store(true, Ordering::Relaxed);
        assert!(!app.fetch_latest().await);

        // Stale-but-valid: the old list survives, the error is surfaced.
        assert_eq!(app.readings().len(), 1);
        assert!(app.last_error().unwrap().contains("backend down"));
        assert_eq!(error_messages(&mut app), vec!["Error fetching data"]);
    }

    #[tokio::test]
    async fn test_submit_failure_is_terminal_and_noticed() {
        let source = FlakySource::new();
        let toggle = source.clone();
        let mut app = App::new(Box::new(source), MonitorConfig::default());

        toggle.fail.store(true, Ordering::Relaxed);
        assert!(!app.submit("5", "20").await);
        assert!(toggle.inner.is_empty());
        assert_eq!(error_messages(&mut app), vec!["Error submitting data"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_overflow_alert_surfaces_as_notice() {
        let (mut app, _backend) = app_with_memory();

        app.submit("150", "10").await;
        assert!(!app.overflowing());

        sleep(Duration::from_millis(5001)).await;
        assert!(app.overflowing());

        let notices = app.drain_notices();
        assert!(notices
            .iter()
            .any(|n| n.message == "Water is overflowing!"));

        // A later low reading clears the alert.
        app.submit("50", "10").await;
        assert!(!app.overflowing());
    }

    #[tokio::test(start_paused = true)]
    async fn test_clear_does_not_touch_alert_state() {
        let (mut app, _backend) = app_with_memory();

        app.submit("150", "10").await;
        sleep(Duration::from_millis(5001)).await;
        assert!(app.overflowing());

        // Clearing the display list is local; the alert only clears once a
        // poll actually reports an at-or-below-threshold or empty snapshot.
        app.clear();
        assert!(app.overflowing());
    }

    #[tokio::test]
    async fn test_fetch_of_empty_snapshot_reports_no_overflow() {
        let (mut app, _backend) = app_with_memory();

        assert!(app.fetch_latest().await);
        assert!(app.readings().is_empty());
        assert!(!app.overflowing());
    }

    #[tokio::test(start_paused = true)]
    async fn test_overflow_subscription_notifies_view() {
        let (mut app, _backend) = app_with_memory();
        let mut rx = app.subscribe_overflow();

        app.submit("150", "10").await;
        sleep(Duration::from_millis(5001)).await;

        assert!(rx.has_changed().unwrap());
        assert!(*rx.borrow_and_update());
    }
}
