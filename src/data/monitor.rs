//! Debounced overflow detection.
//!
//! This module is the core state machine of the crate: it consumes the
//! latest flow rate from each poll snapshot and decides, with a debounce
//! window, whether a sustained-overflow alert should be active. A single
//! noisy high reading never trips the alert; the flow rate has to stay
//! above the threshold for the whole window.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::{mpsc, watch};
use tokio::task::AbortHandle;

/// Tuning for overflow detection.
#[derive(Debug, Clone)]
pub struct MonitorConfig {
    /// Flow rate above which a reading counts toward an overflow.
    pub threshold: f64,
    /// How long the flow rate must stay above the threshold,
    /// uninterrupted, before the alert activates.
    pub window: Duration,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            threshold: 100.0,
            window: Duration::from_millis(5000),
        }
    }
}

/// Notification emitted exactly once per debounce window that elapses
/// while still in violation.
#[derive(Debug, Clone, PartialEq)]
pub struct OverflowAlert {
    /// The flow rate that armed the expired timer.
    pub flow_rate: f64,
}

#[derive(Debug)]
struct PendingTimer {
    generation: u64,
    abort: AbortHandle,
}

#[derive(Debug, Default)]
struct MonitorState {
    overflowing: bool,
    /// Set iff a violation has been observed and the window has neither
    /// elapsed nor been cancelled. Never more than one timer is live.
    pending: Option<PendingTimer>,
    generation: u64,
}

/// Debounced overflow detector.
///
/// Feed it one [`observe`](OverflowMonitor::observe) call per poll cycle.
/// A reading above the threshold arms a single debounce timer; if the
/// timer elapses without an intervening at-or-below-threshold (or empty)
/// observation, the monitor flips to overflowing and emits one
/// [`OverflowAlert`] on the channel returned by
/// [`new`](OverflowMonitor::new). Any low or empty observation cancels the
/// cycle and clears the alert; a later rise starts a fresh window from
/// zero.
///
/// Arming a timer spawns a tokio task, so `observe` must be called from
/// within a runtime.
#[derive(Debug)]
pub struct OverflowMonitor {
    config: MonitorConfig,
    state: Arc<Mutex<MonitorState>>,
    alert_tx: mpsc::UnboundedSender<OverflowAlert>,
    overflow_tx: watch::Sender<bool>,
}

impl OverflowMonitor {
    /// Create a monitor along with the receiving end of its alert channel.
    pub fn new(config: MonitorConfig) -> (Self, mpsc::UnboundedReceiver<OverflowAlert>) {
        let (alert_tx, alert_rx) = mpsc::unbounded_channel();
        let (overflow_tx, _) = watch::channel(false);
        let monitor = Self {
            config,
            state: Arc::new(Mutex::new(MonitorState::default())),
            alert_tx,
            overflow_tx,
        };
        (monitor, alert_rx)
    }

    /// Current alert state.
    pub fn is_overflowing(&self) -> bool {
        self.state.lock().overflowing
    }

    /// Whether a debounce timer is armed and has not yet elapsed.
    pub fn has_pending_timer(&self) -> bool {
        self.state.lock().pending.is_some()
    }

    /// Subscribe to alert state transitions.
    ///
    /// The receiver sees `true` when the alert activates and `false` when
    /// it clears; view layers watch this instead of being reactively bound
    /// to monitor internals.
    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.overflow_tx.subscribe()
    }

    /// The configured threshold and window.
    pub fn config(&self) -> &MonitorConfig {
        &self.config
    }

    /// Feed the flow rate of the most recent reading from one poll
    /// snapshot (`None` for an empty snapshot). Returns the alert state
    /// as of this call.
    pub fn observe(&self, latest: Option<f64>) -> bool {
        let mut state = self.state.lock();
        match latest {
            Some(rate) if rate > self.config.threshold => {
                // At most one timer, and no re-arm while the alert is
                // already active: consecutive high polls are no-ops.
                if state.pending.is_none() && !state.overflowing {
                    self.arm(&mut state, rate);
                }
            }
            _ => {
                // At or below threshold, or nothing measured: cancel the
                // cycle and clear the alert. Both are idempotent.
                if let Some(timer) = state.pending.take() {
                    timer.abort.abort();
                }
                if state.overflowing {
                    state.overflowing = false;
                    self.overflow_tx.send_replace(false);
                }
            }
        }
        state.overflowing
    }

    /// Arm the debounce timer. The caller holds the state lock, which is
    /// what keeps overlapping polls from double-arming.
    fn arm(&self, state: &mut MonitorState, rate: f64) {
        state.generation += 1;
        let generation = state.generation;
        let shared = Arc::clone(&self.state);
        let alert_tx = self.alert_tx.clone();
        let overflow_tx = self.overflow_tx.clone();
        let window = self.config.window;

        let task = tokio::spawn(async move {
            tokio::time::sleep(window).await;
            let mut state = shared.lock();
            // A cancel can lose the abort race if this task already woke.
            // The generation check makes such a stale wakeup a no-op: a
            // cancelled timer is gone from `pending`, and a re-armed one
            // carries a newer generation.
            if state.pending.as_ref().map(|t| t.generation) != Some(generation) {
                return;
            }
            state.pending = None;
            state.overflowing = true;
            drop(state);
            overflow_tx.send_replace(true);
            let _ = alert_tx.send(OverflowAlert { flow_rate: rate });
        });

        state.pending = Some(PendingTimer {
            generation,
            abort: task.abort_handle(),
        });
    }
}

impl Drop for OverflowMonitor {
    fn drop(&mut self) {
        if let Some(timer) = self.state.lock().pending.take() {
            timer.abort.abort();
        }
    }
}
