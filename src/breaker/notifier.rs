//! Breaker event reporting.
//!
//! # Responsibilities
//! - Describe what happened to a breaker (`BreakerEvent`)
//! - Deliver events to an external observer without blocking the breaker
//!
//! # Design Decisions
//! - The breaker only queues events; a per-breaker dispatcher task calls
//!   the notifier, never with the state lock held
//! - State-changing events are queued under the breaker lock, so the
//!   notifier sees transitions in their real order
//! - A slow, re-entrant or panicking notifier never changes breaker behavior

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::runtime::Handle;
use tokio::sync::mpsc;

/// Something that happened to a breaker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum BreakerEvent {
    /// A query's action did not finish within the request timeout.
    RequestTimedOut { timeout: Duration },

    /// A query's action reported an error (or panicked).
    RequestFailed { error: String },

    /// Healthy → Tripped.
    Tripped { consecutive_failures: u32 },

    /// A recovery probe failed or timed out; the success streak is reset.
    ProbeFailed { reason: String },

    /// A recovery probe succeeded.
    ProbeSucceeded { consecutive_successes: u32 },

    /// Tripped → Healthy.
    Restored,
}

/// Observer of breaker events.
///
/// `notify` runs on the breaker's event dispatcher task, one event at a
/// time and in order. It may call back into the breaker. A notifier that
/// blocks delays later events but never the breaker itself.
pub trait Notifier: Send + Sync + 'static {
    fn notify(&self, breaker: &str, event: &BreakerEvent);
}

/// Default notifier: turns every event into a structured tracing event.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, breaker: &str, event: &BreakerEvent) {
        match event {
            BreakerEvent::RequestTimedOut { timeout } => {
                tracing::warn!(breaker, timeout_ms = timeout.as_millis() as u64, "Request timed out");
            }
            BreakerEvent::RequestFailed { error } => {
                tracing::warn!(breaker, error = %error, "Request failed");
            }
            BreakerEvent::Tripped {
                consecutive_failures,
            } => {
                tracing::warn!(breaker, consecutive_failures, "Breaker tripped, failing fast");
            }
            BreakerEvent::ProbeFailed { reason } => {
                tracing::info!(breaker, reason = %reason, "Recovery probe failed");
            }
            BreakerEvent::ProbeSucceeded {
                consecutive_successes,
            } => {
                tracing::debug!(breaker, consecutive_successes, "Recovery probe succeeded");
            }
            BreakerEvent::Restored => {
                tracing::info!(breaker, "Breaker restored");
            }
        }
    }
}

/// Forwards events into an unbounded channel.
///
/// Sending never blocks; events are silently dropped once the receiver is
/// gone.
#[derive(Debug, Clone)]
pub struct ChannelNotifier {
    tx: mpsc::UnboundedSender<BreakerEvent>,
}

impl ChannelNotifier {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<BreakerEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl Notifier for ChannelNotifier {
    fn notify(&self, _breaker: &str, event: &BreakerEvent) {
        let _ = self.tx.send(event.clone());
    }
}

/// Spawn the task that delivers a breaker's events to `notifier`.
///
/// Returns the queue the breaker pushes into. The task drains the queue and
/// exits once every sender is gone.
pub(crate) fn spawn_dispatcher(
    runtime: &Handle,
    breaker: String,
    notifier: Arc<dyn Notifier>,
) -> mpsc::UnboundedSender<BreakerEvent> {
    let (tx, mut rx) = mpsc::unbounded_channel::<BreakerEvent>();

    runtime.spawn(async move {
        while let Some(event) = rx.recv().await {
            let delivered =
                panic::catch_unwind(AssertUnwindSafe(|| notifier.notify(&breaker, &event)));
            if delivered.is_err() {
                tracing::error!(breaker = %breaker, ?event, "Notifier panicked, event dropped");
            }
        }
        tracing::debug!(breaker = %breaker, "Event dispatcher exiting");
    });

    tx
}
