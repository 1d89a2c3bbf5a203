//! Recovery loop for a tripped breaker.
//!
//! # Responsibilities
//! - Wait `recovery_interval`, probe the action, repeat
//! - Count consecutive probe successes and restore the breaker
//! - Stop when the breaker is restored or disposed
//!
//! # State Machine
//! ```text
//! Idle → Probing → Idle      (probe failed, or not enough successes yet)
//! Idle → Probing → Restored  (success streak reached the threshold, exit)
//! any  → Disposed            (last Breaker handle dropped, exit)
//! ```
//!
//! # Design Decisions
//! - Probes never fast-fail; the breaker is already known to be down
//! - Probes use the same deadline as queries
//! - The loop never gives up on its own

use std::sync::Arc;

use tokio::time;

use crate::breaker::action::Action;
use crate::breaker::shared::Shared;
use crate::lifecycle::ShutdownSignal;
use crate::resilience::race_deadline;

/// Run one recovery episode. Spawned exactly once per trip.
pub(crate) async fn run<A, Req>(shared: Arc<Shared<A, Req>>, mut disposed: ShutdownSignal)
where
    Req: Clone + Send + Sync + 'static,
    A: Action<Req>,
{
    tracing::info!(
        breaker = %shared.name,
        interval_ms = shared.recovery_interval.as_millis() as u64,
        restore_threshold = shared.recovery_restore_threshold,
        "Recovery loop starting"
    );

    loop {
        tokio::select! {
            _ = time::sleep(shared.recovery_interval) => {}
            _ = disposed.recv() => break,
        }

        let action = Arc::clone(&shared.action);
        let request = shared.probe_request.clone();
        let probe = race_deadline(shared.request_timeout, async move { action.call(request).await });

        let attempt = tokio::select! {
            attempt = probe => attempt,
            _ = disposed.recv() => break,
        };

        if shared.apply_probe(attempt) {
            tracing::debug!(breaker = %shared.name, "Recovery loop finished");
            return;
        }
    }

    tracing::debug!(breaker = %shared.name, "Breaker disposed, recovery loop exiting");
    shared.lock().recovery_stopped();
}
