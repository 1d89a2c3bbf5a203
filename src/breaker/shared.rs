//! State shared between the dispatch path and the recovery loop.

use std::fmt::Display;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::sync::mpsc;

use crate::breaker::action::Action;
use crate::breaker::notifier::BreakerEvent;
use crate::breaker::state::{BreakerState, FailureVerdict, Health, ProbeVerdict, TripVerdict};
use crate::config::BreakerConfig;
use crate::observability::metrics;
use crate::resilience::Attempt;

pub(crate) struct Shared<A, Req> {
    pub name: String,
    pub action: Arc<A>,
    events: mpsc::UnboundedSender<BreakerEvent>,
    pub probe_request: Req,
    pub request_timeout: Duration,
    pub request_trip_threshold: u32,
    pub recovery_interval: Duration,
    pub recovery_restore_threshold: u32,
    state: Mutex<BreakerState>,
}

impl<A, Req> Shared<A, Req>
where
    Req: Clone + Send + Sync + 'static,
    A: Action<Req>,
{
    pub fn new(
        config: &BreakerConfig,
        action: Arc<A>,
        events: mpsc::UnboundedSender<BreakerEvent>,
        probe_request: Req,
    ) -> Self {
        Self {
            name: config.name.clone(),
            action,
            events,
            probe_request,
            request_timeout: config.request_timeout,
            request_trip_threshold: config.request_trip_threshold,
            recovery_interval: config.recovery_interval,
            recovery_restore_threshold: config.recovery_restore_threshold,
            state: Mutex::new(BreakerState::new()),
        }
    }

    /// Lock the state record. Never hold the guard across an `.await`.
    pub fn lock(&self) -> MutexGuard<'_, BreakerState> {
        // Every transition completes before anything that could panic runs,
        // so a poisoned record is still consistent.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Queue an event for the dispatcher. Never blocks, safe under the lock.
    fn notify(&self, event: BreakerEvent) {
        if self.events.send(event).is_err() {
            tracing::debug!(breaker = %self.name, "Event dispatcher gone, event dropped");
        }
    }

    pub fn record_success(&self) {
        self.lock().record_request_success();
    }

    /// Count a failed query. Returns the trip verdict if this failure
    /// tripped the breaker.
    pub fn record_failure(&self, event: BreakerEvent) -> Option<TripVerdict> {
        self.notify(event);

        let mut state = self.lock();
        match state.record_request_failure(self.request_trip_threshold) {
            FailureVerdict::Counted(failures) => {
                tracing::debug!(
                    breaker = %self.name,
                    failures,
                    threshold = self.request_trip_threshold,
                    "Request failure counted"
                );
                None
            }
            FailureVerdict::Tripped(verdict) => {
                self.announce_trip(verdict);
                Some(verdict)
            }
            FailureVerdict::Ignored => None,
        }
    }

    /// Force Healthy → Tripped. `None` if the breaker was already tripped.
    pub fn trip(&self) -> Option<TripVerdict> {
        let mut state = self.lock();
        let verdict = state.trip()?;
        self.announce_trip(verdict);
        Some(verdict)
    }

    // Called with the state lock held.
    fn announce_trip(&self, verdict: TripVerdict) {
        metrics::record_transition(&self.name, Health::Tripped);
        self.notify(BreakerEvent::Tripped {
            consecutive_failures: verdict.consecutive_failures,
        });
    }

    /// Apply one probe result. Returns `true` once the loop should stop.
    pub fn apply_probe(&self, attempt: Attempt<A::Response, A::Error>) -> bool {
        let success = attempt.is_success();
        metrics::record_probe(&self.name, success);

        let mut state = self.lock();
        let verdict = if success {
            state.record_probe_success(self.recovery_restore_threshold)
        } else {
            state.record_probe_failure()
        };

        match verdict {
            ProbeVerdict::Progress(successes) => {
                self.notify(BreakerEvent::ProbeSucceeded {
                    consecutive_successes: successes,
                });
                false
            }
            ProbeVerdict::Restored(successes) => {
                self.notify(BreakerEvent::ProbeSucceeded {
                    consecutive_successes: successes,
                });
                metrics::record_transition(&self.name, Health::Healthy);
                self.notify(BreakerEvent::Restored);
                true
            }
            ProbeVerdict::Reset => {
                self.notify(BreakerEvent::ProbeFailed {
                    reason: probe_failure_reason(&attempt, self.request_timeout),
                });
                false
            }
            ProbeVerdict::Stale => true,
        }
    }
}

fn probe_failure_reason<T, E: Display>(attempt: &Attempt<T, E>, timeout: Duration) -> String {
    match attempt {
        Attempt::Failed(e) => e.to_string(),
        Attempt::TimedOut => format!("timed out after {timeout:?}"),
        Attempt::Panicked => "action panicked".to_string(),
        Attempt::Completed(_) => "completed".to_string(),
    }
}
