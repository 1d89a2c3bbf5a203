//! The breaker handle and its dispatch path.
//!
//! # Responsibilities
//! - Fail fast while tripped
//! - Invoke the action under the request timeout while healthy
//! - Count failures, trip the breaker and start recovery
//!
//! # Design Decisions
//! - The fast-fail check takes the state lock only for a read and never
//!   waits on the action
//! - A query's outcome is decided before the failure is counted, so the
//!   query that trips the breaker reports its own failure, not FastFail

use std::fmt;
use std::sync::Arc;

use tokio::runtime::Handle;

use crate::breaker::action::Action;
use crate::breaker::error::{BreakerError, QueryError};
use crate::breaker::notifier::{self, BreakerEvent, Notifier, TracingNotifier};
use crate::breaker::recovery;
use crate::breaker::shared::Shared;
use crate::breaker::state::{BreakerSnapshot, Health, TripVerdict};
use crate::config::validation::validate_breaker;
use crate::config::BreakerConfig;
use crate::lifecycle::Shutdown;
use crate::observability::metrics;
use crate::resilience::{race_deadline, Attempt};

/// Circuit breaker guarding calls to an [`Action`].
///
/// Cloning is cheap and every clone drives the same breaker. Once the last
/// clone is dropped, a running recovery loop stops.
pub struct Breaker<A, Req> {
    shared: Arc<Shared<A, Req>>,
    disposal: Arc<Shutdown>,
}

impl<A, Req> Clone for Breaker<A, Req> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
            disposal: Arc::clone(&self.disposal),
        }
    }
}

impl<A, Req> fmt::Debug for Breaker<A, Req> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Breaker")
            .field("name", &self.shared.name)
            .finish_non_exhaustive()
    }
}

impl<A, Req> Breaker<A, Req>
where
    Req: Clone + Send + Sync + 'static,
    A: Action<Req>,
{
    /// Build a breaker.
    ///
    /// `probe_request` is what the recovery loop sends to the action while
    /// the breaker is tripped. Fails if any duration or threshold in
    /// `config` is zero, or when called outside a Tokio runtime (the
    /// breaker spawns its event dispatcher there).
    pub fn new(
        action: Arc<A>,
        notifier: Arc<dyn Notifier>,
        probe_request: Req,
        config: &BreakerConfig,
    ) -> Result<Self, BreakerError> {
        validate_breaker(config).map_err(BreakerError::InvalidConfig)?;
        let runtime = Handle::try_current().map_err(|_| BreakerError::NoRuntime)?;

        tracing::debug!(
            breaker = %config.name,
            request_timeout = ?config.request_timeout,
            request_trip_threshold = config.request_trip_threshold,
            recovery_interval = ?config.recovery_interval,
            recovery_restore_threshold = config.recovery_restore_threshold,
            "Breaker created"
        );
        metrics::record_health(&config.name, Health::Healthy);

        let events = notifier::spawn_dispatcher(&runtime, config.name.clone(), notifier);
        Ok(Self {
            shared: Arc::new(Shared::new(config, action, events, probe_request)),
            disposal: Arc::new(Shutdown::new()),
        })
    }

    /// Build a breaker that reports events through `tracing`.
    pub fn with_tracing(
        action: Arc<A>,
        probe_request: Req,
        config: &BreakerConfig,
    ) -> Result<Self, BreakerError> {
        Self::new(action, Arc::new(TracingNotifier), probe_request, config)
    }

    /// Run `request` through the breaker.
    ///
    /// Returns within the request timeout in every case. While the breaker
    /// is tripped it returns [`QueryError::FastFail`] without invoking the
    /// action.
    pub async fn query(&self, request: Req) -> Result<A::Response, QueryError<A::Error>> {
        if self.is_tripped() {
            metrics::record_query(&self.shared.name, "fast_fail");
            return Err(QueryError::FastFail);
        }

        let action = Arc::clone(&self.shared.action);
        let timeout = self.shared.request_timeout;
        let attempt = race_deadline(timeout, async move { action.call(request).await }).await;

        let (err, event) = match attempt {
            Attempt::Completed(response) => {
                self.shared.record_success();
                metrics::record_query(&self.shared.name, "success");
                return Ok(response);
            }
            Attempt::Failed(e) => {
                let event = BreakerEvent::RequestFailed {
                    error: e.to_string(),
                };
                (QueryError::Action(e), event)
            }
            Attempt::TimedOut => (
                QueryError::Timeout(timeout),
                BreakerEvent::RequestTimedOut { timeout },
            ),
            Attempt::Panicked => (
                QueryError::Panicked,
                BreakerEvent::RequestFailed {
                    error: "action panicked".to_string(),
                },
            ),
        };

        metrics::record_query(&self.shared.name, err.kind());
        if let Some(verdict) = self.shared.record_failure(event) {
            self.start_recovery(verdict);
        }
        Err(err)
    }

    /// Trip the breaker by hand, regardless of its failure count.
    ///
    /// Returns `false` if it was already tripped, in which case nothing
    /// happens: no event, no second recovery loop. Must be called from
    /// within a Tokio runtime.
    pub fn trip(&self) -> bool {
        match self.shared.trip() {
            Some(verdict) => {
                self.start_recovery(verdict);
                true
            }
            None => false,
        }
    }

    fn start_recovery(&self, verdict: TripVerdict) {
        if !verdict.start_recovery {
            return;
        }
        tokio::spawn(recovery::run(
            Arc::clone(&self.shared),
            self.disposal.subscribe(),
        ));
    }

    pub fn name(&self) -> &str {
        &self.shared.name
    }

    pub fn health(&self) -> Health {
        self.shared.lock().health()
    }

    pub fn is_tripped(&self) -> bool {
        self.health() == Health::Tripped
    }

    /// Consistent view of health and counters.
    pub fn snapshot(&self) -> BreakerSnapshot {
        self.shared.lock().snapshot()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::breaker::action::{action_fn, FnAction};
    use crate::breaker::notifier::ChannelNotifier;
    use std::future::{ready, Future, Ready};
    use std::time::Duration;
    use tokio::sync::mpsc;

    fn config() -> BreakerConfig {
        BreakerConfig::named("unit")
            .with_request_timeout(Duration::from_millis(100))
            .with_request_trip_threshold(2)
            .with_recovery_interval(Duration::from_secs(60))
            .with_recovery_restore_threshold(1)
    }

    fn always_ok() -> FnAction<impl Fn(u8) -> Ready<Result<u8, String>> + Send + Sync + 'static> {
        action_fn(|n: u8| ready(Ok(n)))
    }

    fn build<F, Fut>(
        f: F,
    ) -> (Breaker<FnAction<F>, u8>, mpsc::UnboundedReceiver<BreakerEvent>)
    where
        F: Fn(u8) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<u8, String>> + Send + 'static,
    {
        let (notifier, rx) = ChannelNotifier::new();
        let breaker =
            Breaker::new(Arc::new(action_fn(f)), Arc::new(notifier), 0, &config()).unwrap();
        (breaker, rx)
    }

    #[test]
    fn test_rejects_zero_thresholds() {
        let cfg = config().with_request_trip_threshold(0).with_recovery_restore_threshold(0);
        let err = Breaker::with_tracing(Arc::new(always_ok()), 0u8, &cfg).unwrap_err();

        match err {
            BreakerError::InvalidConfig(errors) => assert_eq!(errors.len(), 2),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_rejects_zero_durations() {
        let cfg = config()
            .with_request_timeout(Duration::ZERO)
            .with_recovery_interval(Duration::ZERO);
        let err = Breaker::with_tracing(Arc::new(always_ok()), 0u8, &cfg).unwrap_err();
        assert!(err.to_string().contains("request_timeout_ms"));
        assert!(err.to_string().contains("recovery_interval_ms"));
    }

    #[tokio::test]
    async fn test_accepts_sub_millisecond_durations() {
        let cfg = config()
            .with_request_timeout(Duration::from_micros(1_500))
            .with_recovery_interval(Duration::from_micros(500));
        let breaker = Breaker::with_tracing(Arc::new(always_ok()), 0u8, &cfg).unwrap();

        assert_eq!(breaker.shared.request_timeout, Duration::from_micros(1_500));
        assert_eq!(breaker.shared.recovery_interval, Duration::from_micros(500));
    }

    #[test]
    fn test_requires_runtime() {
        let err = Breaker::with_tracing(Arc::new(always_ok()), 0u8, &config()).unwrap_err();
        assert_eq!(err, BreakerError::NoRuntime);
    }

    #[tokio::test]
    async fn test_trip_is_idempotent() {
        let (breaker, mut events) = build(|n| async move { Ok::<u8, String>(n) });

        assert!(breaker.trip());
        assert!(!breaker.trip());

        assert_eq!(
            events.recv().await,
            Some(BreakerEvent::Tripped {
                consecutive_failures: 0
            })
        );
        assert!(events.try_recv().is_err());

        let snap = breaker.snapshot();
        assert_eq!(snap.trips, 1);
        assert!(snap.recovery_active);
    }

    #[tokio::test]
    async fn test_late_failure_after_trip_is_not_counted() {
        let (breaker, _events) = build(|_| async { Err::<u8, String>("down".to_string()) });

        breaker.trip();
        let late = BreakerEvent::RequestFailed {
            error: "late".into(),
        };
        assert!(breaker.shared.record_failure(late).is_none());
        assert_eq!(breaker.snapshot().consecutive_request_failures, 0);
        assert_eq!(breaker.snapshot().trips, 1);
    }

    #[tokio::test]
    async fn test_panicking_action_counts_as_failure() {
        let (breaker, _events) = build(|n| async move {
            if n > 0 {
                panic!("bad input");
            }
            Ok::<u8, String>(n)
        });

        let err = breaker.query(1).await.unwrap_err();
        assert!(matches!(err, QueryError::Panicked));
        assert_eq!(breaker.snapshot().consecutive_request_failures, 1);
    }

    #[tokio::test]
    async fn test_panicking_notifier_does_not_break_breaker() {
        struct Exploding;
        impl Notifier for Exploding {
            fn notify(&self, _: &str, _: &BreakerEvent) {
                panic!("observer crashed");
            }
        }

        let action = Arc::new(action_fn(|_: u8| async { Err::<u8, _>("down".to_string()) }));
        let breaker = Breaker::new(action, Arc::new(Exploding), 0, &config()).unwrap();

        assert!(matches!(breaker.query(0).await, Err(QueryError::Action(_))));
        assert!(matches!(breaker.query(0).await, Err(QueryError::Action(_))));
        assert!(breaker.is_tripped());
        assert!(breaker.query(0).await.unwrap_err().is_fast_fail());
    }
}
