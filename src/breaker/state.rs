//! Breaker health state machine.
//!
//! # States
//! - Healthy: queries invoke the action
//! - Tripped: queries fail fast, the recovery loop probes the action
//!
//! # State Transitions
//! ```text
//! Healthy → Tripped: consecutive request failures >= trip threshold
//! Tripped → Healthy: consecutive probe successes >= restore threshold
//! ```
//!
//! Every transition happens on one `BreakerState` value behind a single
//! mutex, so health, both counters and the recovery flag never tear.

use serde::Serialize;

/// Admission state of a breaker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Health {
    Healthy,
    Tripped,
}

impl Health {
    pub fn as_str(&self) -> &'static str {
        match self {
            Health::Healthy => "healthy",
            Health::Tripped => "tripped",
        }
    }
}

/// Point-in-time, read-only view of a breaker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BreakerSnapshot {
    pub health: Health,
    pub consecutive_request_failures: u32,
    pub consecutive_recovery_successes: u32,
    /// A recovery loop is currently running for this breaker.
    pub recovery_active: bool,
    /// Total Healthy → Tripped transitions.
    pub trips: u64,
    /// Total Tripped → Healthy transitions.
    pub restores: u64,
}

/// What a recorded request failure did to the breaker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum FailureVerdict {
    /// Counted; still below the threshold.
    Counted(u32),
    /// The failure crossed the threshold and tripped the breaker.
    Tripped(TripVerdict),
    /// The breaker was already tripped; nothing was counted.
    Ignored,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct TripVerdict {
    pub consecutive_failures: u32,
    /// The caller must start the recovery loop.
    pub start_recovery: bool,
}

/// What a probe result did to the breaker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ProbeVerdict {
    Progress(u32),
    Restored(u32),
    Reset,
    /// The breaker is not tripped; the loop has nothing left to do.
    Stale,
}

#[derive(Debug)]
pub(crate) struct BreakerState {
    health: Health,
    consecutive_request_failures: u32,
    consecutive_recovery_successes: u32,
    recovery_active: bool,
    trips: u64,
    restores: u64,
}

impl BreakerState {
    pub fn new() -> Self {
        Self {
            health: Health::Healthy,
            consecutive_request_failures: 0,
            consecutive_recovery_successes: 0,
            recovery_active: false,
            trips: 0,
            restores: 0,
        }
    }

    pub fn health(&self) -> Health {
        self.health
    }

    pub fn record_request_success(&mut self) {
        // The failure count only means something while healthy; a late
        // success after a trip must not touch it.
        if self.health == Health::Healthy {
            self.consecutive_request_failures = 0;
        }
    }

    pub fn record_request_failure(&mut self, trip_threshold: u32) -> FailureVerdict {
        if self.health == Health::Tripped {
            return FailureVerdict::Ignored;
        }

        self.consecutive_request_failures = self.consecutive_request_failures.saturating_add(1);
        if self.consecutive_request_failures < trip_threshold {
            return FailureVerdict::Counted(self.consecutive_request_failures);
        }

        match self.trip() {
            Some(verdict) => FailureVerdict::Tripped(verdict),
            None => FailureVerdict::Ignored,
        }
    }

    /// Healthy → Tripped. Returns `None` if already tripped.
    pub fn trip(&mut self) -> Option<TripVerdict> {
        if self.health == Health::Tripped {
            return None;
        }

        self.health = Health::Tripped;
        self.consecutive_recovery_successes = 0;
        self.trips += 1;

        let start_recovery = !self.recovery_active;
        self.recovery_active = true;

        Some(TripVerdict {
            consecutive_failures: self.consecutive_request_failures,
            start_recovery,
        })
    }

    pub fn record_probe_success(&mut self, restore_threshold: u32) -> ProbeVerdict {
        if self.health == Health::Healthy {
            return ProbeVerdict::Stale;
        }

        self.consecutive_recovery_successes = self.consecutive_recovery_successes.saturating_add(1);
        let successes = self.consecutive_recovery_successes;
        if successes < restore_threshold {
            return ProbeVerdict::Progress(successes);
        }

        self.restore();
        ProbeVerdict::Restored(successes)
    }

    pub fn record_probe_failure(&mut self) -> ProbeVerdict {
        if self.health == Health::Healthy {
            return ProbeVerdict::Stale;
        }
        self.consecutive_recovery_successes = 0;
        ProbeVerdict::Reset
    }

    /// The recovery loop is exiting without restoring (breaker disposed).
    pub fn recovery_stopped(&mut self) {
        self.recovery_active = false;
    }

    fn restore(&mut self) {
        self.health = Health::Healthy;
        self.consecutive_request_failures = 0;
        self.consecutive_recovery_successes = 0;
        self.recovery_active = false;
        self.restores += 1;
    }

    pub fn snapshot(&self) -> BreakerSnapshot {
        BreakerSnapshot {
            health: self.health,
            consecutive_request_failures: self.consecutive_request_failures,
            consecutive_recovery_successes: self.consecutive_recovery_successes,
            recovery_active: self.recovery_active,
            trips: self.trips,
            restores: self.restores,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tripped_state() -> BreakerState {
        let mut state = BreakerState::new();
        assert!(state.trip().is_some());
        state
    }

    #[test]
    fn test_starts_healthy_with_zero_counters() {
        let snap = BreakerState::new().snapshot();
        assert_eq!(snap.health, Health::Healthy);
        assert_eq!(snap.consecutive_request_failures, 0);
        assert_eq!(snap.consecutive_recovery_successes, 0);
        assert!(!snap.recovery_active);
    }

    #[test]
    fn test_trips_on_threshold() {
        let mut state = BreakerState::new();

        assert_eq!(state.record_request_failure(3), FailureVerdict::Counted(1));
        assert_eq!(state.record_request_failure(3), FailureVerdict::Counted(2));
        assert_eq!(
            state.record_request_failure(3),
            FailureVerdict::Tripped(TripVerdict {
                consecutive_failures: 3,
                start_recovery: true,
            })
        );
        assert_eq!(state.health(), Health::Tripped);
        assert_eq!(state.record_request_failure(3), FailureVerdict::Ignored);
        assert_eq!(state.snapshot().trips, 1);
    }

    #[test]
    fn test_success_resets_failure_streak() {
        let mut state = BreakerState::new();
        state.record_request_failure(2);
        state.record_request_success();
        assert_eq!(state.record_request_failure(2), FailureVerdict::Counted(1));
        assert_eq!(state.health(), Health::Healthy);
    }

    #[test]
    fn test_trip_is_idempotent() {
        let mut state = tripped_state();
        assert!(state.trip().is_none());
        assert_eq!(state.snapshot().trips, 1);
        assert!(state.snapshot().recovery_active);
    }

    #[test]
    fn test_failure_count_survives_trip_until_restore() {
        let mut state = BreakerState::new();
        state.record_request_failure(1);
        assert_eq!(state.snapshot().consecutive_request_failures, 1);

        assert_eq!(state.record_probe_success(1), ProbeVerdict::Restored(1));
        let snap = state.snapshot();
        assert_eq!(snap.consecutive_request_failures, 0);
        assert_eq!(snap.consecutive_recovery_successes, 0);
        assert!(!snap.recovery_active);
        assert_eq!(snap.restores, 1);
    }

    #[test]
    fn test_probe_failure_resets_streak() {
        let mut state = tripped_state();

        assert_eq!(state.record_probe_success(3), ProbeVerdict::Progress(1));
        assert_eq!(state.record_probe_success(3), ProbeVerdict::Progress(2));
        assert_eq!(state.record_probe_failure(), ProbeVerdict::Reset);
        assert_eq!(state.snapshot().consecutive_recovery_successes, 0);
        assert_eq!(state.record_probe_success(3), ProbeVerdict::Progress(1));
        assert_eq!(state.health(), Health::Tripped);
    }

    #[test]
    fn test_second_episode_starts_clean() {
        let mut state = tripped_state();
        state.record_probe_success(2);
        state.record_probe_success(2);
        assert_eq!(state.health(), Health::Healthy);

        state.trip();
        assert_eq!(state.snapshot().consecutive_recovery_successes, 0);
        assert_eq!(state.snapshot().trips, 2);
    }

    #[test]
    fn test_probe_on_healthy_breaker_is_stale() {
        let mut state = BreakerState::new();
        assert_eq!(state.record_probe_success(1), ProbeVerdict::Stale);
        assert_eq!(state.record_probe_failure(), ProbeVerdict::Stale);
    }
}
