//! Simulated backend for exercising a breaker.
//!
//! # Responsibilities
//! - Stand in for a real dependency in the `fuse-breaker` binary
//! - Produce latency, random errors, hangs and a scheduled outage
//!
//! # Design Decisions
//! - The random roll happens before the first `.await`, so the RNG handle
//!   never lives across a suspension point
//! - A hang is modelled as a call that never completes, so only the
//!   breaker's deadline ends it

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use rand::Rng;
use thiserror::Error;

use crate::breaker::Action;
use crate::config::{OutageConfig, SimulationConfig};

/// Error reported by the simulated backend.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SimulatedError {
    #[error("simulated failure on call {0}")]
    Random(u64),

    #[error("backend down (outage, call {0})")]
    Outage(u64),
}

/// What a single simulated call will do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Behavior {
    Succeed,
    Fail,
    Hang,
}

/// A fake dependency driven by [`SimulationConfig`].
#[derive(Debug)]
pub struct SimulatedBackend {
    latency: Duration,
    failure_rate: f64,
    hang_rate: f64,
    outage: Option<OutageConfig>,
    calls: AtomicU64,
}

impl SimulatedBackend {
    pub fn new(config: &SimulationConfig) -> Self {
        Self {
            latency: Duration::from_millis(config.latency_ms),
            failure_rate: probability(config.failure_rate),
            hang_rate: probability(config.hang_rate),
            outage: config.outage,
            calls: AtomicU64::new(0),
        }
    }

    /// Number of times the backend has been called, probes included.
    pub fn calls(&self) -> u64 {
        self.calls.load(Ordering::Relaxed)
    }

    fn in_outage(&self, call: u64) -> bool {
        self.outage
            .map(|o| call >= o.start_call && call < o.start_call.saturating_add(o.length))
            .unwrap_or(false)
    }

    fn roll(&self) -> Behavior {
        let mut rng = rand::thread_rng();
        if rng.gen_bool(self.hang_rate) {
            Behavior::Hang
        } else if rng.gen_bool(self.failure_rate) {
            Behavior::Fail
        } else {
            Behavior::Succeed
        }
    }
}

/// Clamp a configured rate into `0.0..=1.0`; NaN and infinities count as 0.
fn probability(rate: f64) -> f64 {
    if rate.is_finite() {
        rate.clamp(0.0, 1.0)
    } else {
        0.0
    }
}

#[async_trait]
impl Action<u64> for SimulatedBackend {
    type Response = u64;
    type Error = SimulatedError;

    /// Echo `request` back after the configured latency.
    async fn call(&self, request: u64) -> Result<u64, SimulatedError> {
        let call = self.calls.fetch_add(1, Ordering::Relaxed);
        let outage = self.in_outage(call);
        let behavior = self.roll();

        tokio::time::sleep(self.latency).await;

        if outage {
            return Err(SimulatedError::Outage(call));
        }
        match behavior {
            Behavior::Succeed => Ok(request),
            Behavior::Fail => Err(SimulatedError::Random(call)),
            Behavior::Hang => std::future::pending().await,
        }
    }
}
