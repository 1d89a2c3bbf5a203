//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from config files.
//! Durations are written in milliseconds so they stay readable in TOML;
//! in memory the breaker keeps the exact `Duration`.

use std::time::Duration;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Root configuration for the `fuse-breaker` binary.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct FuseConfig {
    /// Breaker thresholds and timings.
    pub breaker: BreakerConfig,

    /// Simulated backend driven by the binary.
    pub simulation: SimulationConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Breaker configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct BreakerConfig {
    /// Breaker identifier for logging/metrics.
    pub name: String,

    /// Deadline for a single action invocation.
    #[serde(rename = "request_timeout_ms", with = "millis")]
    pub request_timeout: Duration,

    /// Consecutive request failures before the breaker trips.
    pub request_trip_threshold: u32,

    /// Delay between recovery probes.
    #[serde(rename = "recovery_interval_ms", with = "millis")]
    pub recovery_interval: Duration,

    /// Consecutive successful probes before the breaker is restored.
    pub recovery_restore_threshold: u32,
}

impl Default for BreakerConfig {
    fn default() -> Self {
        Self {
            name: "default".to_string(),
            request_timeout: Duration::from_millis(1_000),
            request_trip_threshold: 3,
            recovery_interval: Duration::from_millis(2_000),
            recovery_restore_threshold: 5,
        }
    }
}

impl BreakerConfig {
    /// Create a config with default timings under the given name.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_request_trip_threshold(mut self, threshold: u32) -> Self {
        self.request_trip_threshold = threshold;
        self
    }

    pub fn with_recovery_interval(mut self, interval: Duration) -> Self {
        self.recovery_interval = interval;
        self
    }

    pub fn with_recovery_restore_threshold(mut self, threshold: u32) -> Self {
        self.recovery_restore_threshold = threshold;
        self
    }
}

/// Serde adapter: `Duration` as whole milliseconds.
mod millis {
    use super::*;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(u64::try_from(value.as_millis()).unwrap_or(u64::MAX))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}

/// Simulated backend configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Number of queries the binary issues before exiting.
    pub requests: u64,

    /// Pause between consecutive queries in milliseconds.
    pub request_interval_ms: u64,

    /// Base latency of every simulated call in milliseconds.
    pub latency_ms: u64,

    /// Probability (0.0..=1.0) that a call reports an error.
    pub failure_rate: f64,

    /// Probability (0.0..=1.0) that a call never completes.
    pub hang_rate: f64,

    /// Optional window of calls that always fail.
    pub outage: Option<OutageConfig>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            requests: 200,
            request_interval_ms: 50,
            latency_ms: 10,
            failure_rate: 0.05,
            hang_rate: 0.0,
            outage: Some(OutageConfig {
                start_call: 40,
                length: 60,
            }),
        }
    }
}

/// A deterministic run of failing calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct OutageConfig {
    /// Zero-based call number at which the outage begins.
    pub start_call: u64,

    /// Number of calls the outage lasts.
    pub length: u64,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log filter used when `RUST_LOG` is not set.
    pub log_level: String,

    /// Enable the Prometheus metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}
