//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, thresholds >= 1, rates in 0..=1)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is a pure function over the parsed config
//! - Runs before a breaker is constructed, never at query time

use thiserror::Error;

use crate::config::schema::{BreakerConfig, FuseConfig, SimulationConfig};

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{field} must be greater than zero")]
    ZeroDuration { field: &'static str },

    #[error("{field} must be at least 1")]
    ZeroThreshold { field: &'static str },

    #[error("{field} must be between 0.0 and 1.0")]
    RateOutOfRange { field: &'static str },

    #[error("breaker name must not be empty")]
    EmptyName,
}

/// Check a breaker configuration.
pub fn validate_breaker(config: &BreakerConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.name.trim().is_empty() {
        errors.push(ValidationError::EmptyName);
    }
    if config.request_timeout.is_zero() {
        errors.push(ValidationError::ZeroDuration {
            field: "request_timeout_ms",
        });
    }
    if config.request_trip_threshold == 0 {
        errors.push(ValidationError::ZeroThreshold {
            field: "request_trip_threshold",
        });
    }
    if config.recovery_interval.is_zero() {
        errors.push(ValidationError::ZeroDuration {
            field: "recovery_interval_ms",
        });
    }
    if config.recovery_restore_threshold == 0 {
        errors.push(ValidationError::ZeroThreshold {
            field: "recovery_restore_threshold",
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn validate_simulation(config: &SimulationConfig, errors: &mut Vec<ValidationError>) {
    if !(0.0..=1.0).contains(&config.failure_rate) {
        errors.push(ValidationError::RateOutOfRange {
            field: "simulation.failure_rate",
        });
    }
    if !(0.0..=1.0).contains(&config.hang_rate) {
        errors.push(ValidationError::RateOutOfRange {
            field: "simulation.hang_rate",
        });
    }
}

/// Check a full binary configuration.
pub fn validate_config(config: &FuseConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = validate_breaker(&config.breaker).err().unwrap_or_default();
    validate_simulation(&config.simulation, &mut errors);

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
