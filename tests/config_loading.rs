//! Loading breaker configuration from TOML files.

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use fuse_breaker::config::{load_config, ConfigError, ValidationError};
use fuse_breaker::simulation::SimulatedBackend;
use fuse_breaker::{Breaker, BreakerError};

fn write_temp(name: &str, content: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!("fuse-breaker-{}-{name}.toml", std::process::id()));
    fs::write(&path, content).unwrap();
    path
}

#[test]
fn test_load_full_config() {
    let path = write_temp(
        "full",
        r#"
        [breaker]
        name = "inventory"
        request_timeout_ms = 250
        request_trip_threshold = 4
        recovery_interval_ms = 1500
        recovery_restore_threshold = 2

        [simulation]
        requests = 10
        failure_rate = 0.5
        outage = { start_call = 3, length = 4 }

        [observability]
        log_level = "debug"
        "#,
    );

    let config = load_config(&path).unwrap();
    fs::remove_file(&path).ok();

    assert_eq!(config.breaker.name, "inventory");
    assert_eq!(config.breaker.request_timeout.as_millis(), 250);
    assert_eq!(config.breaker.request_trip_threshold, 4);
    assert_eq!(config.breaker.recovery_interval.as_millis(), 1500);
    assert_eq!(config.breaker.recovery_restore_threshold, 2);
    assert_eq!(config.simulation.requests, 10);
    assert_eq!(config.simulation.outage.map(|o| o.length), Some(4));
    assert_eq!(config.observability.log_level, "debug");
}

#[test]
fn test_missing_file_is_io_error() {
    let path = std::env::temp_dir().join("fuse-breaker-does-not-exist.toml");
    assert!(matches!(load_config(&path), Err(ConfigError::Io(_))));
}

#[test]
fn test_zero_threshold_rejected_at_load() {
    let path = write_temp(
        "zero",
        r#"
        [breaker]
        request_trip_threshold = 0
        "#,
    );

    let err = load_config(&path).unwrap_err();
    fs::remove_file(&path).ok();

    match err {
        ConfigError::Validation(errors) => assert_eq!(
            errors,
            vec![ValidationError::ZeroThreshold {
                field: "request_trip_threshold"
            }]
        ),
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn test_loaded_config_builds_breaker() {
    let path = write_temp(
        "build",
        r#"
        [breaker]
        name = "sim"
        request_timeout_ms = 500

        [simulation]
        latency_ms = 0
        failure_rate = 0.0
        "#,
    );
    let config = load_config(&path).unwrap();
    fs::remove_file(&path).ok();

    let backend = Arc::new(SimulatedBackend::new(&config.simulation));
    let breaker = Breaker::with_tracing(backend, 0, &config.breaker).unwrap();
    assert_eq!(breaker.name(), "sim");
    // Call 0 is outside the default outage window.
    assert_eq!(breaker.query(9).await.unwrap(), 9);
}

#[test]
fn test_unvalidated_config_rejected_by_breaker() {
    let mut config = fuse_breaker::BreakerConfig::named("raw");
    config.recovery_interval = std::time::Duration::ZERO;

    let backend = Arc::new(SimulatedBackend::new(&Default::default()));
    let err = Breaker::with_tracing(backend, 0, &config).unwrap_err();
    assert_eq!(
        err,
        BreakerError::InvalidConfig(vec![ValidationError::ZeroDuration {
            field: "recovery_interval_ms"
        }])
    );
}
