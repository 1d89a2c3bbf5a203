//! fuse-breaker demo driver
//!
//! Drives a [`Breaker`] around a [`SimulatedBackend`] so trips, probes and
//! restores can be watched in the logs (and on the metrics endpoint).
//!
//! ```text
//!   query loop ──▶ Breaker ──▶ SimulatedBackend
//!                    │  ▲
//!          trip      ▼  │ restore
//!                 recovery loop (probes)
//! ```

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;

use fuse_breaker::config::{load_config, FuseConfig};
use fuse_breaker::lifecycle::{signals, Shutdown};
use fuse_breaker::observability::{logging, metrics};
use fuse_breaker::simulation::SimulatedBackend;
use fuse_breaker::Breaker;

#[derive(Parser)]
#[command(name = "fuse-breaker")]
#[command(about = "Run a circuit breaker against a simulated backend", long_about = None)]
struct Cli {
    /// TOML configuration file. Built-in defaults are used when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the number of queries to issue.
    #[arg(short, long)]
    requests: Option<u64>,

    /// Serve Prometheus metrics on this address.
    #[arg(long)]
    metrics_address: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => FuseConfig::default(),
    };
    if let Some(requests) = cli.requests {
        config.simulation.requests = requests;
    }
    if let Some(addr) = cli.metrics_address {
        config.observability.metrics_enabled = true;
        config.observability.metrics_address = addr;
    }

    logging::init_logging(&config.observability.log_level)?;

    tracing::info!(
        breaker = %config.breaker.name,
        request_timeout = ?config.breaker.request_timeout,
        request_trip_threshold = config.breaker.request_trip_threshold,
        recovery_interval = ?config.breaker.recovery_interval,
        recovery_restore_threshold = config.breaker.recovery_restore_threshold,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr)?,
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let backend = Arc::new(SimulatedBackend::new(&config.simulation));
    let breaker = Breaker::with_tracing(Arc::clone(&backend), 0, &config.breaker)?;

    let shutdown = Arc::new(Shutdown::new());
    signals::spawn_ctrl_c_handler(Arc::clone(&shutdown));
    let mut stop = shutdown.subscribe();

    let pause = Duration::from_millis(config.simulation.request_interval_ms);
    let (mut ok, mut failed, mut fast_failed) = (0u64, 0u64, 0u64);

    for n in 0..config.simulation.requests {
        match breaker.query(n).await {
            Ok(_) => ok += 1,
            Err(e) if e.is_fast_fail() => fast_failed += 1,
            Err(_) => failed += 1,
        }

        tokio::select! {
            _ = tokio::time::sleep(pause) => {}
            _ = stop.recv() => break,
        }
    }

    tracing::info!(
        ok,
        failed,
        fast_failed,
        backend_calls = backend.calls(),
        "Simulation finished"
    );
    println!("{}", serde_json::to_string_pretty(&breaker.snapshot())?);

    Ok(())
}
