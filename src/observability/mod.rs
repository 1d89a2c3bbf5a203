//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Breaker produces:
//!     → BreakerEvent (notifier, e.g. TracingNotifier → logging.rs output)
//!     → metrics.rs (counters, gauges)
//!
//! Consumers:
//!     → stdout via tracing-subscriber
//!     → Prometheus scrape endpoint (binary only)
//! ```

pub mod logging;
pub mod metrics;
