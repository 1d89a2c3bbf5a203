//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Breaker disposal (shutdown.rs):
//!     Last Breaker handle dropped → Shutdown sender dropped
//!     → recovery task's ShutdownSignal resolves → task exits
//!
//! Signals (signals.rs):
//!     SIGINT → Shutdown::trigger → binary stops its query loop
//! ```

pub mod shutdown;
pub mod signals;

pub use shutdown::{Shutdown, ShutdownSignal};
