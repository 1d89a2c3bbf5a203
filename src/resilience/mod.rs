//! Resilience primitives shared by the breaker's two control paths.
//!
//! # Data Flow
//! ```text
//! Dispatch or probe:
//!     → timeouts.rs (spawn action, race it against the deadline)
//!     → Attempt { Completed | Failed | TimedOut | Panicked }
//!     → breaker state machine decides what the outcome means
//! ```
//!
//! # Design Decisions
//! - Timeouts are non-negotiable; every action call has a deadline
//! - The caller is unblocked at the deadline even if the action is not

pub mod timeouts;

pub use timeouts::{race_deadline, Attempt};
