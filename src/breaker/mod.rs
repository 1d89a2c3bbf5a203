//! Circuit breaker subsystem.
//!
//! # Data Flow
//! ```text
//! Dispatch path (dispatch.rs), any number of concurrent callers:
//!     query(request)
//!     → Tripped? return FastFail
//!     → resilience::race_deadline(action.call(request))
//!     → success: reset failure streak
//!     → failure/timeout: count it (state.rs), maybe trip
//!     → trip: spawn recovery.rs (once per episode)
//!
//! Recovery path (recovery.rs), one task per trip:
//!     sleep(recovery_interval) → probe → count streak (state.rs)
//!     → streak == restore threshold: restore, exit
//!     → breaker dropped: exit
//! ```
//!
//! # Design Decisions
//! - One mutex guards health, both counters and the recovery flag
//! - Events are queued to a dispatcher task that feeds a pluggable
//!   `Notifier`; metrics go to the `metrics` facade
//! - Stale results of timed-out calls are discarded, never delivered

pub mod action;
pub mod dispatch;
pub mod error;
pub mod notifier;
mod recovery;
mod shared;
pub mod state;

pub use action::{action_fn, Action, FnAction};
pub use dispatch::Breaker;
pub use error::{BreakerError, QueryError};
pub use notifier::{BreakerEvent, ChannelNotifier, Notifier, TracingNotifier};
pub use state::{BreakerSnapshot, Health};
