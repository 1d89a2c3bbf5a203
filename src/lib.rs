//! Circuit breaker ("fuse") for slow or failing async actions.
//!
//! A [`Breaker`] wraps a caller-supplied [`Action`]. While the action
//! behaves, queries pass through under a deadline. After enough consecutive
//! failures the breaker trips: queries fail fast and a background task
//! probes the action until it has succeeded often enough in a row, then
//! the breaker is restored.

pub mod breaker;
pub mod config;
pub mod lifecycle;
pub mod observability;
pub mod resilience;
pub mod simulation;

pub use breaker::{
    action_fn, Action, Breaker, BreakerError, BreakerEvent, BreakerSnapshot, ChannelNotifier,
    FnAction, Health, Notifier, QueryError, TracingNotifier,
};
pub use config::{BreakerConfig, FuseConfig};
