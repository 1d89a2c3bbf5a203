//! Timeout enforcement.
//!
//! # Responsibilities
//! - Run an action invocation as its own task
//! - Race its completion against a deadline
//! - Hand exactly one outcome back to the waiting caller
//!
//! # Design Decisions
//! - Uses Tokio's timeout facilities
//! - A timed-out task is detached, not aborted; its late result is dropped
//!   together with the `JoinHandle` and never reaches the caller
//! - Timeout is distinct from an action-reported error

use std::future::Future;
use std::time::Duration;

use tokio::time;

/// Result of one deadline-bounded invocation.
#[derive(Debug, PartialEq, Eq)]
pub enum Attempt<T, E> {
    /// The action produced a response before the deadline.
    Completed(T),
    /// The action reported an error before the deadline.
    Failed(E),
    /// The deadline fired first.
    TimedOut,
    /// The action task panicked before the deadline.
    Panicked,
}

impl<T, E> Attempt<T, E> {
    pub fn is_success(&self) -> bool {
        matches!(self, Attempt::Completed(_))
    }
}

/// Spawn `fut` and wait for it for at most `deadline`.
pub async fn race_deadline<F, T, E>(deadline: Duration, fut: F) -> Attempt<T, E>
where
    F: Future<Output = Result<T, E>> + Send + 'static,
    T: Send + 'static,
    E: Send + 'static,
{
    let handle = tokio::spawn(fut);

    match time::timeout(deadline, handle).await {
        Ok(Ok(Ok(value))) => Attempt::Completed(value),
        Ok(Ok(Err(e))) => Attempt::Failed(e),
        Ok(Err(join_err)) => {
            tracing::error!(error = %join_err, "Action task did not complete");
            Attempt::Panicked
        }
        // The JoinHandle was consumed by the timeout future and is gone now,
        // so the task keeps running detached and its output is discarded.
        Err(_) => Attempt::TimedOut,
    }
}
