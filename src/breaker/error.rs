//! Breaker error definitions.

use std::time::Duration;

use thiserror::Error;

use crate::config::loader::join_errors;
use crate::config::ValidationError;

/// Failure outcome of a single [`query`](crate::Breaker::query).
///
/// All variants are ordinary, expected results; none of them means the
/// breaker itself is broken.
#[derive(Debug, Error)]
pub enum QueryError<E> {
    /// The action completed but reported an error.
    #[error("action failed: {0}")]
    Action(E),

    /// The action did not complete within the request timeout.
    #[error("action timed out after {0:?}")]
    Timeout(Duration),

    /// The breaker is tripped; the action was not invoked.
    #[error("breaker is tripped, action not invoked")]
    FastFail,

    /// The action task panicked.
    #[error("action panicked")]
    Panicked,
}

impl<E> QueryError<E> {
    pub fn is_fast_fail(&self) -> bool {
        matches!(self, QueryError::FastFail)
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, QueryError::Timeout(_))
    }

    /// Short label for logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            QueryError::Action(_) => "action_error",
            QueryError::Timeout(_) => "timeout",
            QueryError::FastFail => "fast_fail",
            QueryError::Panicked => "panicked",
        }
    }
}

/// Errors raised while constructing a breaker.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BreakerError {
    #[error("invalid breaker configuration: {}", join_errors(.0))]
    InvalidConfig(Vec<ValidationError>),

    #[error("breaker must be created inside a Tokio runtime")]
    NoRuntime,
}
