//! The protected action.
//!
//! The breaker never knows what the action does. It only calls it,
//! bounds it with a deadline and looks at whether it succeeded.

use std::fmt::Display;
use std::future::Future;

use async_trait::async_trait;

/// A potentially slow or failing operation guarded by a breaker.
///
/// Implementations are shared read-only behind an `Arc`; calls may run
/// concurrently and may outlive the caller that started them (a timed-out
/// call keeps running in the background).
#[async_trait]
pub trait Action<Req: Send + 'static>: Send + Sync + 'static {
    type Response: Send + 'static;
    type Error: Display + Send + 'static;

    async fn call(&self, request: Req) -> Result<Self::Response, Self::Error>;
}

/// Adapter turning an async closure into an [`Action`].
#[derive(Debug, Clone)]
pub struct FnAction<F>(F);

/// Wrap `f` so it can be guarded by a breaker.
///
/// ```
/// use fuse_breaker::action_fn;
///
/// let action = action_fn(|n: u32| async move {
///     if n % 2 == 0 { Ok(n / 2) } else { Err(format!("{n} is odd")) }
/// });
/// # let _ = action;
/// ```
pub fn action_fn<F>(f: F) -> FnAction<F> {
    FnAction(f)
}

#[async_trait]
impl<Req, F, Fut, Resp, E> Action<Req> for FnAction<F>
where
    Req: Send + 'static,
    F: Fn(Req) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Resp, E>> + Send + 'static,
    Resp: Send + 'static,
    E: Display + Send + 'static,
{
    type Response = Resp;
    type Error = E;

    async fn call(&self, request: Req) -> Result<Resp, E> {
        (self.0)(request).await
    }
}
