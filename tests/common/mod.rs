//! Shared utilities for breaker integration tests.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use fuse_breaker::{Action, BreakerConfig, BreakerEvent};
use tokio::sync::mpsc;

/// What one scripted call does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(dead_code)]
pub enum Step {
    Succeed,
    Fail,
    Hang,
    /// Succeed, but only after the given delay.
    SlowSucceed(Duration),
}

/// An action that plays back a script of steps, then repeats a fallback.
#[derive(Debug)]
pub struct ScriptedAction {
    script: Mutex<VecDeque<Step>>,
    fallback: Step,
    calls: AtomicUsize,
}

#[allow(dead_code)]
impl ScriptedAction {
    pub fn new(script: impl IntoIterator<Item = Step>, fallback: Step) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(script.into_iter().collect()),
            fallback,
            calls: AtomicUsize::new(0),
        })
    }

    pub fn always(step: Step) -> Arc<Self> {
        Self::new([], step)
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn next_step(&self) -> Step {
        self.script.lock().unwrap().pop_front().unwrap_or(self.fallback)
    }
}

#[async_trait]
impl Action<u32> for ScriptedAction {
    type Response = u32;
    type Error = String;

    async fn call(&self, request: u32) -> Result<u32, String> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        match self.next_step() {
            Step::Succeed => Ok(request),
            Step::Fail => Err(format!("scripted failure on call {call}")),
            Step::Hang => std::future::pending().await,
            Step::SlowSucceed(delay) => {
                tokio::time::sleep(delay).await;
                Ok(request)
            }
        }
    }
}

#[allow(dead_code)]
pub fn config(
    request_timeout_ms: u64,
    request_trip_threshold: u32,
    recovery_interval_ms: u64,
    recovery_restore_threshold: u32,
) -> BreakerConfig {
    BreakerConfig {
        name: "test".to_string(),
        request_timeout: Duration::from_millis(request_timeout_ms),
        request_trip_threshold,
        recovery_interval: Duration::from_millis(recovery_interval_ms),
        recovery_restore_threshold,
    }
}

/// Receive the next event, failing the test if none arrives in time.
#[allow(dead_code)]
pub async fn next_event(rx: &mut mpsc::UnboundedReceiver<BreakerEvent>) -> BreakerEvent {
    tokio::time::timeout(Duration::from_secs(60), rx.recv())
        .await
        .expect("no breaker event within 60s")
        .expect("event channel closed")
}
