//! Shutdown coordination for breaker background tasks.

use tokio::sync::broadcast;

/// Coordinator for stopping long-running tasks.
///
/// Tasks hold a [`ShutdownSignal`]. The signal fires either when
/// [`Shutdown::trigger`] is called or when the `Shutdown` itself is dropped,
/// so a task tied to an owner's lifetime stops once the owner is gone.
#[derive(Debug)]
pub struct Shutdown {
    tx: broadcast::Sender<()>,
}

impl Shutdown {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(1);
        Self { tx }
    }

    /// Subscribe to the shutdown signal.
    pub fn subscribe(&self) -> ShutdownSignal {
        ShutdownSignal {
            rx: self.tx.subscribe(),
        }
    }

    /// Trigger the shutdown signal for every current subscriber.
    pub fn trigger(&self) {
        let _ = self.tx.send(());
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}

/// Receiving half handed to a background task.
#[derive(Debug)]
pub struct ShutdownSignal {
    rx: broadcast::Receiver<()>,
}

impl ShutdownSignal {
    /// Resolve once shutdown is triggered or the coordinator is dropped.
    pub async fn recv(&mut self) {
        // Ok(()) = triggered, Err(Closed) = owner dropped. Both mean stop.
        let _ = self.rx.recv().await;
    }
}
