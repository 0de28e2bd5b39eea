//! Shutdown coordination.

use tokio::sync::broadcast;

/// Stop request shared by the HTTP server and the payment monitor.
///
/// Each long-running task subscribes once; `trigger` reaches every
/// subscriber, including ones still busy with a verification cycle.
#[derive(Clone)]
pub struct Shutdown {
    tx: broadcast::Sender<()>,
}

impl Shutdown {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(1);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<()> {
        self.tx.subscribe()
    }

    /// Ask every subscriber to stop, logging why.
    ///
    /// Returns the number of tasks notified.
    pub fn trigger(&self, reason: &'static str) -> usize {
        let notified = self.tx.send(()).unwrap_or(0);
        tracing::info!(reason, notified, "Shutdown requested");
        notified
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}
