//! Background payment monitoring service.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::time::sleep;

use crate::config::PaymentConfig;
use crate::payments::verifier::PaymentVerifier;

/// Service that re-checks the payment on a fixed interval.
///
/// Keeps the persisted unlock current even when no client is polling.
pub struct PaymentMonitor {
    verifier: Arc<PaymentVerifier>,
    config: PaymentConfig,
}

impl PaymentMonitor {
    /// Create a new payment monitor.
    pub fn new(verifier: Arc<PaymentVerifier>, config: PaymentConfig) -> Self {
        Self { verifier, config }
    }

    /// Run the monitor loop until `shutdown` fires.
    pub async fn run(self, mut shutdown: broadcast::Receiver<()>) {
        if !self.config.monitor_enabled {
            tracing::info!("Payment monitor disabled");
            return;
        }

        tracing::info!(
            address = %self.verifier.address(),
            interval_ms = self.config.monitor_interval_ms,
            "Starting payment monitor"
        );

        let interval = Duration::from_millis(self.config.monitor_interval_ms);
        let mut was_unlocked = false;

        loop {
            let status = self.verifier.check().await;
            if status.is_unlocked() && !was_unlocked {
                tracing::info!(status = status.label(), "Monitor observed unlocked payment");
            }
            was_unlocked = status.is_unlocked();

            tokio::select! {
                _ = sleep(interval) => {}
                _ = shutdown.recv() => {
                    tracing::info!("Payment monitor stopping");
                    return;
                }
            }
        }
    }
}
