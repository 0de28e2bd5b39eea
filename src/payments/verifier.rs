//! One fetch, evaluate, reconcile and persist cycle.
//!
//! Every step is time-bounded: the explorer read by a single deadline
//! covering all endpoints and both calls, the state file by its own I/O
//! limit. A cycle therefore always finishes, and a persisted unlock is
//! always consulted, before the request timeout fires.

use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;

use crate::config::GateConfig;
use crate::explorer::{ExplorerClient, ExplorerError, ExplorerResult};
use crate::observability::metrics;
use crate::payments::evaluator::evaluate;
use crate::payments::reconcile::{reconcile, FetchOutcome, Reconciliation};
use crate::payments::store::{PaymentStateStore, StorageError};
use crate::payments::types::{AuthoritativeStatus, ConfirmationEvaluation, PaymentState};

/// Verifies the payment to the watched address.
///
/// Cheap to share behind an `Arc`; each `check` is independent.
pub struct PaymentVerifier {
    client: ExplorerClient,
    store: Arc<dyn PaymentStateStore>,
    address: String,
    deadline: Duration,
    store_timeout: Duration,
}

impl PaymentVerifier {
    pub fn new(client: ExplorerClient, store: Arc<dyn PaymentStateStore>, address: String) -> Self {
        let defaults = GateConfig::default();
        Self {
            client,
            store,
            address,
            deadline: Duration::from_secs(defaults.explorer.deadline_secs),
            store_timeout: Duration::from_millis(defaults.storage.io_timeout_ms),
        }
    }

    /// Build a verifier with the limits from `config`.
    pub fn from_config(
        client: ExplorerClient,
        store: Arc<dyn PaymentStateStore>,
        config: &GateConfig,
    ) -> Self {
        Self::new(client, store, config.payment.address.clone())
            .with_deadline(Duration::from_secs(config.explorer.deadline_secs))
            .with_store_timeout(Duration::from_millis(config.storage.io_timeout_ms))
    }

    /// Bound the whole explorer read.
    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = deadline;
        self
    }

    /// Bound each state file read or write.
    pub fn with_store_timeout(mut self, store_timeout: Duration) -> Self {
        self.store_timeout = store_timeout;
        self
    }

    /// The watched address.
    pub fn address(&self) -> &str {
        &self.address
    }

    /// Run one verification cycle and return the authoritative status.
    ///
    /// A failed state write is logged and does not change the result.
    pub async fn check(&self) -> AuthoritativeStatus {
        let persisted = self.load_state().await;

        let fetched = match timeout(self.deadline, self.fetch_evaluation()).await {
            Ok(result) => result,
            Err(_) => Err(ExplorerError::Timeout(self.deadline.as_secs())),
        };
        let outcome = match fetched {
            Ok(evaluation) => FetchOutcome::Evaluated(evaluation),
            Err(e) => {
                tracing::warn!(address = %self.address, error = %e, "Explorer unavailable");
                FetchOutcome::Failed {
                    reason: e.to_string(),
                }
            }
        };

        let Reconciliation { status, persist } = reconcile(outcome, persisted);

        if let Some(state) = persist {
            match self.save_state(state.clone()).await {
                Ok(()) => {
                    metrics::record_state_write(true);
                    tracing::info!(
                        txid = %state.txid,
                        amount_sats = state.amount_sats,
                        confirmations = state.confirmations,
                        "Payment unlocked and persisted"
                    );
                }
                Err(e) => {
                    metrics::record_state_write(false);
                    tracing::error!(txid = %state.txid, error = %e, "Failed to persist payment state");
                }
            }
        }

        metrics::record_status_check(status.label());
        tracing::debug!(status = status.label(), "Payment check complete");
        status
    }

    async fn fetch_evaluation(&self) -> ExplorerResult<Option<ConfirmationEvaluation>> {
        let transactions = self.client.address_transactions(&self.address).await?;
        evaluate(&transactions, &self.address, || self.client.tip_height()).await
    }

    async fn load_state(&self) -> Option<PaymentState> {
        let store = self.store.clone();
        match timeout(self.store_timeout, tokio::task::spawn_blocking(move || store.load())).await {
            Ok(Ok(state)) => state,
            Ok(Err(e)) => {
                tracing::error!(error = %e, "Payment state load task failed");
                None
            }
            Err(_) => {
                tracing::warn!(
                    timeout_ms = self.store_timeout.as_millis() as u64,
                    "Timed out loading payment state"
                );
                None
            }
        }
    }

    async fn save_state(&self, state: PaymentState) -> Result<(), StorageError> {
        let store = self.store.clone();
        match timeout(
            self.store_timeout,
            tokio::task::spawn_blocking(move || store.save(&state)),
        )
        .await
        {
            Ok(Ok(result)) => result,
            Ok(Err(e)) => Err(StorageError::Task(e.to_string())),
            Err(_) => Err(StorageError::Timeout(self.store_timeout.as_millis() as u64)),
        }
    }
}

impl std::fmt::Debug for PaymentVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PaymentVerifier")
            .field("address", &self.address)
            .field("client", &self.client)
            .field("deadline", &self.deadline)
            .field("store_timeout", &self.store_timeout)
            .finish()
    }
}
