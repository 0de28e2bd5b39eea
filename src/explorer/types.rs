//! Explorer data types and error definitions.

use serde::Deserialize;
use thiserror::Error;

// Re-export ExplorerConfig from config module to avoid duplication
pub use crate::config::schema::ExplorerConfig;

/// Errors that can occur while talking to the explorer.
#[derive(Debug, Error)]
pub enum ExplorerError {
    /// Request did not complete within the configured timeout.
    #[error("explorer timeout after {0} seconds")]
    Timeout(u64),

    /// Connection, DNS or protocol failure.
    #[error("explorer transport error: {0}")]
    Transport(String),

    /// Explorer answered with a non-success status code.
    #[error("explorer returned HTTP {0}")]
    Status(u16),

    /// Response body could not be decoded.
    #[error("malformed explorer response: {0}")]
    Malformed(String),

    /// A configured base URL is unusable.
    #[error("invalid explorer URL: {0}")]
    InvalidUrl(String),
}

/// Result type for explorer operations.
pub type ExplorerResult<T> = Result<T, ExplorerError>;

/// A transaction as reported by an Esplora-style explorer.
///
/// Missing fields take the explorer's implicit defaults: no outputs,
/// unconfirmed, zero value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Transaction {
    #[serde(default)]
    pub txid: String,
    #[serde(default)]
    pub status: TxStatus,
    #[serde(default)]
    pub vout: Vec<TxOutput>,
}

/// Confirmation status of a transaction.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct TxStatus {
    #[serde(default)]
    pub confirmed: bool,
    #[serde(default)]
    pub block_height: Option<u64>,
}

/// A single transaction output.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct TxOutput {
    #[serde(default)]
    pub scriptpubkey_address: Option<String>,
    /// Value in satoshis.
    #[serde(default)]
    pub value: u64,
}

impl Transaction {
    /// Total value, in satoshis, paid to `address` across all outputs.
    pub fn amount_to(&self, address: &str) -> u64 {
        self.vout
            .iter()
            .filter(|out| out.scriptpubkey_address.as_deref() == Some(address))
            .fold(0u64, |acc, out| acc.saturating_add(out.value))
    }

    /// Block height if the transaction is confirmed.
    ///
    /// A confirmed transaction without a height is treated as height 0.
    pub fn confirmed_height(&self) -> Option<u64> {
        self.status
            .confirmed
            .then(|| self.status.block_height.unwrap_or(0))
    }
}

/// Decode an explorer transaction list.
///
/// The body must be a JSON array; entries that do not decode as a
/// transaction are skipped.
pub fn decode_transactions(body: &[u8]) -> ExplorerResult<Vec<Transaction>> {
    let entries: Vec<serde_json::Value> = serde_json::from_slice(body)
        .map_err(|e| ExplorerError::Malformed(format!("transaction list: {}", e)))?;

    let mut transactions = Vec::with_capacity(entries.len());
    for entry in entries {
        match serde_json::from_value::<Transaction>(entry) {
            Ok(tx) => transactions.push(tx),
            Err(e) => tracing::debug!(error = %e, "Skipping undecodable transaction entry"),
        }
    }
    Ok(transactions)
}

/// Decode the plain-text tip height.
pub fn decode_tip_height(body: &str) -> ExplorerResult<u64> {
    body.trim()
        .parse()
        .map_err(|e| ExplorerError::Malformed(format!("tip height '{}': {}", body.trim(), e)))
}
