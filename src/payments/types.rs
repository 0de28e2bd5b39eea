//! Payment evaluation and state types.

use serde::{Deserialize, Serialize};

/// Confirmations required before the bundle unlocks.
pub const REQUIRED_CONFIRMATIONS: u64 = 1;

/// Satoshis per bitcoin.
pub const SATS_PER_BTC: u64 = 100_000_000;

/// Convert satoshis to a BTC amount for display.
pub fn sat_to_btc(sats: u64) -> f64 {
    sats as f64 / SATS_PER_BTC as f64
}

/// Snapshot of the transaction selected from one explorer read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfirmationEvaluation {
    /// Transaction id.
    pub txid: String,
    /// Sum of the outputs paying the watched address.
    pub amount_sats: u64,
    /// Blocks since inclusion, counting the including block. 0 if unconfirmed.
    pub confirmations: u64,
    /// `confirmations >= REQUIRED_CONFIRMATIONS`.
    pub is_unlocked: bool,
}

impl ConfirmationEvaluation {
    pub fn new(txid: String, amount_sats: u64, confirmations: u64) -> Self {
        Self {
            txid,
            amount_sats,
            confirmations,
            is_unlocked: confirmations >= REQUIRED_CONFIRMATIONS,
        }
    }

    pub fn amount_btc(&self) -> f64 {
        sat_to_btc(self.amount_sats)
    }
}

/// Durable record of the last unlocked payment.
///
/// Field names match the persisted JSON file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentState {
    pub txid: String,
    pub amount_sats: u64,
    pub amount_btc: f64,
    pub confirmations: u64,
    #[serde(default = "default_required")]
    pub required_confirmations: u64,
    #[serde(default)]
    pub is_unlocked: bool,
}

fn default_required() -> u64 {
    REQUIRED_CONFIRMATIONS
}

impl PaymentState {
    /// Record an unlocking evaluation.
    ///
    /// The unlock flag is always set: only unlocks are ever persisted.
    pub fn unlocked(evaluation: &ConfirmationEvaluation) -> Self {
        Self {
            txid: evaluation.txid.clone(),
            amount_sats: evaluation.amount_sats,
            amount_btc: evaluation.amount_btc(),
            confirmations: evaluation.confirmations,
            required_confirmations: REQUIRED_CONFIRMATIONS,
            is_unlocked: true,
        }
    }
}

/// Where an unlocked status came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusSource {
    /// The explorer read that just completed.
    Fresh,
    /// A prior unlock outranking a fresh read that did not unlock.
    Persisted,
    /// A prior unlock served while the explorer is unreachable.
    Cache { reason: String },
}

/// The status reported to callers after reconciliation.
#[derive(Debug, Clone, PartialEq)]
pub enum AuthoritativeStatus {
    Unlocked {
        payment: PaymentState,
        source: StatusSource,
    },
    Unconfirmed(ConfirmationEvaluation),
    NoTransaction,
    Unavailable {
        reason: String,
    },
}

impl AuthoritativeStatus {
    pub fn is_unlocked(&self) -> bool {
        matches!(self, AuthoritativeStatus::Unlocked { .. })
    }

    /// Short label used for logs and metrics.
    pub fn label(&self) -> &'static str {
        match self {
            AuthoritativeStatus::Unlocked { source: StatusSource::Cache { .. }, .. } => "unlocked_cache",
            AuthoritativeStatus::Unlocked { .. } => "unlocked",
            AuthoritativeStatus::Unconfirmed(_) => "unconfirmed",
            AuthoritativeStatus::NoTransaction => "no_transaction",
            AuthoritativeStatus::Unavailable { .. } => "unavailable",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sat_to_btc() {
        assert_eq!(sat_to_btc(100_000_000), 1.0);
        assert_eq!(sat_to_btc(50_000), 0.0005);
    }

    #[test]
    fn test_evaluation_threshold() {
        assert!(!ConfirmationEvaluation::new("a".into(), 1, 0).is_unlocked);
        assert!(ConfirmationEvaluation::new("a".into(), 1, 1).is_unlocked);
        assert!(ConfirmationEvaluation::new("a".into(), 1, 6).is_unlocked);
    }

    #[test]
    fn test_state_file_format() {
        let state = PaymentState::unlocked(&ConfirmationEvaluation::new("abc".into(), 50_000, 2));
        let json = serde_json::to_value(&state).unwrap();
        assert_eq!(json["txid"], "abc");
        assert_eq!(json["amount_sats"], 50_000);
        assert_eq!(json["amount_btc"], 0.0005);
        assert_eq!(json["confirmations"], 2);
        assert_eq!(json["required_confirmations"], 1);
        assert_eq!(json["is_unlocked"], true);
    }

    #[test]
    fn test_state_missing_flag_reads_locked() {
        let state: PaymentState = serde_json::from_str(
            r#"{"txid":"x","amount_sats":1,"amount_btc":0.00000001,"confirmations":1}"#,
        )
        .unwrap();
        assert!(!state.is_unlocked);
        assert_eq!(state.required_confirmations, 1);
    }
}
