//! Selects the transaction of interest and computes its confirmations.
//!
//! Selection walks the explorer's order as given. The first transaction
//! that reaches the threshold wins; if none does, the first incoming
//! transaction is reported as unconfirmed.

use std::future::Future;
use tokio::sync::OnceCell;

use crate::explorer::Transaction;
use crate::payments::types::{ConfirmationEvaluation, REQUIRED_CONFIRMATIONS};

/// Confirmation depth of a block at `block_height` given the chain tip.
///
/// Never less than 1 for a confirmed transaction, even when the explorer
/// reports a height above the tip.
pub fn confirmations_at(tip_height: u64, block_height: u64) -> u64 {
    tip_height
        .saturating_sub(block_height)
        .saturating_add(1)
        .max(1)
}

/// Evaluate `transactions` for payments to `address`.
///
/// `tip_height` is awaited at most once, and only when a confirmed
/// incoming transaction is reached. Its error aborts the evaluation.
/// Returns `None` when no transaction pays the address.
pub async fn evaluate<F, Fut, E>(
    transactions: &[Transaction],
    address: &str,
    tip_height: F,
) -> Result<Option<ConfirmationEvaluation>, E>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<u64, E>>,
{
    let tip = OnceCell::new();
    let mut latest_incoming: Option<(&Transaction, u64)> = None;

    for tx in transactions {
        let amount_sats = tx.amount_to(address);
        if amount_sats == 0 {
            continue;
        }

        if latest_incoming.is_none() {
            latest_incoming = Some((tx, amount_sats));
        }

        let confirmations = match tx.confirmed_height() {
            Some(block_height) => {
                let tip_height = *tip.get_or_try_init(&tip_height).await?;
                confirmations_at(tip_height, block_height)
            }
            None => 0,
        };

        if confirmations >= REQUIRED_CONFIRMATIONS {
            return Ok(Some(ConfirmationEvaluation::new(
                tx.txid.clone(),
                amount_sats,
                confirmations,
            )));
        }
    }

    Ok(latest_incoming
        .map(|(tx, amount_sats)| ConfirmationEvaluation::new(tx.txid.clone(), amount_sats, 0)))
}
