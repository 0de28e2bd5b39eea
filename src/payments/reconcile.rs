//! Combines a fresh explorer read with the persisted unlock.
//!
//! A prior unlock always outranks a fresh read that does not unlock,
//! whether the read failed or simply did not see a confirmation. Without
//! a prior unlock, failures surface as `Unavailable`.

use crate::payments::types::{
    AuthoritativeStatus, ConfirmationEvaluation, PaymentState, StatusSource,
};

/// Result of one explorer read.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome {
    /// The read completed; `None` means no incoming transaction yet.
    Evaluated(Option<ConfirmationEvaluation>),
    /// The explorer could not be read.
    Failed { reason: String },
}

/// Status to report and the record to persist, if any.
#[derive(Debug, Clone, PartialEq)]
pub struct Reconciliation {
    pub status: AuthoritativeStatus,
    pub persist: Option<PaymentState>,
}

impl Reconciliation {
    fn report(status: AuthoritativeStatus) -> Self {
        Self { status, persist: None }
    }
}

/// Apply the reconciliation rules.
pub fn reconcile(outcome: FetchOutcome, persisted: Option<PaymentState>) -> Reconciliation {
    let prior_unlock = persisted.filter(|state| state.is_unlocked);

    match (outcome, prior_unlock) {
        (FetchOutcome::Failed { reason }, Some(payment)) => {
            Reconciliation::report(AuthoritativeStatus::Unlocked {
                payment,
                source: StatusSource::Cache { reason },
            })
        }
        (FetchOutcome::Failed { reason }, None) => {
            Reconciliation::report(AuthoritativeStatus::Unavailable { reason })
        }
        (FetchOutcome::Evaluated(Some(evaluation)), _) if evaluation.is_unlocked => {
            let payment = PaymentState::unlocked(&evaluation);
            Reconciliation {
                status: AuthoritativeStatus::Unlocked {
                    payment: payment.clone(),
                    source: StatusSource::Fresh,
                },
                persist: Some(payment),
            }
        }
        (FetchOutcome::Evaluated(_), Some(payment)) => {
            Reconciliation::report(AuthoritativeStatus::Unlocked {
                payment,
                source: StatusSource::Persisted,
            })
        }
        (FetchOutcome::Evaluated(None), None) => {
            Reconciliation::report(AuthoritativeStatus::NoTransaction)
        }
        (FetchOutcome::Evaluated(Some(evaluation)), None) => {
            Reconciliation::report(AuthoritativeStatus::Unconfirmed(evaluation))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pending(txid: &str) -> ConfirmationEvaluation {
        ConfirmationEvaluation::new(txid.to_string(), 50_000, 0)
    }

    fn confirmed(txid: &str) -> ConfirmationEvaluation {
        ConfirmationEvaluation::new(txid.to_string(), 50_000, 1)
    }

    fn failed() -> FetchOutcome {
        FetchOutcome::Failed {
            reason: "explorer timeout after 15 seconds".to_string(),
        }
    }

    #[test]
    fn test_failure_with_cached_unlock() {
        let cached = PaymentState::unlocked(&confirmed("cached"));
        let result = reconcile(failed(), Some(cached.clone()));

        assert_eq!(result.persist, None);
        match result.status {
            AuthoritativeStatus::Unlocked { payment, source: StatusSource::Cache { reason } } => {
                assert_eq!(payment, cached);
                assert!(reason.contains("timeout"));
            }
            other => panic!("expected cached unlock, got {:?}", other),
        }
    }

    #[test]
    fn test_failure_without_cache_is_unavailable() {
        let result = reconcile(failed(), None);
        assert!(matches!(result.status, AuthoritativeStatus::Unavailable { .. }));
        assert_eq!(result.persist, None);
    }

    #[test]
    fn test_failure_with_locked_record_is_unavailable() {
        let mut record = PaymentState::unlocked(&confirmed("x"));
        record.is_unlocked = false;
        let result = reconcile(failed(), Some(record));
        assert!(matches!(result.status, AuthoritativeStatus::Unavailable { .. }));
    }

    #[test]
    fn test_fresh_unlock_is_persisted() {
        let result = reconcile(FetchOutcome::Evaluated(Some(confirmed("new"))), None);
        let expected = PaymentState::unlocked(&confirmed("new"));

        assert_eq!(result.persist, Some(expected.clone()));
        assert_eq!(
            result.status,
            AuthoritativeStatus::Unlocked { payment: expected, source: StatusSource::Fresh }
        );
    }

    #[test]
    fn test_fresh_unlock_overwrites_prior() {
        let prior = PaymentState::unlocked(&confirmed("old"));
        let result = reconcile(FetchOutcome::Evaluated(Some(confirmed("new"))), Some(prior));
        assert_eq!(result.persist.unwrap().txid, "new");
    }

    #[test]
    fn test_prior_unlock_outranks_unconfirmed_read() {
        let prior = PaymentState::unlocked(&confirmed("old"));
        let result = reconcile(FetchOutcome::Evaluated(Some(pending("reorged"))), Some(prior.clone()));

        assert_eq!(result.persist, None);
        assert_eq!(
            result.status,
            AuthoritativeStatus::Unlocked { payment: prior, source: StatusSource::Persisted }
        );
    }

    #[test]
    fn test_prior_unlock_outranks_empty_read() {
        let prior = PaymentState::unlocked(&confirmed("old"));
        let result = reconcile(FetchOutcome::Evaluated(None), Some(prior));
        assert!(result.status.is_unlocked());
    }

    #[test]
    fn test_no_transaction() {
        let result = reconcile(FetchOutcome::Evaluated(None), None);
        assert_eq!(result.status, AuthoritativeStatus::NoTransaction);
    }

    #[test]
    fn test_unconfirmed() {
        let result = reconcile(FetchOutcome::Evaluated(Some(pending("p"))), None);
        assert_eq!(result.status, AuthoritativeStatus::Unconfirmed(pending("p")));
        assert_eq!(result.persist, None);
    }

    #[test]
    fn test_unlock_is_monotonic() {
        let mut stored: Option<PaymentState> = None;
        let reads = vec![
            FetchOutcome::Evaluated(Some(pending("t"))),
            FetchOutcome::Evaluated(Some(confirmed("t"))),
            FetchOutcome::Evaluated(Some(pending("t"))),
            failed(),
            FetchOutcome::Evaluated(None),
        ];

        let mut seen_unlock = false;
        for outcome in reads {
            let result = reconcile(outcome, stored.clone());
            if seen_unlock {
                assert!(result.status.is_unlocked());
            }
            seen_unlock |= result.status.is_unlocked();
            if let Some(state) = result.persist {
                stored = Some(state);
            }
        }
        assert!(seen_unlock);
    }
}
