//! Access decision for the gated bundle.

use crate::payments::types::{AuthoritativeStatus, REQUIRED_CONFIRMATIONS};

/// Whether the archive download and file preview are allowed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateDecision {
    Permit,
    Deny,
}

impl GateDecision {
    /// Permit only an unlocked status, fresh or cached, with enough confirmations.
    pub fn from_status(status: &AuthoritativeStatus) -> Self {
        match status {
            AuthoritativeStatus::Unlocked { payment, .. }
                if payment.confirmations >= REQUIRED_CONFIRMATIONS =>
            {
                GateDecision::Permit
            }
            _ => GateDecision::Deny,
        }
    }

    pub fn is_permitted(self) -> bool {
        self == GateDecision::Permit
    }
}
