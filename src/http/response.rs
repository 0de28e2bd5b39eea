//! JSON bodies for the status endpoint.
//!
//! Field names are the public contract consumed by the index page and
//! the CLI.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::payments::types::{
    sat_to_btc, AuthoritativeStatus, ConfirmationEvaluation, PaymentState, StatusSource,
    REQUIRED_CONFIRMATIONS,
};

pub const NO_TRANSACTION_MESSAGE: &str = "No incoming transaction detected yet.";

/// Payment details shared by every status that has a transaction.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PaymentFields {
    pub txid: String,
    pub amount_sats: u64,
    pub amount_btc: f64,
    pub confirmations: u64,
    pub required_confirmations: u64,
    pub is_unlocked: bool,
}

impl From<&PaymentState> for PaymentFields {
    fn from(state: &PaymentState) -> Self {
        Self {
            txid: state.txid.clone(),
            amount_sats: state.amount_sats,
            amount_btc: sat_to_btc(state.amount_sats),
            confirmations: state.confirmations,
            required_confirmations: REQUIRED_CONFIRMATIONS,
            is_unlocked: state.is_unlocked,
        }
    }
}

impl From<&ConfirmationEvaluation> for PaymentFields {
    fn from(evaluation: &ConfirmationEvaluation) -> Self {
        Self {
            txid: evaluation.txid.clone(),
            amount_sats: evaluation.amount_sats,
            amount_btc: evaluation.amount_btc(),
            confirmations: evaluation.confirmations,
            required_confirmations: REQUIRED_CONFIRMATIONS,
            is_unlocked: evaluation.is_unlocked,
        }
    }
}

/// Successful status body.
#[derive(Debug, Clone, Serialize)]
pub struct StatusBody {
    pub ok: bool,
    pub has_transaction: bool,
    #[serde(flatten)]
    pub payment: Option<PaymentFields>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub folder_contents: Option<Vec<String>>,
}

/// Failure body.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorBody {
    pub ok: bool,
    pub error: String,
}

/// Shape an authoritative status into an HTTP response.
///
/// `folder_contents` is only included for unlocked statuses.
pub fn status_response(status: &AuthoritativeStatus, folder_contents: Vec<String>) -> Response {
    let body = match status {
        AuthoritativeStatus::Unlocked { payment, source } => StatusBody {
            ok: true,
            has_transaction: true,
            payment: Some(PaymentFields::from(payment)),
            message: match source {
                StatusSource::Cache { reason } => {
                    Some(format!("Cache mode active (explorer unavailable: {})", reason))
                }
                StatusSource::Fresh | StatusSource::Persisted => None,
            },
            folder_contents: Some(folder_contents),
        },
        AuthoritativeStatus::Unconfirmed(evaluation) => StatusBody {
            ok: true,
            has_transaction: true,
            payment: Some(PaymentFields::from(evaluation)),
            message: None,
            folder_contents: Some(Vec::new()),
        },
        AuthoritativeStatus::NoTransaction => StatusBody {
            ok: true,
            has_transaction: false,
            payment: None,
            message: Some(NO_TRANSACTION_MESSAGE.to_string()),
            folder_contents: None,
        },
        AuthoritativeStatus::Unavailable { reason } => {
            let body = ErrorBody {
                ok: false,
                error: format!("Explorer unavailable: {}", reason),
            };
            return (StatusCode::SERVICE_UNAVAILABLE, Json(body)).into_response();
        }
    };

    (StatusCode::OK, Json(body)).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_transaction_body_is_minimal() {
        let body = StatusBody {
            ok: true,
            has_transaction: false,
            payment: None,
            message: Some(NO_TRANSACTION_MESSAGE.to_string()),
            folder_contents: None,
        };
        let json = serde_json::to_value(&body).unwrap();
        let obj = json.as_object().unwrap();
        assert_eq!(obj.len(), 3);
        assert_eq!(json["has_transaction"], false);
    }

    #[test]
    fn test_payment_fields_flattened() {
        let eval = ConfirmationEvaluation::new("abc".into(), 50_000, 0);
        let body = StatusBody {
            ok: true,
            has_transaction: true,
            payment: Some(PaymentFields::from(&eval)),
            message: None,
            folder_contents: Some(Vec::new()),
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["txid"], "abc");
        assert_eq!(json["amount_sats"], 50_000);
        assert_eq!(json["amount_btc"], 0.0005);
        assert_eq!(json["confirmations"], 0);
        assert_eq!(json["required_confirmations"], 1);
        assert_eq!(json["is_unlocked"], false);
        assert!(json.get("message").is_none());
    }

    #[test]
    fn test_unavailable_is_503() {
        let response = status_response(
            &AuthoritativeStatus::Unavailable { reason: "down".into() },
            Vec::new(),
        );
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }
}
