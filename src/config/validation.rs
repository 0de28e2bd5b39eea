//! Configuration validation.
//!
//! Serde handles syntax; this module checks values. Every problem is
//! reported, not just the first.

use std::net::SocketAddr;
use thiserror::Error;

use crate::config::schema::GateConfig;

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("payment.address must not be empty")]
    EmptyAddress,

    #[error("invalid explorer URL '{0}'")]
    InvalidExplorerUrl(String),

    #[error("{0} must be greater than zero")]
    ZeroValue(&'static str),

    #[error("invalid socket address for {field}: '{value}'")]
    InvalidSocketAddr { field: &'static str, value: String },

    #[error("unknown log format '{0}' (expected \"pretty\" or \"json\")")]
    UnknownLogFormat(String),

    #[error(
        "timeouts.request_secs ({request_ms} ms) must exceed explorer.deadline_secs \
         plus one state read and one state write ({verification_ms} ms)"
    )]
    RequestTimeoutTooShort { request_ms: u64, verification_ms: u64 },
}

/// Worst-case time of one verification cycle, in milliseconds.
///
/// The explorer deadline covers every endpoint and both calls; the state
/// file is read once and written at most once.
pub fn verification_budget_ms(config: &GateConfig) -> u64 {
    config
        .explorer
        .deadline_secs
        .saturating_mul(1_000)
        .saturating_add(config.storage.io_timeout_ms.saturating_mul(2))
}

/// Validate a parsed configuration.
pub fn validate_config(config: &GateConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.payment.address.trim().is_empty() {
        errors.push(ValidationError::EmptyAddress);
    }

    let explorer_urls = std::iter::once(&config.explorer.base_url)
        .chain(config.explorer.failover_urls.iter());
    for raw in explorer_urls {
        match url::Url::parse(raw) {
            Ok(parsed) if matches!(parsed.scheme(), "http" | "https") => {}
            _ => errors.push(ValidationError::InvalidExplorerUrl(raw.clone())),
        }
    }

    if config.explorer.timeout_secs == 0 {
        errors.push(ValidationError::ZeroValue("explorer.timeout_secs"));
    }
    if config.explorer.deadline_secs == 0 {
        errors.push(ValidationError::ZeroValue("explorer.deadline_secs"));
    }
    if config.storage.io_timeout_ms == 0 {
        errors.push(ValidationError::ZeroValue("storage.io_timeout_ms"));
    }
    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::ZeroValue("timeouts.request_secs"));
    }

    // A request cut off by the timeout layer never reaches the cached unlock.
    let request_ms = config.timeouts.request_secs.saturating_mul(1_000);
    let verification_ms = verification_budget_ms(config);
    if request_ms <= verification_ms {
        errors.push(ValidationError::RequestTimeoutTooShort {
            request_ms,
            verification_ms,
        });
    }
    if config.payment.monitor_enabled && config.payment.monitor_interval_ms == 0 {
        errors.push(ValidationError::ZeroValue("payment.monitor_interval_ms"));
    }

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidSocketAddr {
            field: "listener.bind_address",
            value: config.listener.bind_address.clone(),
        });
    }
    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::InvalidSocketAddr {
            field: "observability.metrics_address",
            value: config.observability.metrics_address.clone(),
        });
    }

    if !matches!(config.observability.log_format.as_str(), "pretty" | "json") {
        errors.push(ValidationError::UnknownLogFormat(
            config.observability.log_format.clone(),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
