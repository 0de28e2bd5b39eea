//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the gate.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the payment gate.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct GateConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Blockchain explorer settings.
    pub explorer: ExplorerConfig,

    /// Watched address and background monitor.
    pub payment: PaymentConfig,

    /// Persisted payment state.
    pub storage: StorageConfig,

    /// Gated directory and static assets.
    pub bundle: BundleConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8000").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8000".to_string(),
        }
    }
}

/// Esplora-compatible explorer configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ExplorerConfig {
    /// Primary API base URL, without trailing slash.
    pub base_url: String,

    /// Failover API base URLs, tried in order after the primary.
    pub failover_urls: Vec<String>,

    /// Per-request timeout in seconds.
    pub timeout_secs: u64,

    /// Budget in seconds for one whole verification read, across every
    /// endpoint and both calls. Must stay below `timeouts.request_secs`.
    pub deadline_secs: u64,

    /// Honour HTTP(S)_PROXY environment variables.
    pub use_system_proxy: bool,
}

impl Default for ExplorerConfig {
    fn default() -> Self {
        Self {
            base_url: "https://blockstream.info/api".to_string(),
            failover_urls: Vec::new(),
            timeout_secs: 15,
            deadline_secs: 30,
            use_system_proxy: true,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PaymentConfig {
    /// The single address watched for an incoming payment.
    pub address: String,

    /// Run the background monitor.
    pub monitor_enabled: bool,

    /// Polling interval in milliseconds.
    pub monitor_interval_ms: u64,
}

impl Default for PaymentConfig {
    fn default() -> Self {
        Self {
            address: "19Tf5K7eZY6umSpaCktKfaf5ZTWv7qQvw6".to_string(),
            monitor_enabled: false,
            monitor_interval_ms: 15_000,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Path of the JSON file holding the last unlocked payment.
    pub state_path: String,

    /// Limit on a single state file read or write, in milliseconds.
    pub io_timeout_ms: u64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            state_path: "payment_state.json".to_string(),
            io_timeout_ms: 5_000,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct BundleConfig {
    /// Directory served as an archive once the payment is confirmed.
    pub directory: String,

    /// Directory served under `/static`.
    pub static_dir: String,
}

impl Default for BundleConfig {
    fn default() -> Self {
        Self {
            directory: "wallet_folder".to_string(),
            static_dir: "static".to_string(),
        }
    }
}

/// Timeout configuration for inbound requests.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 45 }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Log output format: "pretty" or "json".
    pub log_format: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: "pretty".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = GateConfig::default();
        assert_eq!(config.listener.bind_address, "0.0.0.0:8000");
        assert_eq!(config.explorer.timeout_secs, 15);
        assert!(!config.payment.monitor_enabled);
        assert_eq!(config.storage.state_path, "payment_state.json");
        assert!(config.explorer.deadline_secs < config.timeouts.request_secs);
    }

    #[test]
    fn test_partial_toml() {
        let config: GateConfig = toml::from_str(
            r#"
            [payment]
            address = "bc1qexample"

            [explorer]
            failover_urls = ["https://mempool.space/api"]
            "#,
        )
        .unwrap();

        assert_eq!(config.payment.address, "bc1qexample");
        assert_eq!(config.payment.monitor_interval_ms, 15_000);
        assert_eq!(config.explorer.base_url, "https://blockstream.info/api");
        assert_eq!(config.explorer.failover_urls.len(), 1);
        assert_eq!(config.bundle.directory, "wallet_folder");
    }
}
