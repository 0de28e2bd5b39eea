//! Explorer HTTP client with timeout and failover.
//!
//! # Responsibilities
//! - Query the transaction list of the watched address
//! - Query the chain tip height
//! - Bound every call by the configured timeout
//! - Fall back to secondary explorers when the primary fails

use std::time::{Duration, Instant};
use tokio::time::timeout;

use crate::explorer::types::{
    decode_tip_height, decode_transactions, ExplorerConfig, ExplorerError, ExplorerResult,
    Transaction,
};
use crate::observability::metrics;

/// Esplora API client wrapper with failover support.
#[derive(Clone)]
pub struct ExplorerClient {
    /// Base URLs (primary + failovers), without trailing slash.
    endpoints: Vec<String>,
    /// Shared HTTP client.
    http: reqwest::Client,
    /// Configuration.
    config: ExplorerConfig,
    /// Request timeout duration.
    timeout_duration: Duration,
}

impl ExplorerClient {
    /// Create a new explorer client.
    ///
    /// Fails only on an unusable primary URL; invalid failover URLs are
    /// skipped with a warning.
    pub fn new(config: ExplorerConfig) -> ExplorerResult<Self> {
        let timeout_duration = Duration::from_secs(config.timeout_secs);
        let mut endpoints = Vec::new();

        // 1. Add primary endpoint
        let primary = normalize_base(&config.base_url)
            .ok_or_else(|| ExplorerError::InvalidUrl(config.base_url.clone()))?;
        endpoints.push(primary);

        // 2. Add failover endpoints
        for url_str in &config.failover_urls {
            match normalize_base(url_str) {
                Some(url) => endpoints.push(url),
                None => tracing::warn!(url = %url_str, "Ignoring invalid failover explorer URL"),
            }
        }

        let mut builder = reqwest::Client::builder()
            .timeout(timeout_duration)
            .user_agent(concat!("payment-gate/", env!("CARGO_PKG_VERSION")));
        if !config.use_system_proxy {
            builder = builder.no_proxy();
        }
        let http = builder
            .build()
            .map_err(|e| ExplorerError::Transport(e.to_string()))?;

        tracing::info!(
            base_url = %endpoints[0],
            failovers = endpoints.len() - 1,
            timeout_secs = config.timeout_secs,
            "Explorer client initialized"
        );

        Ok(Self {
            endpoints,
            http,
            config,
            timeout_duration,
        })
    }

    /// Fetch the transactions involving `address`, in explorer order.
    pub async fn address_transactions(&self, address: &str) -> ExplorerResult<Vec<Transaction>> {
        let path = format!("/address/{}/txs", address);
        let body = self.get_with_failover("address_txs", &path).await?;
        decode_transactions(&body)
    }

    /// Fetch the current chain tip height.
    pub async fn tip_height(&self) -> ExplorerResult<u64> {
        let body = self.get_with_failover("tip_height", "/blocks/tip/height").await?;
        let text = String::from_utf8_lossy(&body);
        decode_tip_height(&text)
    }

    /// GET `path` from each endpoint in turn until one succeeds.
    async fn get_with_failover(&self, endpoint: &'static str, path: &str) -> ExplorerResult<Vec<u8>> {
        let mut last_error = ExplorerError::Transport("no explorer endpoints configured".to_string());

        for (i, base) in self.endpoints.iter().enumerate() {
            let url = format!("{}{}", base, path);
            let start = Instant::now();
            let result = match timeout(self.timeout_duration, self.get_bytes(&url)).await {
                Ok(result) => result,
                Err(_) => Err(ExplorerError::Timeout(self.config.timeout_secs)),
            };
            metrics::record_explorer_request(endpoint, result.is_ok(), start);

            match result {
                Ok(body) => return Ok(body),
                Err(e) => {
                    tracing::warn!(provider_idx = i, url = %url, error = %e, "Explorer request failed");
                    last_error = e;
                }
            }
        }

        Err(last_error)
    }

    async fn get_bytes(&self, url: &str) -> ExplorerResult<Vec<u8>> {
        let response = self.http.get(url).send().await.map_err(|e| self.map_reqwest(e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ExplorerError::Status(status.as_u16()));
        }

        let body = response.bytes().await.map_err(|e| self.map_reqwest(e))?;
        Ok(body.to_vec())
    }

    fn map_reqwest(&self, err: reqwest::Error) -> ExplorerError {
        if err.is_timeout() {
            ExplorerError::Timeout(self.config.timeout_secs)
        } else {
            ExplorerError::Transport(err.to_string())
        }
    }

    /// Base URLs in the order they are tried.
    pub fn endpoints(&self) -> &[String] {
        &self.endpoints
    }
}

impl std::fmt::Debug for ExplorerClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExplorerClient")
            .field("endpoints", &self.endpoints)
            .field("timeout_secs", &self.config.timeout_secs)
            .finish()
    }
}

/// Validate an http(s) base URL and strip any trailing slash.
fn normalize_base(raw: &str) -> Option<String> {
    let parsed = url::Url::parse(raw).ok()?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return None;
    }
    Some(raw.trim_end_matches('/').to_string())
}
