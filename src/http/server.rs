//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with all handlers
//! - Wire up middleware (tracing, timeout, request ID)
//! - Serve the index page and static assets
//! - Bind server to listener with graceful shutdown

use axum::{body::Body, http::Request, routing::get, Router};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{services::ServeDir, timeout::TimeoutLayer, trace::TraceLayer};

use crate::bundle::Bundle;
use crate::config::GateConfig;
use crate::explorer::{ExplorerClient, ExplorerResult};
use crate::http::handlers;
use crate::http::request::{propagate_request_id_layer, request_id_of, set_request_id_layer};
use crate::payments::{JsonFileStore, PaymentStateStore, PaymentVerifier};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub verifier: Arc<PaymentVerifier>,
    pub bundle: Bundle,
}

/// HTTP server for the payment gate.
pub struct HttpServer {
    router: Router,
    verifier: Arc<PaymentVerifier>,
}

impl HttpServer {
    /// Create a server persisting state to `storage.state_path`.
    pub fn new(config: GateConfig) -> ExplorerResult<Self> {
        let store = Arc::new(JsonFileStore::new(&config.storage.state_path));
        Self::with_store(config, store)
    }

    /// Create a server with an explicit state store.
    pub fn with_store(config: GateConfig, store: Arc<dyn PaymentStateStore>) -> ExplorerResult<Self> {
        let client = ExplorerClient::new(config.explorer.clone())?;
        let verifier = Arc::new(PaymentVerifier::from_config(client, store, &config));

        let state = AppState {
            verifier: verifier.clone(),
            bundle: Bundle::new(&config.bundle.directory),
        };

        let router = Self::build_router(&config, state);
        Ok(Self { router, verifier })
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &GateConfig, state: AppState) -> Router {
        Router::new()
            .route("/", get(handlers::index))
            .route("/api/payment-status", get(handlers::payment_status))
            .route("/download/bundle", get(handlers::download_bundle))
            .route("/health", get(handlers::health))
            .nest_service("/static", ServeDir::new(&config.bundle.static_dir))
            .with_state(state)
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(
                TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
                    tracing::info_span!(
                        "request",
                        method = %request.method(),
                        path = %request.uri().path(),
                        request_id = %request_id_of(request),
                    )
                }),
            )
            .layer(propagate_request_id_layer())
            .layer(set_request_id_layer())
    }

    /// Run the server until `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            watched_address = %self.verifier.address(),
            "HTTP server starting"
        );

        axum::serve(listener, self.router.into_make_service())
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// The router, for in-process testing.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Shared verifier, for the background monitor.
    pub fn verifier(&self) -> Arc<PaymentVerifier> {
        self.verifier.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::request::X_REQUEST_ID;
    use crate::payments::{ConfirmationEvaluation, MemoryStore, PaymentState};
    use axum::http::StatusCode;
    use tower::ServiceExt;

    /// Config whose explorer points at a port nothing listens on.
    fn offline_config() -> GateConfig {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let mut config = GateConfig::default();
        config.explorer.base_url = format!("http://{}", addr);
        config.explorer.timeout_secs = 2;
        config.explorer.use_system_proxy = false;
        config.bundle.directory = "/nonexistent/bundle".to_string();
        config.bundle.static_dir = "/nonexistent/static".to_string();
        config
    }

    async fn get(router: Router, uri: &str) -> (StatusCode, axum::http::HeaderMap, Vec<u8>) {
        let response = router
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, headers, body.to_vec())
    }

    #[tokio::test]
    async fn test_health_has_request_id() {
        let server = HttpServer::with_store(offline_config(), Arc::new(MemoryStore::new())).unwrap();
        let (status, headers, body) = get(server.router(), "/health").await;
        assert_eq!(status, StatusCode::OK);
        assert!(headers.contains_key(X_REQUEST_ID));
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["status"], "operational");
    }

    #[tokio::test]
    async fn test_index_shows_address() {
        let config = offline_config();
        let address = config.payment.address.clone();
        let server = HttpServer::with_store(config, Arc::new(MemoryStore::new())).unwrap();
        let (status, _, body) = get(server.router(), "/").await;
        assert_eq!(status, StatusCode::OK);
        assert!(String::from_utf8(body).unwrap().contains(&address));
    }

    #[tokio::test]
    async fn test_unknown_routes_404() {
        let server = HttpServer::with_store(offline_config(), Arc::new(MemoryStore::new())).unwrap();
        let (status, _, _) = get(server.router(), "/static/missing.css").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        let (status, _, _) = get(server.router(), "/nope").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_offline_without_cache_is_unavailable() {
        let server = HttpServer::with_store(offline_config(), Arc::new(MemoryStore::new())).unwrap();

        let (status, _, body) = get(server.router(), "/api/payment-status").await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["ok"], false);
        assert!(json["error"].as_str().unwrap().starts_with("Explorer unavailable"));

        let (status, _, _) = get(server.router(), "/download/bundle").await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_offline_with_cache_stays_unlocked() {
        let cached = PaymentState::unlocked(&ConfirmationEvaluation::new("cached".into(), 50_000, 3));
        let store = Arc::new(MemoryStore::with_state(cached));
        let server = HttpServer::with_store(offline_config(), store).unwrap();

        let (status, _, body) = get(server.router(), "/api/payment-status").await;
        assert_eq!(status, StatusCode::OK);
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["is_unlocked"], true);
        assert_eq!(json["txid"], "cached");
        assert!(json["message"].as_str().unwrap().starts_with("Cache mode active"));

        // Permitted, but the bundle directory does not exist.
        let (status, _, _) = get(server.router(), "/download/bundle").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
