//! Route handlers.

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::bundle::BundleError;
use crate::http::page::render_index;
use crate::http::response::status_response;
use crate::http::server::AppState;
use crate::observability::metrics;
use crate::payments::GateDecision;

pub const LOCKED_MESSAGE: &str = "Download locked: one confirmation is required.";

#[derive(Serialize)]
pub struct SystemStatus {
    pub version: &'static str,
    pub status: &'static str,
}

pub async fn health() -> Json<SystemStatus> {
    Json(SystemStatus {
        version: env!("CARGO_PKG_VERSION"),
        status: "operational",
    })
}

pub async fn index(State(state): State<AppState>) -> Html<String> {
    Html(render_index(state.verifier.address(), &state.bundle.dir_name()))
}

/// Verify the payment and report it; lists the bundle when unlocked.
pub async fn payment_status(State(state): State<AppState>) -> Response {
    let status = state.verifier.check().await;

    let folder_contents = if GateDecision::from_status(&status).is_permitted() {
        let bundle = state.bundle.clone();
        match tokio::task::spawn_blocking(move || bundle.list_contents()).await {
            Ok(files) => files,
            Err(e) => {
                tracing::error!(error = %e, "Bundle listing task failed");
                Vec::new()
            }
        }
    } else {
        Vec::new()
    };

    status_response(&status, folder_contents)
}

/// Verify the payment and stream the bundle archive if permitted.
pub async fn download_bundle(State(state): State<AppState>) -> Response {
    let status = state.verifier.check().await;

    if !GateDecision::from_status(&status).is_permitted() {
        tracing::info!(status = status.label(), "Download denied");
        metrics::record_download("locked");
        return (StatusCode::FORBIDDEN, LOCKED_MESSAGE).into_response();
    }

    let bundle = state.bundle.clone();
    let archive_name = bundle.archive_name();
    let result = tokio::task::spawn_blocking(move || bundle.build_archive()).await;

    match result {
        Ok(Ok(bytes)) => {
            metrics::record_download("ok");
            tracing::info!(bytes = bytes.len(), archive = %archive_name, "Serving bundle archive");
            (
                StatusCode::OK,
                [
                    (header::CONTENT_TYPE, "application/gzip".to_string()),
                    (
                        header::CONTENT_DISPOSITION,
                        format!("attachment; filename=\"{}\"", archive_name),
                    ),
                ],
                bytes,
            )
                .into_response()
        }
        Ok(Err(BundleError::Missing(path))) => {
            metrics::record_download("missing");
            tracing::error!(path = %path.display(), "Bundle directory not found");
            (StatusCode::NOT_FOUND, "Bundle directory not found.").into_response()
        }
        Ok(Err(e)) => {
            metrics::record_download("error");
            tracing::error!(error = %e, "Failed to build bundle archive");
            (StatusCode::INTERNAL_SERVER_ERROR, "Failed to build archive.").into_response()
        }
        Err(e) => {
            metrics::record_download("error");
            tracing::error!(error = %e, "Archive task failed");
            (StatusCode::INTERNAL_SERVER_ERROR, "Failed to build archive.").into_response()
        }
    }
}
