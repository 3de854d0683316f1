//! HTTP surface: a single-page UI plus a small JSON API.
//!
//! The server owns no mutable state — [`AppState`] holds the immutable
//! [`GradingConfig`] and nothing else, so concurrent requests need no
//! coordination. Every route delegates to the library pipeline and maps
//! [`GradeError`] classes onto HTTP statuses here.

pub mod handlers;

use crate::config::GradingConfig;
use crate::error::{ErrorKind, GradeError};
use axum::extract::DefaultBodyLimit;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// Uploads beyond this total size are rejected by axum before parsing.
/// Phone photos run 3–8 MB each; 32 MB covers a realistic multi-page sheet.
const MAX_UPLOAD_BYTES: usize = 32 * 1024 * 1024;

/// Shared, immutable application state.
pub struct AppState {
    pub config: GradingConfig,
}

/// Build the application router.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/healthz", get(handlers::healthz))
        .route("/api/corrections", post(handlers::submit_correction))
        .route("/api/exports/markdown", post(handlers::export_markdown))
        .route("/api/exports/pdf", post(handlers::export_pdf))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serve the application on an already-bound listener until it terminates.
pub async fn serve(
    listener: tokio::net::TcpListener,
    config: GradingConfig,
) -> std::io::Result<()> {
    let state = Arc::new(AppState { config });
    axum::serve(listener, router(state)).await
}

impl IntoResponse for GradeError {
    fn into_response(self) -> Response {
        let status = match &self {
            GradeError::UpstreamTimeout { .. } => StatusCode::GATEWAY_TIMEOUT,
            other => match other.kind() {
                ErrorKind::Input => StatusCode::BAD_REQUEST,
                ErrorKind::Upstream => StatusCode::BAD_GATEWAY,
                ErrorKind::Export | ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
            },
        };
        (status, Json(serde_json::json!({ "error": self.to_string() }))).into_response()
    }
}
