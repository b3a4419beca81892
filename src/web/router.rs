//! Router configuration for the HTTP API.

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use super::handlers::{list_files, test_connection, upload_file, AppState};
use super::openapi::openapi_json;

/// Create the main API router.
///
/// The request body limit follows the configured upload size so oversized
/// bodies are refused before they are buffered.
pub fn create_router(app_state: Arc<AppState>) -> Router {
    let body_limit = app_state.ingest.max_request_body();

    Router::new()
        .route("/test", get(test_connection))
        .route("/upload", post(upload_file))
        .route("/files", get(list_files))
        .route("/api-docs/openapi.json", get(openapi_json))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(DefaultBodyLimit::max(body_limit)),
        )
        .with_state(app_state)
}
