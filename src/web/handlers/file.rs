//! File handlers for the HTTP API.

use axum::{extract::State, Json};
use std::sync::Arc;

use crate::datetime::now_rfc3339;
use crate::web::dto::{
    FileEntry, FilesResponse, TestResponse, UploadRequest, UploadResponse, ValidatedJson,
};
use crate::web::error::{ApiError, ErrorBody};
use crate::web::handlers::AppState;

/// GET /test - Check that the server is up.
#[utoipa::path(
    get,
    path = "/test",
    tag = "status",
    responses(
        (status = 200, description = "Server is running", body = TestResponse)
    )
)]
pub async fn test_connection() -> Json<TestResponse> {
    Json(TestResponse {
        message: "Server is running!".to_string(),
        timestamp: now_rfc3339(),
    })
}

/// POST /upload - Store a base64 encoded file.
///
/// Decoding and the disk write run on the blocking pool. If the client goes
/// away mid-request the write still finishes or aborts atomically.
#[utoipa::path(
    post,
    path = "/upload",
    tag = "files",
    request_body = UploadRequest,
    responses(
        (status = 200, description = "File stored", body = UploadResponse),
        (status = 400, description = "Missing fields, invalid base64 or unusable name", body = ErrorBody),
        (status = 409, description = "Name taken by different content (reject policy)", body = ErrorBody),
        (status = 413, description = "Payload over the size limit", body = ErrorBody),
        (status = 500, description = "Storage failure", body = ErrorBody)
    )
)]
pub async fn upload_file(
    State(state): State<Arc<AppState>>,
    ValidatedJson(request): ValidatedJson<UploadRequest>,
) -> Result<Json<UploadResponse>, ApiError> {
    let name = request.name.unwrap_or_default();
    let file = request.file.unwrap_or_default();

    tracing::info!(name = %name, encoded_len = file.len(), "Upload request received");

    let ingest = Arc::clone(&state.ingest);
    let artifact = tokio::task::spawn_blocking(move || ingest.ingest(&name, &file))
        .await
        .map_err(|e| {
            tracing::error!("Upload task failed: {}", e);
            ApiError::internal("Upload failed!").with_cause(e.to_string())
        })?
        .map_err(|e| ApiError::from_failure("Upload failed!", e))?;

    Ok(Json(UploadResponse {
        message: "File uploaded successfully!".to_string(),
        filename: artifact.resolved_name,
        size: artifact.size_bytes,
    }))
}

/// GET /files - List stored files.
#[utoipa::path(
    get,
    path = "/files",
    tag = "files",
    responses(
        (status = 200, description = "Stored files", body = FilesResponse),
        (status = 500, description = "Storage root unreadable", body = ErrorBody)
    )
)]
pub async fn list_files(
    State(state): State<Arc<AppState>>,
) -> Result<Json<FilesResponse>, ApiError> {
    let ingest = Arc::clone(&state.ingest);
    let files = tokio::task::spawn_blocking(move || ingest.list())
        .await
        .map_err(|e| {
            tracing::error!("List task failed: {}", e);
            ApiError::internal("Failed to list files").with_cause(e.to_string())
        })?
        .map_err(|e| ApiError::from_failure("Failed to list files", e))?;

    tracing::debug!(count = files.len(), "Listed files");

    Ok(Json(FilesResponse {
        files: files.into_iter().map(FileEntry::from).collect(),
    }))
}
