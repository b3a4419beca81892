//! OpenAPI document for the HTTP API.

use axum::Json;
use utoipa::OpenApi;

use super::dto::{FileEntry, FilesResponse, TestResponse, UploadRequest, UploadResponse};
use super::error::{ErrorBody, ErrorCode};
use super::handlers;

/// OpenAPI description of every route.
#[derive(OpenApi)]
#[openapi(
    info(title = "filedrop", description = "Base64 file upload service"),
    paths(
        handlers::file::test_connection,
        handlers::file::upload_file,
        handlers::file::list_files
    ),
    components(schemas(
        UploadRequest,
        UploadResponse,
        TestResponse,
        FilesResponse,
        FileEntry,
        ErrorBody,
        ErrorCode
    )),
    tags(
        (name = "status", description = "Liveness"),
        (name = "files", description = "Upload and listing")
    )
)]
pub struct ApiDoc;

/// GET /api-docs/openapi.json
pub async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
