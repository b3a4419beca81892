//! Validation utilities for HTTP API DTOs.

use axum::{
    async_trait,
    extract::{rejection::JsonRejection, FromRequest, Request},
    http::StatusCode,
    Json,
};
use serde::de::DeserializeOwned;
use validator::Validate;

use crate::web::error::ApiError;

/// A JSON extractor that validates the request body.
///
/// This extractor deserializes the request body as JSON and then validates it
/// using the `validator` crate. Bodies over the configured limit are reported
/// as `413`, other JSON problems as `400`, and validation failures as a
/// `VALIDATION_ERROR` with field-level details.
///
/// # Example
///
/// ```ignore
/// use filedrop::web::dto::ValidatedJson;
///
/// async fn upload(
///     ValidatedJson(payload): ValidatedJson<UploadRequest>,
/// ) -> Result<Json<UploadResponse>, ApiError> {
///     // payload is already validated
///     // ...
/// }
/// ```
pub struct ValidatedJson<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validate,
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| {
                if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
                    tracing::warn!("Request body over the size limit");
                    ApiError::payload_too_large("Upload failed!")
                        .with_cause(rejection.body_text())
                } else {
                    ApiError::bad_request(format!("Invalid JSON: {}", rejection.body_text()))
                }
            })?;

        value.validate().map_err(ApiError::from_validation_errors)?;

        Ok(ValidatedJson(value))
    }
}
