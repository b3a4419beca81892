//! Request DTOs for the HTTP API.

use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

/// Upload request.
///
/// Both fields are optional at the JSON level so a missing field is reported
/// as a validation error rather than a parse error.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UploadRequest {
    /// Logical file name, e.g. `photo_1718000000000.jpg`.
    #[validate(
        required(message = "Name and file are required!"),
        length(min = 1, message = "Name and file are required!")
    )]
    pub name: Option<String>,
    /// File content, base64 encoded.
    #[validate(
        required(message = "Name and file are required!"),
        length(min = 1, message = "Name and file are required!")
    )]
    pub file: Option<String>,
}
