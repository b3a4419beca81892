//! Response DTOs for the HTTP API.

use serde::Serialize;
use utoipa::ToSchema;

use crate::datetime::to_rfc3339;
use crate::file::StoredFile;

/// Response of `GET /test`.
#[derive(Debug, Serialize, ToSchema)]
pub struct TestResponse {
    /// Fixed status message.
    pub message: String,
    /// Server time (RFC3339).
    pub timestamp: String,
}

/// Response of a successful `POST /upload`.
#[derive(Debug, Serialize, ToSchema)]
pub struct UploadResponse {
    /// Human-readable status message.
    pub message: String,
    /// Name the file was stored under.
    pub filename: String,
    /// Decoded size in bytes.
    pub size: u64,
}

/// A stored file in a listing.
#[derive(Debug, Serialize, ToSchema)]
pub struct FileEntry {
    /// Stored file name.
    pub name: String,
    /// Size in bytes.
    pub size: u64,
    /// Last modification time (RFC3339).
    pub modified: String,
}

impl From<StoredFile> for FileEntry {
    fn from(file: StoredFile) -> Self {
        Self {
            name: file.name,
            size: file.size,
            modified: to_rfc3339(file.modified),
        }
    }
}

/// Response of `GET /files`.
#[derive(Debug, Serialize, ToSchema)]
pub struct FilesResponse {
    /// Stored files, sorted by name.
    pub files: Vec<FileEntry>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, SystemTime};

    #[test]
    fn test_file_entry_from_stored_file() {
        let stored = StoredFile {
            name: "photo_1.jpg".to_string(),
            size: 5,
            modified: SystemTime::UNIX_EPOCH + Duration::from_secs(86_400),
        };

        let entry = FileEntry::from(stored);

        assert_eq!(entry.name, "photo_1.jpg");
        assert_eq!(entry.size, 5);
        assert_eq!(entry.modified, "1970-01-02T00:00:00.000Z");
    }

    #[test]
    fn test_files_response_shape() {
        let response = FilesResponse {
            files: vec![FileEntry {
                name: "a.txt".to_string(),
                size: 1,
                modified: "2024-01-01T00:00:00.000Z".to_string(),
            }],
        };

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["files"][0]["name"], "a.txt");
        assert_eq!(json["files"][0]["size"], 1);
        assert_eq!(json["files"][0]["modified"], "2024-01-01T00:00:00.000Z");
    }
}
