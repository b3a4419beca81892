//! Ingestion service for filedrop.
//!
//! Ties decoding, name resolution and storage together. All methods are
//! blocking; async callers run them on the blocking thread pool.

use crate::config::StorageConfig;
use crate::{FiledropError, Result};

use super::encoding::{decode_payload, decoded_len_estimate, encoded_len};
use super::name::resolve_name;
use super::storage::{FileStorage, StoredFile};

/// Extra request body allowance on top of the encoded payload for the JSON
/// envelope and the name field.
const REQUEST_OVERHEAD: u64 = 64 * 1024;

/// Result of a successful ingest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredArtifact {
    /// Name the artifact is stored and listed under.
    pub resolved_name: String,
    /// Decoded size in bytes.
    pub size_bytes: u64,
}

/// Upload ingestion service.
#[derive(Debug, Clone)]
pub struct IngestService {
    storage: FileStorage,
    max_upload_size: u64,
}

impl IngestService {
    /// Create a new ingestion service.
    ///
    /// `max_upload_size` is the largest accepted decoded payload in bytes.
    pub fn new(storage: FileStorage, max_upload_size: u64) -> Self {
        Self {
            storage,
            max_upload_size,
        }
    }

    /// Build the storage root and service from configuration.
    pub fn from_config(config: &StorageConfig) -> Result<Self> {
        let storage = FileStorage::new(&config.path)?.with_collision_policy(config.collision);
        Ok(Self::new(storage, config.max_upload_size_bytes()))
    }

    /// Get the underlying storage.
    pub fn storage(&self) -> &FileStorage {
        &self.storage
    }

    /// Largest accepted decoded payload in bytes.
    pub fn max_upload_size(&self) -> u64 {
        self.max_upload_size
    }

    /// Largest request body worth reading for an upload of the maximum size.
    pub fn max_request_body(&self) -> usize {
        let limit = encoded_len(self.max_upload_size).saturating_add(REQUEST_OVERHEAD);
        usize::try_from(limit).unwrap_or(usize::MAX)
    }

    /// Decode and persist one upload.
    ///
    /// Checks run in this order: required fields, size limit, base64
    /// validity, name resolution. Nothing is written unless all pass, and the
    /// write itself is atomic.
    pub fn ingest(&self, logical_name: &str, encoded_payload: &str) -> Result<StoredArtifact> {
        if logical_name.trim().is_empty() {
            return Err(FiledropError::Validation("name is required".to_string()));
        }
        if encoded_payload.trim().is_empty() {
            return Err(FiledropError::Validation("file is required".to_string()));
        }

        // The estimate overshoots by at most two bytes of padding.
        let estimate = decoded_len_estimate(encoded_payload);
        if estimate > self.max_upload_size.saturating_add(2) {
            return Err(FiledropError::PayloadTooLarge {
                size: estimate,
                limit: self.max_upload_size,
            });
        }

        let content = decode_payload(encoded_payload)?;
        let size_bytes = content.len() as u64;
        if size_bytes > self.max_upload_size {
            return Err(FiledropError::PayloadTooLarge {
                size: size_bytes,
                limit: self.max_upload_size,
            });
        }

        let resolved = resolve_name(logical_name)?;
        let resolved_name = self.storage.store(&resolved, &content)?;

        tracing::info!(
            logical_name,
            resolved_name = %resolved_name,
            size_bytes,
            "Stored upload"
        );

        Ok(StoredArtifact {
            resolved_name,
            size_bytes,
        })
    }

    /// List stored artifacts.
    pub fn list(&self) -> Result<Vec<StoredFile>> {
        self.storage.list()
    }
}
