//! File ingestion module for filedrop.
//!
//! This module provides the upload pipeline:
//! - Base64 payload decoding
//! - Storage-safe name resolution
//! - Atomic file storage with a configurable collision policy
//! - Listing of stored files

mod encoding;
mod name;
mod service;
mod storage;

pub use encoding::{decode_payload, decoded_len_estimate, encoded_len};
pub use name::{candidate_name, ensure_resolved, resolve_name};
pub use service::{IngestService, StoredArtifact};
pub use storage::{CollisionPolicy, FileStorage, StoredFile};

/// Maximum length for a stored filename (in bytes).
pub const MAX_FILENAME_LENGTH: usize = 255;

/// How many `name-N` candidates are tried before giving up.
pub const MAX_COLLISION_ATTEMPTS: u32 = 1000;

/// Prefix of in-flight temporary files inside the storage root.
///
/// Resolved names never start with a dot, so these cannot clash.
pub const TEMP_PREFIX: &str = ".upload-";

/// Suffix of in-flight temporary files.
pub const TEMP_SUFFIX: &str = ".part";
