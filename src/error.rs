//! Error types for filedrop.

use thiserror::Error;

/// Common error type for filedrop.
#[derive(Error, Debug)]
pub enum FiledropError {
    /// The request was missing a required field or carried an unusable value.
    #[error("validation error: {0}")]
    Validation(String),

    /// The payload is not valid for its text encoding.
    #[error("decode error: {0}")]
    Decode(String),

    /// The decoded payload would exceed the configured maximum.
    #[error("payload too large: {size} bytes exceeds the limit of {limit} bytes")]
    PayloadTooLarge {
        /// Estimated decoded size in bytes.
        size: u64,
        /// Configured limit in bytes.
        limit: u64,
    },

    /// An artifact with the same name and different content already exists.
    #[error("conflict: {0}")]
    Conflict(String),

    /// Resource not found.
    #[error("{0} not found")]
    NotFound(String),

    /// Failure of the underlying storage medium.
    ///
    /// Write, rename and directory read errors all end up here.
    #[error("storage error: {0}")]
    Storage(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Result type alias for filedrop operations.
pub type Result<T> = std::result::Result<T, FiledropError>;
