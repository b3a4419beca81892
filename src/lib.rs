//! filedrop - base64 file upload service
//!
//! Receives named, base64 encoded payloads over JSON/HTTP, stores them
//! atomically under a storage root and lists what has been stored.

pub mod config;
pub mod datetime;
pub mod error;
pub mod file;
pub mod logging;
pub mod web;

pub use config::Config;
pub use error::{FiledropError, Result};
pub use file::{CollisionPolicy, FileStorage, IngestService, StoredArtifact, StoredFile};
pub use web::WebServer;
