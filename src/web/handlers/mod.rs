//! API handlers for the HTTP surface.

use std::sync::Arc;

use crate::file::IngestService;

pub mod file;

pub use file::*;

/// Shared application state.
pub struct AppState {
    /// Upload ingestion service, shared with blocking tasks.
    pub ingest: Arc<IngestService>,
}

impl AppState {
    /// Create a new application state.
    pub fn new(ingest: IngestService) -> Self {
        Self {
            ingest: Arc::new(ingest),
        }
    }
}
