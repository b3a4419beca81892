//! HTTP API module for filedrop.
//!
//! JSON-over-HTTP surface for uploading base64 encoded files and listing
//! what has been stored.

pub mod dto;
pub mod error;
pub mod handlers;
pub mod openapi;
pub mod router;
pub mod server;

pub use error::ApiError;
pub use router::create_router;
pub use server::WebServer;
