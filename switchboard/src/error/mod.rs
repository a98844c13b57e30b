//! Error types for generated clients and servers.
//!
//! - [`ApiError`] - the structured error body servers respond with
//! - [`ClientError`] - everything a generated client call can fail with

mod api_error;
mod client_error;

pub use api_error::ApiError;
pub use client_error::ClientError;
