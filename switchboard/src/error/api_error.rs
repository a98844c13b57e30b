//! Structured error returned by dispatchers and decoded by clients.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The JSON error body every generated server responds with on failure.
///
/// Contract implementations return their own error type; the dispatcher
/// converts it with `ApiError::from`, so implement `From<YourError>` for
/// `ApiError` to choose the status code and wire code.
///
/// ## Examples
///
/// ```
/// use switchboard::ApiError;
///
/// let err = ApiError::not_found("post 7 does not exist");
/// assert_eq!(err.status, 404);
/// assert_eq!(err.code, "not_found");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[error("{code} ({status}): {message}")]
pub struct ApiError {
    /// HTTP status code.
    pub status: u16,
    /// Short machine-readable code, e.g. `not_found`.
    pub code: String,
    /// Human-readable description.
    pub message: String,
}

impl ApiError {
    pub fn new(status: u16, code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            status,
            code: code.into(),
            message: message.into(),
        }
    }

    /// 400 with code `bad_request`.
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(400, "bad_request", message)
    }

    /// 404 with code `not_found`.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(404, "not_found", message)
    }

    /// 500 with code `internal`.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(500, "internal", message)
    }

    pub fn is_not_found(&self) -> bool {
        self.status == 404
    }

    pub fn is_server_error(&self) -> bool {
        self.status >= 500
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constructors_set_status_and_code() {
        assert_eq!(ApiError::bad_request("x").status, 400);
        assert_eq!(ApiError::internal("x").code, "internal");
        assert!(ApiError::not_found("x").is_not_found());
        assert!(ApiError::new(503, "unavailable", "down").is_server_error());
    }

    #[test]
    fn display_includes_code_and_status() {
        let err = ApiError::new(409, "conflict", "slug already taken");
        assert_eq!(err.to_string(), "conflict (409): slug already taken");
    }

    #[test]
    fn wire_shape_is_flat_json() {
        let json = serde_json::to_value(ApiError::not_found("missing")).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"status": 404, "code": "not_found", "message": "missing"})
        );
    }
}
