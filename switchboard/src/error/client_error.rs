//! Errors surfaced by generated clients.

use thiserror::Error;

use super::ApiError;
use crate::path::PathError;

/// Every failure a generated client method can return.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The route could not be rendered from the supplied values.
    #[error("failed to build request path: {0}")]
    Path(#[from] PathError),

    /// The payload could not be serialized.
    #[error("failed to encode request payload: {0}")]
    Encode(#[source] serde_json::Error),

    /// Network or protocol failure.
    #[cfg(feature = "client")]
    #[error("HTTP request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The server answered with a non-success status.
    #[error("server returned {0}")]
    Api(ApiError),

    /// The success body did not match the expected type.
    #[error("failed to decode response body: {0}")]
    Decode(#[source] serde_json::Error),
}

impl ClientError {
    /// Returns `true` when the server answered 404.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Api(err) if err.is_not_found())
    }

    /// HTTP status of the failed response, when there was one.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Api(err) => Some(err.status),
            #[cfg(feature = "client")]
            Self::Transport(err) => err.status().map(|status| status.as_u16()),
            _ => None,
        }
    }

    /// The structured server error, if the server produced one.
    pub fn api_error(&self) -> Option<&ApiError> {
        match self {
            Self::Api(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ApiError> for ClientError {
    fn from(err: ApiError) -> Self {
        Self::Api(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_detection() {
        let err = ClientError::from(ApiError::not_found("gone"));
        assert!(err.is_not_found());
        assert_eq!(err.status_code(), Some(404));

        let err = ClientError::from(ApiError::internal("boom"));
        assert!(!err.is_not_found());
        assert_eq!(err.api_error().map(|e| e.code.as_str()), Some("internal"));
    }

    #[test]
    fn path_errors_have_no_status() {
        let err = ClientError::from(PathError::MissingValue("id".to_string()));
        assert_eq!(err.status_code(), None);
        assert!(err.to_string().contains("{id}"));
    }
}
