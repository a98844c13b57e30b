//! Response helpers used as the tail expression of generated handlers.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use crate::ApiError;

/// `200 OK` with a JSON body.
pub fn json<T>(value: T) -> Result<Response, ApiError>
where
    T: Serialize,
{
    Ok(Json(value).into_response())
}

/// `200 OK` with a JSON body for `Some`, `404 not_found` for `None`.
pub fn optional<T>(value: Option<T>) -> Result<Response, ApiError>
where
    T: Serialize,
{
    match value {
        Some(value) => json(value),
        None => Err(ApiError::not_found("resource not found")),
    }
}

/// `204 No Content`.
pub fn no_content() -> Result<Response, ApiError> {
    Ok(StatusCode::NO_CONTENT.into_response())
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self)).into_response()
    }
}
