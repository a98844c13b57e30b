//! Request extractors used by generated handlers.

use std::collections::HashMap;
use std::str::FromStr;

use axum::extract::{FromRequest, FromRequestParts, Json, Path, Request};
use axum::http::request::Parts;
use serde::de::DeserializeOwned;

use crate::ApiError;

/// Path placeholder values of the matched route, looked up by name.
#[derive(Debug, Clone, Default)]
pub struct PathParams {
    values: HashMap<String, String>,
}

impl PathParams {
    /// Decodes the placeholder `name` as an integer of type `T`.
    ///
    /// ## Errors
    ///
    /// `400 invalid_path_parameter` when the value is missing, not a number,
    /// or out of range for `T`.
    pub fn integer<T>(&self, name: &str) -> Result<T, ApiError>
    where
        T: FromStr,
    {
        let raw = self.raw(name)?;
        raw.parse().map_err(|_| {
            ApiError::new(
                400,
                "invalid_path_parameter",
                format!("path parameter `{name}` must be an integer, got {raw:?}"),
            )
        })
    }

    /// The placeholder `name` as a (percent-decoded) string.
    pub fn string(&self, name: &str) -> Result<String, ApiError> {
        self.raw(name).map(str::to_string)
    }

    fn raw(&self, name: &str) -> Result<&str, ApiError> {
        self.values.get(name).map(String::as_str).ok_or_else(|| {
            ApiError::new(
                400,
                "invalid_path_parameter",
                format!("missing path parameter `{name}`"),
            )
        })
    }
}

impl<S> FromRequestParts<S> for PathParams
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(values) = Path::<HashMap<String, String>>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| {
                ApiError::new(
                    rejection.status().as_u16(),
                    "invalid_path_parameter",
                    rejection.body_text(),
                )
            })?;
        Ok(Self { values })
    }
}

impl<const N: usize> From<[(&str, &str); N]> for PathParams {
    fn from(values: [(&str, &str); N]) -> Self {
        Self {
            values: values
                .into_iter()
                .map(|(name, value)| (name.to_string(), value.to_string()))
                .collect(),
        }
    }
}

/// JSON request payload.
///
/// Rejections become structured `invalid_payload` errors carrying the
/// extractor's status (400, 415 or 422).
#[derive(Debug, Clone, Copy, Default)]
pub struct Payload<T>(pub T);

impl<T, S> FromRequest<S> for Payload<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(request: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(request, state).await {
            Ok(Json(value)) => Ok(Self(value)),
            Err(rejection) => Err(ApiError::new(
                rejection.status().as_u16(),
                "invalid_payload",
                rejection.body_text(),
            )),
        }
    }
}
