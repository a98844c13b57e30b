//! Per-call context handed to contract implementations.

use std::collections::BTreeMap;

use crate::HttpMethod;

/// Request-scoped information passed as the first argument of every routed
/// method.
///
/// Generated dispatchers build it from the incoming request. Callers that
/// invoke an implementation directly (tests, in-process use) can pass
/// `Context::default()`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Context {
    method: Option<HttpMethod>,
    path: String,
    headers: BTreeMap<String, String>,
}

impl Context {
    pub fn new(method: HttpMethod, path: impl Into<String>) -> Self {
        Self {
            method: Some(method),
            path: path.into(),
            headers: BTreeMap::new(),
        }
    }

    /// Adds a header; names are stored lowercase.
    pub fn with_header(mut self, name: impl AsRef<str>, value: impl Into<String>) -> Self {
        self.headers
            .insert(name.as_ref().to_ascii_lowercase(), value.into());
        self
    }

    /// Verb of the request, `None` outside of HTTP dispatch.
    pub fn method(&self) -> Option<HttpMethod> {
        self.method
    }

    /// Concrete request path (placeholders already substituted).
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    pub fn headers(&self) -> impl Iterator<Item = (&str, &str)> {
        self.headers
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }

    /// Value of the `x-request-id` header.
    pub fn request_id(&self) -> Option<&str> {
        self.header("x-request-id")
    }

    /// Bearer token from the `authorization` header.
    pub fn bearer_token(&self) -> Option<&str> {
        self.header("authorization")?.strip_prefix("Bearer ")
    }
}

#[cfg(feature = "server")]
impl<S> axum::extract::FromRequestParts<S> for Context
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(
        parts: &mut axum::http::request::Parts,
        _state: &S,
    ) -> Result<Self, Self::Rejection> {
        let headers = parts
            .headers
            .iter()
            .filter_map(|(name, value)| {
                let value = value.to_str().ok()?;
                Some((name.as_str().to_string(), value.to_string()))
            })
            .collect();

        Ok(Self {
            method: parts.method.as_str().parse().ok(),
            path: parts.uri.path().to_string(),
            headers,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn headers_are_case_insensitive() {
        let ctx = Context::new(HttpMethod::Get, "/api/posts/1")
            .with_header("X-Request-Id", "abc")
            .with_header("Authorization", "Bearer secret");

        assert_eq!(ctx.request_id(), Some("abc"));
        assert_eq!(ctx.header("AUTHORIZATION"), Some("Bearer secret"));
        assert_eq!(ctx.bearer_token(), Some("secret"));
        assert_eq!(ctx.method(), Some(HttpMethod::Get));
        assert_eq!(ctx.path(), "/api/posts/1");
    }

    #[test]
    fn default_context_is_empty() {
        let ctx = Context::default();
        assert_eq!(ctx.method(), None);
        assert_eq!(ctx.headers().count(), 0);
        assert_eq!(ctx.bearer_token(), None);
    }
}
