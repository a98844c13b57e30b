//! Request execution for generated clients.
//!
//! Generated methods only render the path and encode the payload; sending,
//! authentication, status handling and decoding all happen in
//! [`Transport::fetch`] and [`Transport::execute`].

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{Span, debug, instrument};

use crate::error::{ApiError, ClientError};
use crate::{HttpMethod, path};

/// Default request timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

type TokenProvider = Arc<dyn Fn() -> Option<String> + Send + Sync>;

/// Configuration accepted by every generated client constructor.
///
/// ## Examples
///
/// ```
/// use std::time::Duration;
/// use switchboard::client::ClientOptions;
///
/// let options = ClientOptions::new("https://blog.example.com")
///     .base_path("/v2/posts")
///     .header("x-tenant", "acme")
///     .auth_token(|| std::env::var("BLOG_TOKEN").ok())
///     .timeout(Duration::from_secs(5));
/// ```
#[derive(Clone)]
pub struct ClientOptions {
    base_url: String,
    base_path: Option<String>,
    headers: Vec<(String, String)>,
    token: Option<TokenProvider>,
    timeout: Duration,
    http: Option<reqwest::Client>,
}

impl ClientOptions {
    /// Options targeting `base_url` (scheme, host and optional port).
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            base_path: None,
            headers: Vec::new(),
            token: None,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            http: None,
        }
    }

    /// Replaces the contract's `@basepath` prefix for every call.
    pub fn base_path(mut self, base_path: impl Into<String>) -> Self {
        self.base_path = Some(base_path.into());
        self
    }

    /// Adds a header sent with every request.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Sets a provider queried before each request; a returned token is sent
    /// as `Authorization: Bearer <token>`.
    pub fn auth_token<F>(mut self, provider: F) -> Self
    where
        F: Fn() -> Option<String> + Send + Sync + 'static,
    {
        self.token = Some(Arc::new(provider));
        self
    }

    /// Per-request timeout. Ignored when a custom client is supplied.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Uses an existing `reqwest::Client` (and its connection pool).
    pub fn http_client(mut self, client: reqwest::Client) -> Self {
        self.http = Some(client);
        self
    }
}

impl fmt::Debug for ClientOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientOptions")
            .field("base_url", &self.base_url)
            .field("base_path", &self.base_path)
            .field("headers", &self.headers)
            .field("token", &self.token.as_ref().map(|_| "<provider>"))
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Shared HTTP plumbing behind a generated client.
///
/// Cloning is cheap; clones share the connection pool.
#[derive(Clone)]
pub struct Transport {
    http: reqwest::Client,
    base_url: String,
    default_base_path: String,
    base_path: Option<String>,
    headers: Vec<(String, String)>,
    token: Option<TokenProvider>,
}

impl Transport {
    /// Builds a transport for a contract whose routes start with
    /// `default_base_path`.
    ///
    /// ## Errors
    ///
    /// Returns [`ClientError::Transport`] when no `http_client` was supplied
    /// and the `reqwest` client cannot be built (for example when the TLS
    /// backend fails to initialize).
    pub fn new(options: ClientOptions, default_base_path: &str) -> Result<Self, ClientError> {
        let http = match options.http {
            Some(client) => client,
            None => reqwest::Client::builder().timeout(options.timeout).build()?,
        };

        Ok(Self {
            http,
            base_url: options.base_url.trim_end_matches('/').to_string(),
            default_base_path: default_base_path.trim_end_matches('/').to_string(),
            base_path: options.base_path,
            headers: options.headers,
            token: options.token,
        })
    }

    /// Absolute URL for a rendered route, applying the base-path override.
    pub fn url(&self, route: &str) -> String {
        let route = match &self.base_path {
            Some(base) => match self.strip_default_base(route) {
                Some(rest) => path::join(base, rest),
                None => route.to_string(),
            },
            None => route.to_string(),
        };
        format!("{}{}", self.base_url, route)
    }

    /// The part of `route` after the contract's base path, which must end at
    /// a segment boundary (`/api` prefixes `/api/x` but not `/apiary`).
    fn strip_default_base<'r>(&self, route: &'r str) -> Option<&'r str> {
        let rest = route.strip_prefix(self.default_base_path.as_str())?;
        (rest.is_empty() || rest.starts_with('/')).then_some(rest)
    }

    /// Sends a request and decodes the JSON success body as `T`.
    ///
    /// ## Errors
    ///
    /// [`ClientError::Transport`] for network failures, [`ClientError::Api`]
    /// for non-success statuses, [`ClientError::Decode`] when the body does
    /// not match `T`.
    #[instrument(
        name = "switchboard_request",
        skip(self, body),
        fields(
            http.method = %method,
            http.status_code = tracing::field::Empty,
        )
    )]
    pub async fn fetch<T>(
        &self,
        method: HttpMethod,
        route: &str,
        body: Option<String>,
    ) -> Result<T, ClientError>
    where
        T: DeserializeOwned,
    {
        let bytes = self.send(method, route, body).await?;
        serde_json::from_slice(&bytes).map_err(ClientError::Decode)
    }

    /// Sends a request whose success response carries no value.
    #[instrument(
        name = "switchboard_request",
        skip(self, body),
        fields(
            http.method = %method,
            http.status_code = tracing::field::Empty,
        )
    )]
    pub async fn execute(
        &self,
        method: HttpMethod,
        route: &str,
        body: Option<String>,
    ) -> Result<(), ClientError> {
        self.send(method, route, body).await.map(|_| ())
    }

    async fn send(
        &self,
        method: HttpMethod,
        route: &str,
        body: Option<String>,
    ) -> Result<Vec<u8>, ClientError> {
        let url = self.url(route);
        let mut request = self.http.request(to_reqwest(method), &url);

        for (name, value) in &self.headers {
            request = request.header(name.as_str(), value.as_str());
        }
        if let Some(token) = self.token.as_ref().and_then(|provider| provider()) {
            request = request.header(AUTHORIZATION, format!("Bearer {token}"));
        }
        if let Some(body) = body {
            request = request.header(CONTENT_TYPE, "application/json").body(body);
        }

        let response = request.send().await?;
        let status = response.status();
        Span::current().record("http.status_code", status.as_u16());

        let bytes = response.bytes().await?;
        if !status.is_success() {
            let err = serde_json::from_slice::<ApiError>(&bytes).unwrap_or_else(|_| {
                ApiError::new(
                    status.as_u16(),
                    "http_error",
                    String::from_utf8_lossy(&bytes).into_owned(),
                )
            });
            debug!(status = status.as_u16(), code = %err.code, %url, "request failed");
            return Err(ClientError::Api(err));
        }

        Ok(bytes.to_vec())
    }
}

impl fmt::Debug for Transport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Transport")
            .field("base_url", &self.base_url)
            .field("default_base_path", &self.default_base_path)
            .field("base_path", &self.base_path)
            .finish_non_exhaustive()
    }
}

/// Serializes a request payload as JSON.
pub fn encode<T>(payload: &T) -> Result<String, ClientError>
where
    T: Serialize + ?Sized,
{
    serde_json::to_string(payload).map_err(ClientError::Encode)
}

fn to_reqwest(method: HttpMethod) -> reqwest::Method {
    match method {
        HttpMethod::Get => reqwest::Method::GET,
        HttpMethod::Post => reqwest::Method::POST,
        HttpMethod::Put => reqwest::Method::PUT,
        HttpMethod::Delete => reqwest::Method::DELETE,
        HttpMethod::Patch => reqwest::Method::PATCH,
    }
}
