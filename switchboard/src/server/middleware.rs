//! Middleware chain attached to generated dispatchers.

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Instant;

use axum::Router;
use axum::extract::Request;
use axum::middleware::{Next, from_fn};
use axum::response::Response;
use tracing::info;

type BoxFuture = Pin<Box<dyn Future<Output = Response> + Send>>;

/// A cross-cutting request behaviour (logging, auth, ...).
///
/// ## Examples
///
/// ```rust,ignore
/// use switchboard::server::Middleware;
///
/// let require_tenant = Middleware::new(|request, next| async move {
///     if request.headers().contains_key("x-tenant") {
///         next.run(request).await
///     } else {
///         switchboard::ApiError::bad_request("missing x-tenant").into_response()
///     }
/// });
/// let dispatcher = PostsServiceDispatcher::new(service).with_middleware(require_tenant);
/// ```
#[derive(Clone)]
pub struct Middleware {
    handler: Arc<dyn Fn(Request, Next) -> BoxFuture + Send + Sync>,
}

impl Middleware {
    pub fn new<F, Fut>(handler: F) -> Self
    where
        F: Fn(Request, Next) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Response> + Send + 'static,
    {
        Self {
            handler: Arc::new(move |request: Request, next: Next| {
                Box::pin(handler(request, next)) as BoxFuture
            }),
        }
    }

    async fn call(&self, request: Request, next: Next) -> Response {
        (self.handler)(request, next).await
    }
}

impl fmt::Debug for Middleware {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Middleware").finish_non_exhaustive()
    }
}

/// Wraps `router` in `chain`; the first middleware sees requests first.
pub fn apply_middleware<S>(router: Router<S>, chain: &[Middleware]) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    // Router::layer makes the most recent layer the outermost one.
    chain.iter().rev().fold(router, |router, middleware| {
        let middleware = middleware.clone();
        router.layer(from_fn(move |request: Request, next: Next| {
            let middleware = middleware.clone();
            async move { middleware.call(request, next).await }
        }))
    })
}

/// Logs one `info` event per request with method, path, status and latency.
pub fn trace() -> Middleware {
    Middleware::new(|request: Request, next: Next| async move {
        let method = request.method().clone();
        let path = request.uri().path().to_string();
        let started = Instant::now();

        let response = next.run(request).await;

        info!(
            %method,
            %path,
            status = response.status().as_u16(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "request handled"
        );
        response
    })
}
