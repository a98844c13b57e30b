//! Server-side runtime for generated dispatchers.
//!
//! A dispatcher registers one axum route per routed method and forwards the
//! decoded request to the contract implementation:
//!
//! ```rust,ignore
//! use switchboard::server::{Router, middleware};
//!
//! let app = PostsServiceDispatcher::new(MyPosts::default())
//!     .with_middleware(middleware::trace())
//!     .register(Router::new());
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:8080").await?;
//! switchboard::server::axum::serve(listener, app).await?;
//! ```

mod extract;
pub mod middleware;
mod respond;

pub use axum;
pub use axum::Router;
pub use axum::extract::State;
pub use axum::response::Response;
pub use axum::routing;

pub use extract::{PathParams, Payload};
pub use middleware::{Middleware, apply_middleware};
pub use respond::{json, no_content, optional};
