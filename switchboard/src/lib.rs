//! Runtime support for code generated by `switchboard-gen`.
//!
//! Generated clients and dispatchers are thin: every route-independent
//! concern lives here so both sides of a contract behave the same way.
//!
//! ## Features
//!
//! - `client` (default) - [`client::Transport`] and [`client::ClientOptions`],
//!   built on `reqwest`
//! - `server` (default) - axum extractors, responders and the middleware
//!   chain used by generated dispatchers
//!
//! ## Example
//!
//! ```rust,ignore
//! mod posts {
//!     use switchboard::{ApiError, Context};
//!
//!     /// @client PostsClient
//!     /// @basepath /api/posts
//!     #[async_trait::async_trait]
//!     pub trait PostsService {
//!         /// @route GET /{id}
//!         async fn get_by_id(&self, ctx: Context, id: i64) -> Result<Option<Post>, ApiError>;
//!     }
//!
//!     #[path = "posts_client_gen.rs"]
//!     pub mod client;
//!     #[path = "posts_server_gen.rs"]
//!     pub mod server;
//! }
//!
//! let client = posts::client::PostsClient::new(ClientOptions::new("http://localhost:8080"))?;
//! let post = client.get_by_id(7).await?;
//! ```

pub mod context;
pub mod error;

#[cfg(feature = "client")]
pub mod client;
#[cfg(feature = "server")]
pub mod server;

pub use context::Context;
pub use error::{ApiError, ClientError};
pub use switchboard_define::{HttpMethod, path};
