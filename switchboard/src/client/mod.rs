//! Client-side runtime.
//!
//! Every generated client wraps a [`Transport`] built from [`ClientOptions`]:
//!
//! ```rust,ignore
//! use switchboard::client::ClientOptions;
//!
//! let posts = PostsClient::new(ClientOptions::new("http://localhost:8080"))?;
//! match posts.get_by_id(7).await? {
//!     Some(post) => println!("{}", post.title),
//!     None => println!("no such post"),
//! }
//! ```

mod transport;

pub use transport::{ClientOptions, Transport, encode};
