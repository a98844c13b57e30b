//! switchboard code generator library.
//!
//! Reads Rust traits annotated with routing directives in their doc comments
//! and generates, for each one, a typed HTTP client and an axum dispatcher
//! that agree on every route by construction.
//!
//! ```rust,ignore
//! /// Blog posts.
//! /// @client PostsClient
//! /// @basepath /api/posts
//! #[async_trait::async_trait]
//! pub trait PostsService {
//!     /// @route GET /{id}
//!     async fn get_by_id(&self, ctx: Context, id: i64) -> Result<Option<Post>, BlogError>;
//! }
//! ```
//!
//! ## Modules
//!
//! - [`directives`] - `@client`, `@basepath` and `@route` matching
//! - [`extract`] - finds annotated traits and classifies method parameters
//! - [`builder`] - validates candidates and builds the route IR
//! - [`codegen`] - client and dispatcher emitters
//! - [`output`] - assembly, validation, formatting and atomic writes
//! - [`discovery`] / [`runner`] - the directory-wide `generate` run
//! - [`config`] - `switchboard.toml` and run options
//! - [`errors`] - error types for the generator
//!
//! ## Example Usage
//!
//! ```no_run
//! use std::path::Path;
//! use switchboard_gen::config::GenerateOptions;
//! use switchboard_gen::runner::generate_dir;
//!
//! let report = generate_dir(Path::new("src"), &GenerateOptions::default()).unwrap();
//! println!("wrote {} files", report.written.len());
//! ```

pub mod builder;
pub mod codegen;
pub mod config;
pub mod directives;
pub mod discovery;
pub mod errors;
pub mod extract;
pub mod output;
pub mod runner;
pub mod typename;

#[cfg(test)]
pub(crate) mod test_utils;

pub use builder::Extraction;
pub use config::GenerateOptions;
pub use errors::{GeneratorError, Skipped, SpecIssue};
pub use runner::{Report, extract_source, generate_dir};
