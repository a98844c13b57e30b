//! Switchboard definition library.
//!
//! Types shared between the `switchboard-gen` code generator and the
//! `switchboard` runtime:
//!
//! - [`InterfaceSpec`], [`MethodSpec`], [`PathParam`], [`BodyParam`],
//!   [`ReturnSpec`] - the route IR built from annotated traits
//! - [`HttpMethod`] - the verbs accepted by `@route`
//! - [`path`] - route templates, placeholder extraction and name-based rendering
//!
//! The IR lives only for the duration of one generator run; it derives
//! `Serialize` so it can be dumped for inspection.

pub mod path;
pub mod types;

pub use path::{PathError, PathTemplate, PathValue};
pub use types::{
    BodyParam, HttpMethod, InterfaceSpec, MethodSpec, PathParam, PrimitiveKind, ReturnShape,
    ReturnSpec,
};
