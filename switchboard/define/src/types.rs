//! Route IR types.
//!
//! These types describe one annotated contract after extraction:
//!
//! - [`InterfaceSpec`] - a trait carrying `@client`, with its routed methods
//! - [`MethodSpec`] - one method carrying a well-formed `@route`
//! - [`PathParam`] - a parameter bound to a `{placeholder}` of the route
//! - [`HttpMethod`] - the supported verbs

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

use crate::path;

/// HTTP verbs accepted by the `@route` directive.
///
/// ## Examples
///
/// ```
/// use std::str::FromStr;
/// use switchboard_define::HttpMethod;
///
/// assert_eq!(HttpMethod::from_str("DELETE").unwrap(), HttpMethod::Delete);
/// assert_eq!(HttpMethod::Patch.to_string(), "PATCH");
/// assert!(HttpMethod::from_str("get").is_err());
/// ```
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumIter,
    EnumString,
)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
    Patch,
}

impl HttpMethod {
    /// Lowercase verb, as used by router method names (`get`, `post`, ...).
    pub fn as_lowercase(&self) -> &'static str {
        match self {
            Self::Get => "get",
            Self::Post => "post",
            Self::Put => "put",
            Self::Delete => "delete",
            Self::Patch => "patch",
        }
    }
}

/// Kind of value a path placeholder carries on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum PrimitiveKind {
    Integer,
    String,
}

/// A method parameter bound to the route placeholder of the same name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathParam {
    pub name: String,
    pub kind: PrimitiveKind,
    /// Declared type with any reference removed (`i64`, `u32`, `str`, `String`).
    pub type_name: String,
    /// Whether the parameter was declared as a reference (`&str`).
    pub by_ref: bool,
}

impl PathParam {
    pub fn integer(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: PrimitiveKind::Integer,
            type_name: type_name.into(),
            by_ref: false,
        }
    }

    pub fn string(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: PrimitiveKind::String,
            type_name: "String".to_string(),
            by_ref: false,
        }
    }
}

/// The request payload parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BodyParam {
    pub name: String,
    /// Declared type with a leading reference removed.
    pub type_name: String,
    pub by_ref: bool,
}

/// Shape of a successful result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ReturnShape {
    /// A plain value, e.g. `Post`.
    Value,
    /// `Option<X>`: absent maps to "not found".
    Pointer,
    /// `Vec<X>`.
    Slice,
}

/// The success type of a routed method.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReturnSpec {
    /// Full declared type (`Option<Post>`).
    pub type_name: String,
    /// Element or referent type (`Post`); equal to `type_name` for values.
    pub inner: String,
    pub shape: ReturnShape,
}

/// One routed method of a contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodSpec {
    pub name: String,
    pub http_method: HttpMethod,
    /// Route template relative to the interface base path.
    pub path: String,
    /// Path-bound parameters in declaration order.
    pub path_params: Vec<PathParam>,
    /// Whether the context parameter is taken by reference.
    pub context_by_ref: bool,
    pub body: Option<BodyParam>,
    /// Names of the path parameters and the payload in declaration order;
    /// implementations are invoked with their arguments in this order.
    pub argument_order: Vec<String>,
    pub returns: Option<ReturnSpec>,
    /// Declared error type of the `Result`, if spelled out.
    pub error_type: Option<String>,
    /// First line of the method's documentation, minus directives.
    pub summary: Option<String>,
}

impl MethodSpec {
    pub fn has_body(&self) -> bool {
        self.body.is_some()
    }

    pub fn body_type(&self) -> Option<&str> {
        self.body.as_ref().map(|body| body.type_name.as_str())
    }

    pub fn has_return(&self) -> bool {
        self.returns.is_some()
    }

    pub fn return_type(&self) -> Option<&str> {
        self.returns.as_ref().map(|ret| ret.type_name.as_str())
    }

    pub fn is_pointer(&self) -> bool {
        matches!(
            self.returns,
            Some(ReturnSpec {
                shape: ReturnShape::Pointer,
                ..
            })
        )
    }

    pub fn is_slice(&self) -> bool {
        matches!(
            self.returns,
            Some(ReturnSpec {
                shape: ReturnShape::Slice,
                ..
            })
        )
    }

    /// Looks up a path parameter by name.
    pub fn path_param(&self, name: &str) -> Option<&PathParam> {
        self.path_params.iter().find(|param| param.name == name)
    }
}

/// A contract trait carrying the `@client` directive.
///
/// ## Examples
///
/// ```
/// use switchboard_define::{HttpMethod, InterfaceSpec, MethodSpec, PathParam};
///
/// let spec = InterfaceSpec {
///     name: "PostsService".to_string(),
///     client_name: "PostsClient".to_string(),
///     base_path: "/api/posts".to_string(),
///     methods: vec![MethodSpec {
///         name: "get_by_id".to_string(),
///         http_method: HttpMethod::Get,
///         path: "/{id}".to_string(),
///         path_params: vec![PathParam::integer("id", "i64")],
///         context_by_ref: false,
///         body: None,
///         argument_order: vec!["id".to_string()],
///         returns: None,
///         error_type: None,
///         summary: None,
///     }],
/// };
///
/// assert_eq!(spec.route_for(&spec.methods[0]), "/api/posts/{id}");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterfaceSpec {
    /// Trait identifier.
    pub name: String,
    /// Identifier of the generated client (`@client`).
    pub client_name: String,
    /// Prefix from `@basepath`, empty when absent.
    pub base_path: String,
    /// Routed methods in declaration order.
    pub methods: Vec<MethodSpec>,
}

impl InterfaceSpec {
    /// Full route template of `method`. Both the client and the server
    /// emitters take their route text from here.
    pub fn route_for(&self, method: &MethodSpec) -> String {
        path::join(&self.base_path, &method.path)
    }

    /// `(verb, full route)` for every method, in declaration order.
    pub fn routes(&self) -> Vec<(HttpMethod, String)> {
        self.methods
            .iter()
            .map(|method| (method.http_method, self.route_for(method)))
            .collect()
    }

    pub fn method(&self, name: &str) -> Option<&MethodSpec> {
        self.methods.iter().find(|method| method.name == name)
    }
}
