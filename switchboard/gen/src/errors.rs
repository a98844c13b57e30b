//! Error types for the switchboard generator.

use std::fmt;
use std::path::PathBuf;

use switchboard_define::HttpMethod;
use thiserror::Error;

/// Errors that stop generation for a file or for the whole run.
#[derive(Debug, Error)]
pub enum GeneratorError {
    /// A source file is not valid Rust. Aborts the run before any write.
    #[error(
        "failed to parse {}:{}:{}: {source}",
        .path.display(),
        .source.span().start().line,
        .source.span().start().column + 1
    )]
    Parse {
        path: PathBuf,
        #[source]
        source: syn::Error,
    },

    /// Failed to read a source file.
    #[error("failed to read '{}': {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to write a generated file.
    #[error("failed to write '{}': {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Emitted tokens did not form a valid Rust file.
    #[error("code generation failed: {0}")]
    CodeGen(String),

    /// Invalid configuration file or option.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// The target directory could not be walked.
    #[error("cannot scan '{}': {reason}", .path.display())]
    Discovery { path: PathBuf, reason: String },

    /// Strict mode found specification errors.
    #[error(
        "{} specification error(s) in '{}':\n{}",
        .issues.len(),
        .path.display(),
        list(.issues)
    )]
    Strict { path: PathBuf, issues: Vec<Skipped> },

    /// Some files could not be written; the others were.
    #[error("{} file(s) failed:\n{}", .failures.len(), list(.failures))]
    Failed { failures: Vec<GeneratorError> },
}

/// A specification error: the method or trait is excluded from generation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SpecIssue {
    #[error("malformed @route directive: {0}")]
    MalformedRoute(String),

    #[error("invalid @basepath {base_path:?}: {reason}")]
    InvalidBasePath { base_path: String, reason: String },

    #[error("method has no `self` receiver")]
    MissingReceiver,

    #[error("method has no context parameter")]
    MissingContext,

    #[error("parameter {index} is not a plain identifier")]
    UnsupportedPattern { index: usize },

    #[error("path parameter `{name}` has unsupported type `{type_name}`; use an integer type, `String` or `&str`")]
    UnsupportedPathParamType { name: String, type_name: String },

    #[error("placeholder {{{name}}} has no parameter named `{name}`")]
    UnboundPlaceholder { name: String },

    #[error("parameter `{name}` of type `{type_name}` has no matching {{{name}}} placeholder")]
    UnmatchedParameter { name: String, type_name: String },

    #[error("payload `{name}` has primitive type `{type_name}`")]
    PrimitivePayload { name: String, type_name: String },

    #[error("more than one payload parameter (`{first}` and `{second}`)")]
    MultiplePayloads { first: String, second: String },

    #[error("method is not async")]
    NotAsync,

    #[error("unsupported return type `{type_name}`: {reason}")]
    UnsupportedReturn { type_name: String, reason: String },

    #[error("{method} {route} is already routed by `{existing}`")]
    DuplicateRoute {
        method: HttpMethod,
        route: String,
        existing: String,
    },

    /// Same segments as an existing route, different placeholder names. The
    /// router cannot hold both.
    #[error("{route} conflicts with {other} routed by `{existing}`; placeholders in the same position must share a name")]
    RouteConflict {
        route: String,
        other: String,
        existing: String,
    },

    #[error("method name `{0}` is reserved by the generated client")]
    ReservedName(String),
}

/// A candidate excluded from generation, with the reason.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Skipped {
    pub interface: String,
    /// `None` when the whole trait was skipped.
    pub method: Option<String>,
    pub issue: SpecIssue,
}

impl fmt::Display for Skipped {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.method {
            Some(method) => write!(f, "{}::{}: {}", self.interface, method, self.issue),
            None => write!(f, "{}: {}", self.interface, self.issue),
        }
    }
}

fn list<T: fmt::Display>(items: &[T]) -> String {
    items
        .iter()
        .map(|item| format!("  - {item}"))
        .collect::<Vec<_>>()
        .join("\n")
}
