//! Route path templates.
//!
//! A template is a URL path with `{name}` placeholders, e.g.
//! `/api/users/{user_id}/posts/{post_id}`. The generator reads the placeholder
//! names out of `@route` directives, generated clients render concrete paths
//! from them, and generated servers register them with the router verbatim.
//! Because all three go through this module, a value is always bound to the
//! placeholder with the same *name*; the order in which values are supplied
//! never matters.
//!
//! ## Examples
//!
//! ```
//! use switchboard_define::path::{self, PathValue};
//!
//! let rendered = path::render(
//!     "/api/users/{user_id}/posts/{post_id}",
//!     &[("post_id", PathValue::from(7_i64)), ("user_id", PathValue::from(3_i64))],
//! )
//! .unwrap();
//! assert_eq!(rendered, "/api/users/3/posts/7");
//! ```

use std::borrow::Cow;
use std::fmt;

use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};
use thiserror::Error;

/// Characters escaped when a string value is placed into a single path segment.
const SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// Errors produced while parsing or rendering a path template.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PathError {
    #[error("path template {0:?} must start with '/'")]
    MissingLeadingSlash(String),

    #[error("unclosed placeholder in path template {0:?}")]
    UnclosedPlaceholder(String),

    #[error("unexpected '}}' in path template {0:?}")]
    UnmatchedBrace(String),

    #[error("invalid placeholder name {name:?} in path template {template:?}")]
    InvalidPlaceholder { template: String, name: String },

    #[error("placeholder {{{name}}} appears more than once in {template:?}")]
    DuplicatePlaceholder { template: String, name: String },

    /// Segments such as `:id` or `*rest` are capture syntax for some routers
    /// and would silently change the meaning of the route.
    #[error("segment {segment:?} in path template {template:?} uses capture syntax; use {{name}} instead")]
    CaptureSyntax { template: String, segment: String },

    #[error("placeholder {{{name}}} in path template {template:?} must be a whole segment")]
    PartialSegment { template: String, name: String },

    #[error("no value supplied for placeholder {{{0}}}")]
    MissingValue(String),

    #[error("value supplied for unknown placeholder {{{0}}}")]
    UnknownValue(String),

    /// Empty, `.` and `..` values would be dropped or collapsed by URL
    /// normalization and reach a different route.
    #[error("value {value:?} for placeholder {{{name}}} is not a usable path segment")]
    InvalidSegmentValue { name: String, value: String },
}

/// One piece of a parsed template.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment<'a> {
    Literal(&'a str),
    Placeholder(&'a str),
}

/// A parsed path template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathTemplate<'a> {
    template: &'a str,
    segments: Vec<Segment<'a>>,
}

impl<'a> PathTemplate<'a> {
    /// Parses `template`, scanning placeholders greedily from left to right.
    ///
    /// ## Errors
    ///
    /// Fails on a missing leading `/`, unbalanced braces, placeholder names
    /// that are not identifiers, repeated names, placeholders sharing a
    /// segment with other text (`/{name}.json`), and `:name` / `*name`
    /// segments.
    pub fn parse(template: &'a str) -> Result<Self, PathError> {
        if !template.starts_with('/') {
            return Err(PathError::MissingLeadingSlash(template.to_string()));
        }

        for segment in template.split('/') {
            if segment.starts_with(':') || segment.starts_with('*') {
                return Err(PathError::CaptureSyntax {
                    template: template.to_string(),
                    segment: segment.to_string(),
                });
            }
        }

        let mut segments = Vec::new();
        let mut rest = template;

        while let Some(index) = rest.find(|c| c == '{' || c == '}') {
            if rest[index..].starts_with('}') {
                return Err(PathError::UnmatchedBrace(template.to_string()));
            }
            if index > 0 {
                segments.push(Segment::Literal(&rest[..index]));
            }

            let after = &rest[index + 1..];
            let close = after
                .find('}')
                .ok_or_else(|| PathError::UnclosedPlaceholder(template.to_string()))?;
            let name = &after[..close];

            if !is_identifier(name) {
                return Err(PathError::InvalidPlaceholder {
                    template: template.to_string(),
                    name: name.to_string(),
                });
            }
            if segments.contains(&Segment::Placeholder(name)) {
                return Err(PathError::DuplicatePlaceholder {
                    template: template.to_string(),
                    name: name.to_string(),
                });
            }

            segments.push(Segment::Placeholder(name));
            rest = &after[close + 1..];
        }

        if !rest.is_empty() {
            segments.push(Segment::Literal(rest));
        }

        for (index, segment) in segments.iter().enumerate() {
            let Segment::Placeholder(name) = segment else {
                continue;
            };
            let opens = matches!(
                index.checked_sub(1).map(|before| segments[before]),
                Some(Segment::Literal(text)) if text.ends_with('/')
            );
            let closes = match segments.get(index + 1) {
                None => true,
                Some(Segment::Literal(text)) => text.starts_with('/'),
                Some(Segment::Placeholder(_)) => false,
            };
            if !opens || !closes {
                return Err(PathError::PartialSegment {
                    template: template.to_string(),
                    name: (*name).to_string(),
                });
            }
        }

        Ok(Self { template, segments })
    }

    /// The template text as written.
    pub fn as_str(&self) -> &'a str {
        self.template
    }

    pub fn segments(&self) -> &[Segment<'a>] {
        &self.segments
    }

    /// Placeholder names in template order.
    pub fn placeholders(&self) -> impl Iterator<Item = &'a str> + '_ {
        self.segments.iter().filter_map(|segment| match segment {
            Segment::Placeholder(name) => Some(*name),
            Segment::Literal(_) => None,
        })
    }

    /// Returns `true` if the template contains a placeholder called `name`.
    pub fn has_placeholder(&self, name: &str) -> bool {
        self.placeholders().any(|placeholder| placeholder == name)
    }

    /// Renders the template, binding each placeholder to the value supplied
    /// under the same name.
    ///
    /// ## Errors
    ///
    /// Returns [`PathError::MissingValue`] when a placeholder has no value,
    /// [`PathError::UnknownValue`] when a value names no placeholder, and
    /// [`PathError::InvalidSegmentValue`] for an empty, `.` or `..` value.
    pub fn render(&self, values: &[(&str, PathValue<'_>)]) -> Result<String, PathError> {
        if let Some((name, _)) = values.iter().find(|(name, _)| !self.has_placeholder(name)) {
            return Err(PathError::UnknownValue((*name).to_string()));
        }

        let mut rendered = String::with_capacity(self.template.len() + 16);
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => rendered.push_str(text),
                Segment::Placeholder(name) => {
                    let (_, value) = values
                        .iter()
                        .find(|(candidate, _)| candidate == name)
                        .ok_or_else(|| PathError::MissingValue((*name).to_string()))?;
                    if let PathValue::Text(text) = value
                        && matches!(&**text, "" | "." | "..")
                    {
                        return Err(PathError::InvalidSegmentValue {
                            name: (*name).to_string(),
                            value: text.to_string(),
                        });
                    }
                    rendered.push_str(&value.encode());
                }
            }
        }

        Ok(rendered)
    }
}

/// A concrete value for one placeholder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathValue<'a> {
    Integer(i128),
    Text(Cow<'a, str>),
}

impl PathValue<'_> {
    /// The value as it appears in a URL path segment.
    pub fn encode(&self) -> Cow<'_, str> {
        match self {
            Self::Integer(value) => Cow::Owned(value.to_string()),
            Self::Text(text) => utf8_percent_encode(text, SEGMENT).into(),
        }
    }
}

impl fmt::Display for PathValue<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integer(value) => write!(f, "{value}"),
            Self::Text(text) => f.write_str(text),
        }
    }
}

macro_rules! integer_path_values {
    ($($ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for PathValue<'_> {
                fn from(value: $ty) -> Self {
                    Self::Integer(value as i128)
                }
            }
        )*
    };
}

integer_path_values!(i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, usize);

impl<'a> From<&'a str> for PathValue<'a> {
    fn from(value: &'a str) -> Self {
        Self::Text(Cow::Borrowed(value))
    }
}

impl<'a> From<&'a String> for PathValue<'a> {
    fn from(value: &'a String) -> Self {
        Self::Text(Cow::Borrowed(value.as_str()))
    }
}

impl From<String> for PathValue<'_> {
    fn from(value: String) -> Self {
        Self::Text(Cow::Owned(value))
    }
}

/// Placeholder names of `template`, in order.
pub fn placeholders(template: &str) -> Result<Vec<&str>, PathError> {
    Ok(PathTemplate::parse(template)?.placeholders().collect())
}

/// Parses `template` and renders it with `values` (see [`PathTemplate::render`]).
pub fn render(template: &str, values: &[(&str, PathValue<'_>)]) -> Result<String, PathError> {
    PathTemplate::parse(template)?.render(values)
}

/// Concatenates a base path and a route path.
///
/// The base's trailing `/` is dropped, and a route path of `/` resolves to the
/// base itself when there is one.
///
/// ```
/// use switchboard_define::path::join;
///
/// assert_eq!(join("/api/posts", "/{id}"), "/api/posts/{id}");
/// assert_eq!(join("/api/posts/", "/"), "/api/posts");
/// assert_eq!(join("", "/health"), "/health");
/// ```
pub fn join(base: &str, path: &str) -> String {
    let base = base.trim_end_matches('/');
    match path {
        "" | "/" if !base.is_empty() => base.to_string(),
        "" => "/".to_string(),
        _ if path.starts_with('/') => format!("{base}{path}"),
        _ => format!("{base}/{path}"),
    }
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    }
}
