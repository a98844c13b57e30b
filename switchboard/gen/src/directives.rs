//! Routing directives embedded in doc comments.
//!
//! All directive patterns live in this module:
//!
//! - `@client <Ident>` on a trait: the trait is a contract and the generated
//!   client is called `<Ident>`
//! - `@basepath <path>` on a trait: prefix for every route (optional)
//! - `@route <VERB> <path>` on a method: the method is routed
//!
//! Directives may appear anywhere in the doc text; everything else in the
//! documentation is ignored.

use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use switchboard_define::{HttpMethod, PathTemplate};

static CLIENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"@client[ \t]+([A-Za-z_][A-Za-z0-9_]*)\b").expect("client directive pattern")
});

static BASE_PATH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"@basepath[ \t]+(\S+)").expect("basepath directive pattern"));

static ROUTE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"@route\b(?:[ \t]+(\S+))?(?:[ \t]+(\S+))?").expect("route directive pattern")
});

/// Trait-level directives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterfaceDirectives {
    pub client: String,
    pub base_path: String,
}

/// A parsed `@route` directive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteDirective {
    pub method: HttpMethod,
    pub path: String,
}

/// Outcome of scanning a method's documentation for `@route`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteScan {
    /// No `@route` at all.
    Absent,
    /// `@route` is present but cannot be used; treated as absent.
    Malformed(String),
    Found(RouteDirective),
}

/// Reads `@client` and `@basepath` from a trait's documentation.
///
/// Returns `None` when there is no `@client` directive; the first one wins
/// when there are several.
///
/// ```
/// use switchboard_gen::directives::interface_directives;
///
/// let found = interface_directives(" Blog posts.\n @client PostsClient\n @basepath /api/posts").unwrap();
/// assert_eq!(found.client, "PostsClient");
/// assert_eq!(found.base_path, "/api/posts");
/// assert!(interface_directives(" Just a trait.").is_none());
/// ```
pub fn interface_directives(doc: &str) -> Option<InterfaceDirectives> {
    let client = CLIENT.captures(doc)?.get(1)?.as_str().to_string();
    let base_path = BASE_PATH
        .captures(doc)
        .and_then(|captures| captures.get(1))
        .map(|m| m.as_str().to_string())
        .unwrap_or_default();

    Some(InterfaceDirectives { client, base_path })
}

/// Reads the `@route` directive from a method's documentation.
///
/// ```
/// use switchboard_define::HttpMethod;
/// use switchboard_gen::directives::{RouteScan, route_directive};
///
/// match route_directive(" Fetch one post.\n @route GET /{id}") {
///     RouteScan::Found(route) => {
///         assert_eq!(route.method, HttpMethod::Get);
///         assert_eq!(route.path, "/{id}");
///     }
///     other => panic!("unexpected {other:?}"),
/// }
/// assert_eq!(route_directive(" no directive"), RouteScan::Absent);
/// ```
pub fn route_directive(doc: &str) -> RouteScan {
    let Some(captures) = ROUTE.captures(doc) else {
        return RouteScan::Absent;
    };

    let (Some(verb), Some(path)) = (captures.get(1), captures.get(2)) else {
        return RouteScan::Malformed("expected `@route <VERB> <path>`".to_string());
    };

    let Ok(method) = HttpMethod::from_str(verb.as_str()) else {
        return RouteScan::Malformed(format!(
            "unknown verb {:?}; expected GET, POST, PUT, DELETE or PATCH",
            verb.as_str()
        ));
    };

    if let Err(err) = PathTemplate::parse(path.as_str()) {
        return RouteScan::Malformed(err.to_string());
    }

    RouteScan::Found(RouteDirective {
        method,
        path: path.as_str().to_string(),
    })
}

/// Documentation with directive lines removed, trimmed; the first remaining
/// line is used as a summary in generated docs.
pub fn summary(doc: &str) -> Option<String> {
    doc.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .find(|line| !line.starts_with('@'))
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_directive_requires_identifier() {
        assert!(interface_directives("@client").is_none());
        assert!(interface_directives("@client 9Lives").is_none());
        assert_eq!(
            interface_directives("@client Posts_V2").map(|d| d.client),
            Some("Posts_V2".to_string())
        );
    }

    #[test]
    fn first_client_directive_wins() {
        let found = interface_directives("@client First\n@client Second").unwrap();
        assert_eq!(found.client, "First");
        assert_eq!(found.base_path, "");
    }

    #[test]
    fn route_directive_variants() {
        assert!(matches!(
            route_directive("@route DELETE /{id}"),
            RouteScan::Found(RouteDirective {
                method: HttpMethod::Delete,
                ..
            })
        ));
        assert!(matches!(route_directive("@route"), RouteScan::Malformed(_)));
        assert!(matches!(route_directive("@route GET"), RouteScan::Malformed(_)));
        assert!(matches!(
            route_directive("@route FETCH /x"),
            RouteScan::Malformed(_)
        ));
        assert!(matches!(
            route_directive("@route get /x"),
            RouteScan::Malformed(_)
        ));
        assert!(matches!(
            route_directive("@route GET /posts/{id"),
            RouteScan::Malformed(_)
        ));
    }

    #[test]
    fn route_directive_does_not_span_lines() {
        assert!(matches!(
            route_directive("@route GET\n/posts"),
            RouteScan::Malformed(_)
        ));
    }

    #[test]
    fn summary_skips_directives() {
        assert_eq!(
            summary(" @route GET /{id}\n Fetches a post by id.\n More detail."),
            Some("Fetches a post by id.".to_string())
        );
        assert_eq!(summary(" @route GET /"), None);
    }
}
