//! Annotation extractor.
//!
//! Walks a parsed source file, finds traits documented with `@client`, and
//! classifies the parameters of every method documented with `@route`.
//! Return types are resolved later by [`crate::builder`].

use switchboard_define::{PathParam, PathTemplate, PrimitiveKind};
use syn::{
    Attribute, Expr, FnArg, Item, ItemTrait, Lit, Meta, Pat, ReturnType, TraitItem, TraitItemFn,
    Type,
};
use tracing::debug;

use crate::directives::{self, InterfaceDirectives, RouteDirective, RouteScan};
use crate::errors::SpecIssue;
use crate::typename;

/// A trait carrying `@client`, before validation.
#[derive(Debug, Clone)]
pub struct ExtractedInterface {
    pub name: String,
    pub directives: InterfaceDirectives,
    /// Every method carrying `@route`, well-formed or not, in order.
    pub candidates: Vec<MethodCandidate>,
}

/// A method carrying `@route`.
#[derive(Debug, Clone)]
pub struct MethodCandidate {
    pub name: String,
    pub outcome: Result<ExtractedMethod, SpecIssue>,
}

/// A routed method whose parameters were classified.
#[derive(Debug, Clone)]
pub struct ExtractedMethod {
    pub name: String,
    pub route: RouteDirective,
    pub context_by_ref: bool,
    pub path_params: Vec<PathParam>,
    /// Parameters not bound to a placeholder.
    pub payloads: Vec<PayloadCandidate>,
    /// Names of all non-context parameters in declaration order.
    pub argument_order: Vec<String>,
    pub is_async: bool,
    /// Declared return type; `None` for the implicit `()`.
    pub output: Option<Type>,
    pub summary: Option<String>,
}

#[derive(Debug, Clone)]
pub struct PayloadCandidate {
    pub name: String,
    pub ty: Type,
}

/// Doc text of an item: one line per `#[doc = "..."]` attribute.
pub fn doc_text(attrs: &[Attribute]) -> String {
    attrs
        .iter()
        .filter(|attr| attr.path().is_ident("doc"))
        .filter_map(|attr| match &attr.meta {
            Meta::NameValue(nv) => match &nv.value {
                Expr::Lit(expr) => match &expr.lit {
                    Lit::Str(s) => Some(s.value()),
                    _ => None,
                },
                _ => None,
            },
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Extracts every `@client` trait declared at the top level of `file`.
pub fn extract_file(file: &syn::File) -> Vec<ExtractedInterface> {
    file.items
        .iter()
        .filter_map(|item| match item {
            Item::Trait(item_trait) => extract_trait(item_trait),
            _ => None,
        })
        .collect()
}

/// Extracts one trait; `None` unless it carries `@client`.
pub fn extract_trait(item: &ItemTrait) -> Option<ExtractedInterface> {
    let name = item.ident.to_string();
    let Some(directives) = directives::interface_directives(&doc_text(&item.attrs)) else {
        debug!(%name, "trait has no @client directive");
        return None;
    };

    let candidates = item
        .items
        .iter()
        .filter_map(|trait_item| match trait_item {
            TraitItem::Fn(method) => extract_method(method),
            _ => None,
        })
        .collect();

    Some(ExtractedInterface {
        name,
        directives,
        candidates,
    })
}

fn extract_method(method: &TraitItemFn) -> Option<MethodCandidate> {
    let name = method.sig.ident.to_string();
    let doc = doc_text(&method.attrs);

    let route = match directives::route_directive(&doc) {
        RouteScan::Absent => {
            debug!(%name, "method has no @route directive");
            return None;
        }
        RouteScan::Malformed(reason) => {
            return Some(MethodCandidate {
                name,
                outcome: Err(SpecIssue::MalformedRoute(reason)),
            });
        }
        RouteScan::Found(route) => route,
    };

    let outcome = classify(method, route, directives::summary(&doc));
    Some(MethodCandidate { name, outcome })
}

fn classify(
    method: &TraitItemFn,
    route: RouteDirective,
    summary: Option<String>,
) -> Result<ExtractedMethod, SpecIssue> {
    let template = PathTemplate::parse(&route.path)
        .map_err(|err| SpecIssue::MalformedRoute(err.to_string()))?;

    let mut inputs = method.sig.inputs.iter();
    match inputs.next() {
        Some(FnArg::Receiver(_)) => {}
        _ => return Err(SpecIssue::MissingReceiver),
    }

    let mut context_by_ref = None;
    let mut path_params = Vec::new();
    let mut payloads = Vec::new();
    let mut argument_order = Vec::new();

    for (index, input) in inputs.enumerate() {
        let FnArg::Typed(pat_type) = input else {
            return Err(SpecIssue::MissingReceiver);
        };
        let Pat::Ident(pat) = pat_type.pat.as_ref() else {
            return Err(SpecIssue::UnsupportedPattern { index: index + 1 });
        };
        let name = pat.ident.to_string();
        let ty = pat_type.ty.as_ref();

        if context_by_ref.is_none() {
            if template.has_placeholder(&name) || typename::is_primitive(ty) {
                return Err(SpecIssue::MissingContext);
            }
            context_by_ref = Some(matches!(ty, Type::Reference(_)));
            continue;
        }

        argument_order.push(name.clone());
        if template.has_placeholder(&name) {
            path_params.push(path_param(name, ty)?);
        } else {
            payloads.push(PayloadCandidate {
                name,
                ty: ty.clone(),
            });
        }
    }

    let output = match &method.sig.output {
        ReturnType::Default => None,
        ReturnType::Type(_, ty) => Some(ty.as_ref().clone()),
    };

    Ok(ExtractedMethod {
        name: method.sig.ident.to_string(),
        route,
        context_by_ref: context_by_ref.ok_or(SpecIssue::MissingContext)?,
        path_params,
        payloads,
        argument_order,
        is_async: method.sig.asyncness.is_some(),
        output,
        summary,
    })
}

fn path_param(name: String, ty: &Type) -> Result<PathParam, SpecIssue> {
    if let Some(integer) = typename::integer_name(ty) {
        return Ok(PathParam {
            name,
            kind: PrimitiveKind::Integer,
            type_name: integer,
            by_ref: false,
        });
    }

    if typename::is_string(ty) {
        let (inner, by_ref) = typename::strip_reference(ty);
        return Ok(PathParam {
            name,
            kind: PrimitiveKind::String,
            type_name: typename::flatten(inner),
            by_ref,
        });
    }

    Err(SpecIssue::UnsupportedPathParamType {
        name,
        type_name: typename::flatten(ty),
    })
}
