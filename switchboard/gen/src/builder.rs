//! Route IR builder.
//!
//! Turns extracted traits into [`InterfaceSpec`]s. Every method that violates
//! a convention is dropped and reported as a [`Skipped`] candidate instead of
//! failing the run.

use serde::Serialize;
use switchboard_define::path::Segment;
use switchboard_define::{
    BodyParam, InterfaceSpec, MethodSpec, PathTemplate, ReturnShape, ReturnSpec,
};
use syn::{GenericArgument, PathArguments, Type, TypeParamBound};
use tracing::info;

use crate::errors::{Skipped, SpecIssue};
use crate::extract::{ExtractedInterface, ExtractedMethod};
use crate::typename;

/// Names the generated client reserves for itself.
const RESERVED: &[&str] = &["new"];

/// Result of building the IR for one source file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Extraction {
    pub interfaces: Vec<InterfaceSpec>,
    #[serde(serialize_with = "serialize_skipped")]
    pub skipped: Vec<Skipped>,
}

fn serialize_skipped<S>(skipped: &[Skipped], serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.collect_seq(skipped.iter().map(ToString::to_string))
}

/// Builds the IR for every extracted trait, in source order.
pub fn build(extracted: Vec<ExtractedInterface>) -> Extraction {
    let mut extraction = Extraction::default();
    for interface in extracted {
        build_interface(interface, &mut extraction);
    }

    for skipped in &extraction.skipped {
        info!(%skipped, "skipping candidate");
    }
    extraction
}

fn build_interface(interface: ExtractedInterface, out: &mut Extraction) {
    let ExtractedInterface {
        name,
        directives,
        candidates,
    } = interface;

    if let Err(reason) = validate_base_path(&directives.base_path) {
        out.skipped.push(Skipped {
            interface: name,
            method: None,
            issue: SpecIssue::InvalidBasePath {
                base_path: directives.base_path,
                reason,
            },
        });
        return;
    }

    let mut spec = InterfaceSpec {
        name,
        client_name: directives.client,
        // `/api/` and `/api` route identically; keep the form every route starts with.
        base_path: directives.base_path.trim_end_matches('/').to_string(),
        methods: Vec::new(),
    };

    for candidate in candidates {
        let built = candidate
            .outcome
            .and_then(build_method)
            .and_then(|method| check_unique(&spec, method));

        match built {
            Ok(method) => spec.methods.push(method),
            Err(issue) => out.skipped.push(Skipped {
                interface: spec.name.clone(),
                method: Some(candidate.name),
                issue,
            }),
        }
    }

    out.interfaces.push(spec);
}

fn validate_base_path(base_path: &str) -> Result<(), String> {
    if base_path.is_empty() {
        return Ok(());
    }
    let template = PathTemplate::parse(base_path).map_err(|err| err.to_string())?;
    if template.placeholders().next().is_some() {
        return Err("placeholders are not allowed in the base path".to_string());
    }
    Ok(())
}

fn check_unique(spec: &InterfaceSpec, method: MethodSpec) -> Result<MethodSpec, SpecIssue> {
    if RESERVED.contains(&method.name.as_str()) {
        return Err(SpecIssue::ReservedName(method.name));
    }

    let route = spec.route_for(&method);
    let shape = route_shape(&route);

    for other in &spec.methods {
        let other_route = spec.route_for(other);
        if other_route == route {
            if other.http_method == method.http_method {
                return Err(SpecIssue::DuplicateRoute {
                    method: method.http_method,
                    route,
                    existing: other.name.clone(),
                });
            }
        } else if route_shape(&other_route) == shape {
            return Err(SpecIssue::RouteConflict {
                route,
                other: other_route,
                existing: other.name.clone(),
            });
        }
    }

    Ok(method)
}

/// The route with every placeholder name erased: `/posts/{id}` -> `/posts/{}`.
fn route_shape(route: &str) -> String {
    match PathTemplate::parse(route) {
        Ok(template) => template
            .segments()
            .iter()
            .map(|segment| match segment {
                Segment::Literal(text) => *text,
                Segment::Placeholder(_) => "{}",
            })
            .collect(),
        Err(_) => route.to_string(),
    }
}

/// Validates one classified method and resolves its return shape.
pub fn build_method(method: ExtractedMethod) -> Result<MethodSpec, SpecIssue> {
    let template = PathTemplate::parse(&method.route.path)
        .map_err(|err| SpecIssue::MalformedRoute(err.to_string()))?;

    if let Some(name) = template
        .placeholders()
        .find(|name| !method.path_params.iter().any(|param| param.name == *name))
    {
        return Err(SpecIssue::UnboundPlaceholder {
            name: name.to_string(),
        });
    }

    for payload in &method.payloads {
        let type_name = typename::flatten(&payload.ty);
        if typename::integer_name(&payload.ty).is_some() || typename::is_string(&payload.ty) {
            return Err(SpecIssue::UnmatchedParameter {
                name: payload.name.clone(),
                type_name,
            });
        }
        if typename::is_primitive(&payload.ty) {
            return Err(SpecIssue::PrimitivePayload {
                name: payload.name.clone(),
                type_name,
            });
        }
    }

    let body = match method.payloads.as_slice() {
        [] => None,
        [payload] => {
            let (inner, by_ref) = typename::strip_reference(&payload.ty);
            Some(BodyParam {
                name: payload.name.clone(),
                type_name: typename::flatten(inner),
                by_ref,
            })
        }
        [first, second, ..] => {
            return Err(SpecIssue::MultiplePayloads {
                first: first.name.clone(),
                second: second.name.clone(),
            });
        }
    };

    let (returns, error_type) = resolve_return(method.output.as_ref(), method.is_async)?;

    Ok(MethodSpec {
        name: method.name,
        http_method: method.route.method,
        path: method.route.path,
        path_params: method.path_params,
        context_by_ref: method.context_by_ref,
        body,
        argument_order: method.argument_order,
        returns,
        error_type,
        summary: method.summary,
    })
}

/// Resolves the success shape and error type of a method signature.
///
/// `output` is the declared return type (`None` for `()`); for non-async
/// methods it must be `impl Future<Output = ..>` or
/// `Pin<Box<dyn Future<Output = ..>>>`.
pub fn resolve_return(
    output: Option<&Type>,
    is_async: bool,
) -> Result<(Option<ReturnSpec>, Option<String>), SpecIssue> {
    let declared = match (output, is_async) {
        (Some(ty), true) => ty,
        (Some(ty), false) => future_output(ty).ok_or(SpecIssue::NotAsync)?,
        (None, true) => {
            return Err(unsupported("()", "expected `Result<T, E>`"));
        }
        (None, false) => return Err(SpecIssue::NotAsync),
    };

    let Some(args) = typename::generic_args(declared, "Result") else {
        return Err(unsupported(&typename::flatten(declared), "expected `Result<T, E>`"));
    };
    let Some(success) = args.first() else {
        return Err(unsupported(
            &typename::flatten(declared),
            "the success type must be spelled out",
        ));
    };
    let error_type = args.get(1).map(|ty| typename::flatten(ty));

    Ok((classify_success(success)?, error_type))
}

fn classify_success(ty: &Type) -> Result<Option<ReturnSpec>, SpecIssue> {
    if typename::is_unit(ty) {
        return Ok(None);
    }
    if matches!(ty, Type::Reference(_)) {
        return Err(unsupported(&typename::flatten(ty), "references cannot be returned"));
    }

    let type_name = typename::flatten(ty);
    let (inner, shape) = if let Some(inner) = typename::single_arg(ty, "Option") {
        (inner, ReturnShape::Pointer)
    } else if let Some(inner) = typename::single_arg(ty, "Vec") {
        (inner, ReturnShape::Slice)
    } else {
        return Ok(Some(ReturnSpec {
            inner: type_name.clone(),
            type_name,
            shape: ReturnShape::Value,
        }));
    };

    if typename::single_arg(inner, "Option").is_some()
        || typename::single_arg(inner, "Vec").is_some()
    {
        return Err(unsupported(&type_name, "nested Option/Vec shapes are not supported"));
    }
    if typename::is_unit(inner) {
        return Err(unsupported(&type_name, "the element type cannot be `()`"));
    }

    Ok(Some(ReturnSpec {
        type_name,
        inner: typename::flatten(inner),
        shape,
    }))
}

/// `X` in `impl Future<Output = X>` or `Pin<Box<dyn Future<Output = X>>>`.
fn future_output(ty: &Type) -> Option<&Type> {
    let bounds = match ty {
        Type::ImplTrait(impl_trait) => &impl_trait.bounds,
        Type::TraitObject(object) => &object.bounds,
        _ => {
            let boxed = typename::single_arg(ty, "Pin")?;
            return future_output(typename::single_arg(boxed, "Box")?);
        }
    };

    bounds.iter().find_map(|bound| {
        let TypeParamBound::Trait(bound) = bound else {
            return None;
        };
        let segment = bound.path.segments.last()?;
        if segment.ident != "Future" {
            return None;
        }
        let PathArguments::AngleBracketed(args) = &segment.arguments else {
            return None;
        };
        args.args.iter().find_map(|arg| match arg {
            GenericArgument::AssocType(assoc) if assoc.ident == "Output" => Some(&assoc.ty),
            _ => None,
        })
    })
}

fn unsupported(type_name: &str, reason: &str) -> SpecIssue {
    SpecIssue::UnsupportedReturn {
        type_name: type_name.to_string(),
        reason: reason.to_string(),
    }
}
