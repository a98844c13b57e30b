//! Helpers for inspecting declared types.

use quote::ToTokens;
use syn::{GenericArgument, PathArguments, Type};

const INTEGERS: &[&str] = &[
    "i8", "i16", "i32", "i64", "i128", "isize", "u8", "u16", "u32", "u64", "usize",
];

const OTHER_PRIMITIVES: &[&str] = &["bool", "char", "f32", "f64", "str", "String"];

/// Canonical text of a type: `Vec < Post >` becomes `Vec<Post>`, commas keep
/// one following space.
pub fn flatten(ty: &Type) -> String {
    let raw = ty.to_token_stream().to_string();
    let mut out = String::with_capacity(raw.len());
    for token in raw.split_whitespace() {
        if needs_space(&out, token) {
            out.push(' ');
        }
        out.push_str(token);
    }
    out
}

fn needs_space(out: &str, next: &str) -> bool {
    let Some(last) = out.chars().last() else {
        return false;
    };
    let first = next.chars().next().unwrap_or(' ');
    if last == ',' {
        return true;
    }
    let word = |c: char| c.is_alphanumeric() || c == '_' || c == '\'';
    // `dyn Trait`, `impl Trait`, `&'a mut T`
    word(last) && word(first)
}

/// Removes one level of reference: `&T` / `&mut T` become `(T, true)`.
pub fn strip_reference(ty: &Type) -> (&Type, bool) {
    match ty {
        Type::Reference(reference) => (&reference.elem, true),
        Type::Paren(paren) => strip_reference(&paren.elem),
        other => (other, false),
    }
}

/// The single identifier of a bare path type (`i64`, `String`), if any.
fn bare_ident(ty: &Type) -> Option<String> {
    match ty {
        Type::Path(path) if path.qself.is_none() && path.path.segments.len() == 1 => {
            let segment = &path.path.segments[0];
            matches!(segment.arguments, PathArguments::None).then(|| segment.ident.to_string())
        }
        Type::Paren(paren) => bare_ident(&paren.elem),
        _ => None,
    }
}

/// Returns the integer type name when `ty` is a Rust integer primitive.
pub fn integer_name(ty: &Type) -> Option<String> {
    bare_ident(ty).filter(|ident| INTEGERS.contains(&ident.as_str()))
}

/// `true` for `String`, `&str` and `&String`.
pub fn is_string(ty: &Type) -> bool {
    let (inner, by_ref) = strip_reference(ty);
    match bare_ident(inner).as_deref() {
        Some("String") => true,
        Some("str") => by_ref,
        _ => false,
    }
}

/// `true` for integers, floats, `bool`, `char` and string types, with or
/// without a reference.
pub fn is_primitive(ty: &Type) -> bool {
    let (inner, _) = strip_reference(ty);
    bare_ident(inner).is_some_and(|ident| {
        INTEGERS.contains(&ident.as_str()) || OTHER_PRIMITIVES.contains(&ident.as_str())
    })
}

/// `true` for the unit type `()`.
pub fn is_unit(ty: &Type) -> bool {
    matches!(ty, Type::Tuple(tuple) if tuple.elems.is_empty())
}

/// Generic arguments of the last path segment when it is called `name`,
/// e.g. `generic_args(ty, "Result")` on `std::io::Result<T>`.
pub fn generic_args<'a>(ty: &'a Type, name: &str) -> Option<Vec<&'a Type>> {
    let Type::Path(path) = ty else {
        return None;
    };
    if path.qself.is_some() {
        return None;
    }
    let segment = path.path.segments.last()?;
    if segment.ident != name {
        return None;
    }
    match &segment.arguments {
        PathArguments::AngleBracketed(args) => Some(
            args.args
                .iter()
                .filter_map(|arg| match arg {
                    GenericArgument::Type(ty) => Some(ty),
                    _ => None,
                })
                .collect(),
        ),
        PathArguments::None => Some(Vec::new()),
        PathArguments::Parenthesized(_) => None,
    }
}

/// The single type argument of `name<T>`.
pub fn single_arg<'a>(ty: &'a Type, name: &str) -> Option<&'a Type> {
    match generic_args(ty, name)?.as_slice() {
        [inner] => Some(inner),
        _ => None,
    }
}
