//! Code generation for routed contracts.
//!
//! Both emitters are pure functions of the route IR:
//!
//! - [`client`] - one `<ClientName>` struct per contract, one async method per
//!   routed method, all requests going through `Transport`
//! - [`server`] - one `<Trait>Dispatcher<S>` per contract that registers an
//!   axum handler for every routed method
//!
//! Route text in both artifacts comes from [`InterfaceSpec::route_for`], so a
//! client and a dispatcher generated from the same contract always agree.
//!
//! ## Output Format
//!
//! All generators return `proc_macro2::TokenStream`. See [`crate::output`]
//! for validation, formatting and file writing.

pub mod client;
pub mod server;

use std::fmt;

use proc_macro2::{Ident, Span, TokenStream};
use quote::{ToTokens, quote};
use switchboard_define::{HttpMethod, InterfaceSpec, MethodSpec};
use syn::Type;

use crate::errors::GeneratorError;

pub use client::generate_client;
pub use server::generate_server;

/// Path of the runtime crate as referenced from generated code.
#[derive(Clone, PartialEq, Eq)]
pub struct Runtime(syn::Path);

impl Runtime {
    /// Parses a path such as `::switchboard` or `crate::rpc`.
    ///
    /// ## Errors
    ///
    /// Returns [`GeneratorError::Config`] when `path` is not a Rust path.
    pub fn parse(path: &str) -> Result<Self, GeneratorError> {
        syn::parse_str::<syn::Path>(path)
            .map(Self)
            .map_err(|err| GeneratorError::Config(format!("runtime path {path:?}: {err}")))
    }
}

impl Default for Runtime {
    fn default() -> Self {
        Self(syn::parse_quote!(::switchboard))
    }
}

impl ToTokens for Runtime {
    fn to_tokens(&self, tokens: &mut TokenStream) {
        self.0.to_tokens(tokens);
    }
}

impl fmt::Debug for Runtime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Runtime({})", self.0.to_token_stream())
    }
}

/// An identifier as written in source, raw identifiers included.
pub(crate) fn ident(name: &str) -> Ident {
    match name.strip_prefix("r#") {
        Some(raw) => Ident::new_raw(raw, Span::call_site()),
        None => Ident::new(name, Span::call_site()),
    }
}

/// Re-parses a type name recorded in the IR.
pub(crate) fn parse_type(type_name: &str) -> Result<Type, GeneratorError> {
    syn::parse_str(type_name)
        .map_err(|err| GeneratorError::CodeGen(format!("cannot emit type `{type_name}`: {err}")))
}

/// `<runtime>::HttpMethod::<Verb>`.
pub(crate) fn verb(runtime: &Runtime, method: HttpMethod) -> TokenStream {
    let variant = match method {
        HttpMethod::Get => quote!(Get),
        HttpMethod::Post => quote!(Post),
        HttpMethod::Put => quote!(Put),
        HttpMethod::Delete => quote!(Delete),
        HttpMethod::Patch => quote!(Patch),
    };
    quote!(#runtime::HttpMethod::#variant)
}

/// Doc attributes for a generated method: the contract's summary, then the
/// route it serves.
pub(crate) fn method_docs(spec: &InterfaceSpec, method: &MethodSpec) -> TokenStream {
    let route = format!(" `{} {}`", method.http_method, spec.route_for(method));
    match &method.summary {
        Some(summary) => {
            let summary = format!(" {summary}");
            quote! {
                #[doc = #summary]
                #[doc = ""]
                #[doc = #route]
            }
        }
        None => quote!(#[doc = #route]),
    }
}
