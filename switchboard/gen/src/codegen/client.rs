//! HTTP client generation.
//!
//! Each contract becomes a struct wrapping the runtime `Transport`, with one
//! async method per routed method. The context parameter is dropped from the
//! client signature; the remaining parameters keep their declaration order.

use proc_macro2::TokenStream;
use quote::{format_ident, quote};
use switchboard_define::{InterfaceSpec, MethodSpec, PrimitiveKind, ReturnShape};

use super::{Runtime, ident, method_docs, parse_type, verb};
use crate::errors::GeneratorError;

/// Generates the client struct and its `impl` block for one contract.
///
/// ## Examples
///
/// For `@client PostsClient` with `@route GET /{id}` on `get_by_id`:
///
/// ```ignore
/// #[derive(Debug, Clone)]
/// pub struct PostsClient {
///     transport: ::switchboard::client::Transport,
/// }
///
/// impl PostsClient {
///     pub const BASE_PATH: &'static str = "/api/posts";
///
///     pub fn new(options: ::switchboard::client::ClientOptions)
///         -> ::std::result::Result<Self, ::switchboard::ClientError> { .. }
///
///     pub async fn get_by_id(&self, id: i64)
///         -> ::std::result::Result<Option<Post>, ::switchboard::ClientError> { .. }
/// }
/// ```
///
/// ## Errors
///
/// Returns [`GeneratorError::CodeGen`] if a type recorded in the IR cannot be
/// re-parsed.
pub fn generate_client(
    spec: &InterfaceSpec,
    runtime: &Runtime,
) -> Result<TokenStream, GeneratorError> {
    let client = format_ident!("{}", spec.client_name);
    let base_path = &spec.base_path;
    let struct_doc = format!(" HTTP client for [`{}`].", spec.name);

    let methods = spec
        .methods
        .iter()
        .map(|method| generate_method(spec, method, runtime))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(quote! {
        #[doc = #struct_doc]
        #[derive(Debug, Clone)]
        pub struct #client {
            transport: #runtime::client::Transport,
        }

        impl #client {
            /// Route prefix shared by every method of this client.
            pub const BASE_PATH: &'static str = #base_path;

            /// Creates a client; routes are resolved against `options`' base URL.
            ///
            /// Fails only when the underlying HTTP client cannot be built.
            pub fn new(
                options: #runtime::client::ClientOptions,
            ) -> ::std::result::Result<Self, #runtime::ClientError> {
                ::std::result::Result::Ok(Self {
                    transport: #runtime::client::Transport::new(options, Self::BASE_PATH)?,
                })
            }

            #(#methods)*
        }
    })
}

fn generate_method(
    spec: &InterfaceSpec,
    method: &MethodSpec,
    runtime: &Runtime,
) -> Result<TokenStream, GeneratorError> {
    let name = ident(&method.name);
    let docs = method_docs(spec, method);
    let params = parameters(method)?;
    let return_type = return_type(method)?;

    let route = spec.route_for(method);
    let values = method.path_params.iter().map(|param| {
        let key = &param.name;
        let value = ident(&param.name);
        quote!((#key, #runtime::path::PathValue::from(#value)))
    });
    let path = quote!(&#runtime::path::render(#route, &[#(#values),*])?);

    let body = match &method.body {
        Some(body) => {
            let value = ident(&body.name);
            let reference = if body.by_ref { quote!() } else { quote!(&) };
            quote!(::std::option::Option::Some(#runtime::client::encode(#reference #value)?))
        }
        None => quote!(::std::option::Option::None),
    };

    let verb = verb(runtime, method.http_method);
    let call = match &method.returns {
        None => quote! {
            self.transport.execute(#verb, #path, #body).await
        },
        Some(ret) if ret.shape == ReturnShape::Pointer => {
            let inner = parse_type(&ret.inner)?;
            quote! {
                match self.transport.fetch::<#inner>(#verb, #path, #body).await {
                    ::std::result::Result::Ok(value) => {
                        ::std::result::Result::Ok(::std::option::Option::Some(value))
                    }
                    ::std::result::Result::Err(err) if err.is_not_found() => {
                        ::std::result::Result::Ok(::std::option::Option::None)
                    }
                    ::std::result::Result::Err(err) => ::std::result::Result::Err(err),
                }
            }
        }
        Some(ret) => {
            let ty = parse_type(&ret.type_name)?;
            quote! {
                self.transport.fetch::<#ty>(#verb, #path, #body).await
            }
        }
    };

    Ok(quote! {
        #docs
        pub async fn #name(&self #(, #params)*) -> ::std::result::Result<#return_type, #runtime::ClientError> {
            #call
        }
    })
}

/// Client parameters in declaration order: integers keep their type, strings
/// are taken as `&str`, the payload keeps its declared form.
fn parameters(method: &MethodSpec) -> Result<Vec<TokenStream>, GeneratorError> {
    method
        .argument_order
        .iter()
        .map(|name| {
            let arg = ident(name);
            if let Some(param) = method.path_param(name) {
                return Ok(match param.kind {
                    PrimitiveKind::Integer => {
                        let ty = parse_type(&param.type_name)?;
                        quote!(#arg: #ty)
                    }
                    PrimitiveKind::String => quote!(#arg: &str),
                });
            }

            match &method.body {
                Some(body) if body.name == *name => {
                    let ty = parse_type(&body.type_name)?;
                    Ok(if body.by_ref {
                        quote!(#arg: &#ty)
                    } else {
                        quote!(#arg: #ty)
                    })
                }
                _ => Err(GeneratorError::CodeGen(format!(
                    "`{}` lists argument `{name}` that is neither a path parameter nor the payload",
                    method.name
                ))),
            }
        })
        .collect()
}

fn return_type(method: &MethodSpec) -> Result<TokenStream, GeneratorError> {
    match &method.returns {
        None => Ok(quote!(())),
        Some(ret) if ret.shape == ReturnShape::Pointer => {
            let inner = parse_type(&ret.inner)?;
            Ok(quote!(::std::option::Option<#inner>))
        }
        Some(ret) => {
            let ty = parse_type(&ret.type_name)?;
            Ok(quote!(#ty))
        }
    }
}

#[cfg(test)]
mod tests {
    use switchboard_define::{HttpMethod, PathParam};

    use super::*;
    use crate::test_utils::{make_method, make_posts_spec, pretty, squash, with_path_param};

    fn client_code(spec: &InterfaceSpec) -> String {
        pretty(generate_client(spec, &Runtime::default()).unwrap())
    }

    /// Token text without whitespace; unaffected by line wrapping.
    fn client_tokens(spec: &InterfaceSpec) -> String {
        squash(&generate_client(spec, &Runtime::default()).unwrap().to_string())
    }

    #[test]
    fn generates_struct_and_constructor() {
        let code = client_code(&make_posts_spec());

        assert!(code.contains("#[derive(Debug, Clone)]"));
        assert!(code.contains("pub struct PostsClient"));
        assert!(code.contains("transport: ::switchboard::client::Transport"));
        assert!(code.contains(r#"pub const BASE_PATH: &'static str = "/api/posts";"#));

        let tokens = client_tokens(&make_posts_spec());
        assert!(tokens.contains(&squash(
            "pub fn new(options: ::switchboard::client::ClientOptions) \
             -> ::std::result::Result<Self, ::switchboard::ClientError>"
        )));
        assert!(tokens.contains(&squash(
            "::switchboard::client::Transport::new(options, Self::BASE_PATH)?"
        )));
    }

    #[test]
    fn pointer_returns_map_not_found_to_none() {
        let code = client_tokens(&make_posts_spec());

        assert!(code.contains(&squash(
            "pub async fn get_by_id(&self, id: i64) -> ::std::result::Result<::std::option::Option<Post>, ::switchboard::ClientError>"
        )));
        assert!(code.contains(&squash(
            "self.transport.fetch::<Post>(::switchboard::HttpMethod::Get, &::switchboard::path::render(\"/api/posts/{id}\", &[(\"id\", ::switchboard::path::PathValue::from(id))])?, ::std::option::Option::None).await"
        )));
        assert!(code.contains(&squash("::std::result::Result::Err(err) if err.is_not_found()")));
    }

    #[test]
    fn unit_returns_use_execute() {
        let code = client_tokens(&make_posts_spec());
        assert!(code.contains(&squash(
            "pub async fn delete(&self, id: i64) -> ::std::result::Result<(), ::switchboard::ClientError>"
        )));
        assert!(code.contains(&squash(
            "self.transport.execute(::switchboard::HttpMethod::Delete, &::switchboard::path::render(\"/api/posts/{id}\""
        )));
    }

    #[test]
    fn payload_is_encoded_as_json() {
        let code = client_tokens(&make_posts_spec());
        assert!(code.contains(&squash("pub async fn create(&self, post: NewPost)")));
        assert!(code.contains(&squash(
            "::std::option::Option::Some(::switchboard::client::encode(&post)?)"
        )));
        assert!(code.contains(&squash(
            "self.transport.fetch::<Post>(::switchboard::HttpMethod::Post"
        )));
    }

    #[test]
    fn slices_fetch_the_declared_vec() {
        let code = client_tokens(&make_posts_spec());
        assert!(code.contains(&squash(
            "self.transport.fetch::<Vec<Post>>(::switchboard::HttpMethod::Get"
        )));
        assert!(code.contains(&squash("&::switchboard::path::render(\"/api/posts\", &[])?")));
    }

    #[test]
    fn values_bind_by_name_in_declaration_order() {
        let code = client_tokens(&make_posts_spec());
        assert!(code.contains(&squash(
            "pub async fn get_user_post(&self, post_id: i64, user_id: u32)"
        )));
        assert!(code.contains(&squash(
            "render(\"/api/posts/users/{user_id}/posts/{post_id}\", &[(\"post_id\", ::switchboard::path::PathValue::from(post_id)), (\"user_id\", ::switchboard::path::PathValue::from(user_id))])"
        )));
    }

    #[test]
    fn string_params_are_borrowed() {
        let spec = InterfaceSpec {
            name: "Tags".to_string(),
            client_name: "TagsClient".to_string(),
            base_path: String::new(),
            methods: vec![with_path_param(
                make_method("remove", HttpMethod::Delete, "/tags/{slug}"),
                PathParam::string("slug"),
            )],
        };
        let code = client_tokens(&spec);
        assert!(code.contains(&squash("pub async fn remove(&self, slug: &str)")));
        assert!(code.contains(&squash(r#"pub const BASE_PATH: &'static str = "";"#)));
    }

    #[test]
    fn summaries_become_docs() {
        let code = client_code(&make_posts_spec());
        assert!(code.contains("/// Fetches one post."));
        assert!(code.contains("/// `GET /api/posts/{id}`"));
        assert!(code.contains("/// HTTP client for [`PostsService`]."));
    }

    #[test]
    fn custom_runtime_path() {
        let runtime = Runtime::parse("crate::rpc").unwrap();
        let code = pretty(generate_client(&make_posts_spec(), &runtime).unwrap());
        assert!(code.contains("crate::rpc::client::Transport"));
        assert!(!code.contains("::switchboard::"));
    }

    #[test]
    fn unknown_argument_is_a_codegen_error() {
        let mut method = make_method("broken", HttpMethod::Get, "/");
        method.argument_order.push("ghost".to_string());
        let spec = InterfaceSpec {
            name: "T".to_string(),
            client_name: "C".to_string(),
            base_path: String::new(),
            methods: vec![method],
        };
        assert!(matches!(
            generate_client(&spec, &Runtime::default()),
            Err(GeneratorError::CodeGen(_))
        ));
    }
}
