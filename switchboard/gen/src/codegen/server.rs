//! axum dispatcher generation.
//!
//! Each contract becomes a `<Trait>Dispatcher<S>` holding the implementation
//! behind an `Arc`. `register` mounts one handler per routed method; the
//! handlers decode path parameters and the payload, call the implementation
//! and turn its result into a response.
//!
//! Handler arguments are passed inline (`params.integer::<i64>("id")?`) so a
//! contract parameter can never shadow a binding the handler relies on.

use proc_macro2::TokenStream;
use quote::{format_ident, quote};
use switchboard_define::{InterfaceSpec, MethodSpec, PrimitiveKind, ReturnShape};

use super::{Runtime, ident, method_docs, parse_type};
use crate::errors::GeneratorError;

/// Generates the dispatcher struct and its `impl` block for one contract.
///
/// ## Examples
///
/// For a trait `PostsService` with `@route GET /{id}` on `get_by_id`:
///
/// ```ignore
/// pub struct PostsServiceDispatcher<S> {
///     service: ::std::sync::Arc<S>,
///     middleware: ::std::vec::Vec<::switchboard::server::Middleware>,
/// }
///
/// impl<S> PostsServiceDispatcher<S>
/// where
///     S: PostsService + Send + Sync + 'static,
/// {
///     pub fn register(&self, router: Router) -> Router {
///         let routes: Router = Router::<Arc<S>>::new()
///             .route("/api/posts/{id}", routing::get(Self::handle_get_by_id))
///             .with_state(Arc::clone(&self.service));
///         router.merge(apply_middleware(routes, &self.middleware))
///     }
///
///     async fn handle_get_by_id(State(service): State<Arc<S>>, ctx: Context, params: PathParams)
///         -> Result<Response, ApiError> { .. }
/// }
/// ```
///
/// ## Errors
///
/// Returns [`GeneratorError::CodeGen`] if a type recorded in the IR cannot be
/// re-parsed.
pub fn generate_server(
    spec: &InterfaceSpec,
    runtime: &Runtime,
) -> Result<TokenStream, GeneratorError> {
    let contract = format_ident!("{}", spec.name);
    let dispatcher = format_ident!("{}Dispatcher", spec.name);
    let base_path = &spec.base_path;
    let struct_doc = format!(" Serves [`{}`] implementations over HTTP.", spec.name);

    let routes = route_table(spec).into_iter().map(|(route, methods)| {
        let mut chain = methods.iter().map(|method| {
            let verb = format_ident!("{}", method.http_method.as_lowercase());
            let handler = handler_name(method);
            (verb, handler)
        });
        let first = chain.next().map(|(verb, handler)| {
            quote!(#runtime::server::routing::#verb(Self::#handler))
        });
        let rest = chain.map(|(verb, handler)| quote!(.#verb(Self::#handler)));
        quote!(.route(#route, #first #(#rest)*))
    });

    let handlers = spec
        .methods
        .iter()
        .map(|method| generate_handler(spec, method, runtime))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(quote! {
        #[doc = #struct_doc]
        pub struct #dispatcher<S> {
            service: ::std::sync::Arc<S>,
            middleware: ::std::vec::Vec<#runtime::server::Middleware>,
        }

        impl<S> #dispatcher<S>
        where
            S: #contract + ::std::marker::Send + ::std::marker::Sync + 'static,
        {
            /// Route prefix shared by every handler of this dispatcher.
            pub const BASE_PATH: &'static str = #base_path;

            pub fn new(service: S) -> Self {
                Self::from_arc(::std::sync::Arc::new(service))
            }

            /// Serves an implementation that is already shared.
            pub fn from_arc(service: ::std::sync::Arc<S>) -> Self {
                Self {
                    service,
                    middleware: ::std::vec::Vec::new(),
                }
            }

            /// Appends a middleware; the first one attached runs outermost.
            pub fn with_middleware(mut self, middleware: #runtime::server::Middleware) -> Self {
                self.middleware.push(middleware);
                self
            }

            /// Mounts every route of the contract onto `router`.
            pub fn register(&self, router: #runtime::server::Router) -> #runtime::server::Router {
                let routes: #runtime::server::Router =
                    #runtime::server::Router::<::std::sync::Arc<S>>::new()
                        #(#routes)*
                        .with_state(::std::sync::Arc::clone(&self.service));
                router.merge(#runtime::server::apply_middleware(routes, &self.middleware))
            }

            #(#handlers)*
        }
    })
}

/// Routes grouped by template in order of first appearance.
fn route_table(spec: &InterfaceSpec) -> Vec<(String, Vec<&MethodSpec>)> {
    let mut table: Vec<(String, Vec<&MethodSpec>)> = Vec::new();
    for method in &spec.methods {
        let route = spec.route_for(method);
        match table.iter_mut().find(|(existing, _)| *existing == route) {
            Some((_, methods)) => methods.push(method),
            None => table.push((route, vec![method])),
        }
    }
    table
}

fn handler_name(method: &MethodSpec) -> proc_macro2::Ident {
    format_ident!("handle_{}", method.name.trim_start_matches("r#"))
}

fn generate_handler(
    spec: &InterfaceSpec,
    method: &MethodSpec,
    runtime: &Runtime,
) -> Result<TokenStream, GeneratorError> {
    let handler = handler_name(method);
    let target = ident(&method.name);
    let docs = method_docs(spec, method);

    let params_extractor = (!method.path_params.is_empty())
        .then(|| quote!(params: #runtime::server::PathParams,));
    let body_extractor = match &method.body {
        Some(body) => {
            let ty = parse_type(&body.type_name)?;
            Some(quote!(#runtime::server::Payload(body): #runtime::server::Payload<#ty>,))
        }
        None => None,
    };

    let context = if method.context_by_ref {
        quote!(&ctx)
    } else {
        quote!(ctx)
    };
    let arguments = method
        .argument_order
        .iter()
        .map(|name| argument(method, name))
        .collect::<Result<Vec<_>, _>>()?;

    let call = quote! {
        service
            .#target(#context #(, #arguments)*)
            .await
            .map_err(#runtime::ApiError::from)?
    };

    let respond = match &method.returns {
        None => quote! {
            #call;
            #runtime::server::no_content()
        },
        Some(ret) if ret.shape == ReturnShape::Pointer => quote! {
            let value = #call;
            #runtime::server::optional(value)
        },
        Some(_) => quote! {
            let value = #call;
            #runtime::server::json(value)
        },
    };

    Ok(quote! {
        #docs
        async fn #handler(
            #runtime::server::State(service): #runtime::server::State<::std::sync::Arc<S>>,
            ctx: #runtime::Context,
            #params_extractor
            #body_extractor
        ) -> ::std::result::Result<#runtime::server::Response, #runtime::ApiError> {
            #respond
        }
    })
}

/// The expression passed to the implementation for argument `name`.
fn argument(method: &MethodSpec, name: &str) -> Result<TokenStream, GeneratorError> {
    if let Some(param) = method.path_param(name) {
        let key = &param.name;
        return Ok(match (param.kind, param.by_ref) {
            (PrimitiveKind::Integer, _) => {
                let ty = parse_type(&param.type_name)?;
                quote!(params.integer::<#ty>(#key)?)
            }
            (PrimitiveKind::String, true) => quote!(&params.string(#key)?),
            (PrimitiveKind::String, false) => quote!(params.string(#key)?),
        });
    }

    match &method.body {
        Some(body) if body.name == name => Ok(if body.by_ref {
            quote!(&body)
        } else {
            quote!(body)
        }),
        _ => Err(GeneratorError::CodeGen(format!(
            "`{}` lists argument `{name}` that is neither a path parameter nor the payload",
            method.name
        ))),
    }
}

#[cfg(test)]
mod tests {
    use switchboard_define::{HttpMethod, PathParam};

    use super::*;
    use crate::test_utils::{
        make_method, make_posts_spec, pretty, squash, with_body, with_path_param,
    };

    fn server_code(spec: &InterfaceSpec) -> String {
        pretty(generate_server(spec, &Runtime::default()).unwrap())
    }

    fn server_tokens(spec: &InterfaceSpec) -> String {
        squash(&generate_server(spec, &Runtime::default()).unwrap().to_string())
    }

    #[test]
    fn generates_dispatcher_surface() {
        let code = server_code(&make_posts_spec());

        assert!(code.contains("pub struct PostsServiceDispatcher<S>"));
        assert!(code.contains("service: ::std::sync::Arc<S>"));
        assert!(
            code.contains("S: PostsService + ::std::marker::Send + ::std::marker::Sync + 'static")
        );
        assert!(code.contains("pub fn new(service: S) -> Self"));
        assert!(code.contains("pub fn from_arc(service: ::std::sync::Arc<S>) -> Self"));
        assert!(code.contains("pub fn with_middleware("));
        assert!(code.contains("pub fn register("));
        assert!(code.contains("/// Serves [`PostsService`] implementations over HTTP."));
    }

    #[test]
    fn verbs_sharing_a_route_are_chained() {
        let code = server_tokens(&make_posts_spec());
        assert!(code.contains(&squash(
            ".route(\"/api/posts/{id}\", ::switchboard::server::routing::get(Self::handle_get_by_id).delete(Self::handle_delete))"
        )));
        assert!(code.contains(&squash(
            ".route(\"/api/posts\", ::switchboard::server::routing::get(Self::handle_list).post(Self::handle_create))"
        )));
        assert!(code.contains(&squash(
            ".route(\"/api/posts/users/{user_id}/posts/{post_id}\", ::switchboard::server::routing::get(Self::handle_get_user_post))"
        )));
    }

    #[test]
    fn routes_keep_first_appearance_order() {
        let code = server_tokens(&make_posts_spec());
        let by_id = code.find("\"/api/posts/{id}\"").unwrap();
        let root = code.find("\"/api/posts\",").unwrap();
        let nested = code.find("\"/api/posts/users/").unwrap();
        assert!(by_id < root && root < nested);
    }

    #[test]
    fn middleware_and_state_are_applied() {
        let code = server_tokens(&make_posts_spec());
        assert!(code.contains(&squash(
            ".with_state(::std::sync::Arc::clone(&self.service))"
        )));
        assert!(code.contains(&squash(
            "router.merge(::switchboard::server::apply_middleware(routes, &self.middleware))"
        )));
    }

    #[test]
    fn pointer_handler_decodes_by_name() {
        let code = server_tokens(&make_posts_spec());
        assert!(code.contains(&squash(
            "async fn handle_get_user_post(::switchboard::server::State(service): ::switchboard::server::State<::std::sync::Arc<S>>, ctx: ::switchboard::Context, params: ::switchboard::server::PathParams,)"
        )));
        assert!(code.contains(&squash(
            "service.get_user_post(ctx, params.integer::<i64>(\"post_id\")?, params.integer::<u32>(\"user_id\")?).await.map_err(::switchboard::ApiError::from)?"
        )));
        assert!(code.contains(&squash("::switchboard::server::optional(value)")));
    }

    #[test]
    fn payload_handler_passes_context_by_reference() {
        let code = server_tokens(&make_posts_spec());
        assert!(code.contains(&squash(
            "::switchboard::server::Payload(body): ::switchboard::server::Payload<NewPost>,"
        )));
        assert!(code.contains(&squash("service.create(&ctx, body)")));
        assert!(code.contains(&squash("::switchboard::server::json(value)")));
    }

    #[test]
    fn unit_handler_returns_no_content() {
        let code = server_tokens(&make_posts_spec());
        assert!(code.contains(&squash(
            "service.delete(ctx, params.integer::<i64>(\"id\")?).await.map_err(::switchboard::ApiError::from)?; ::switchboard::server::no_content()"
        )));
    }

    #[test]
    fn borrowed_arguments() {
        let method = with_body(
            with_path_param(
                make_method("rename", HttpMethod::Put, "/tags/{slug}"),
                PathParam {
                    name: "slug".to_string(),
                    kind: PrimitiveKind::String,
                    type_name: "str".to_string(),
                    by_ref: true,
                },
            ),
            "tag",
            "Tag",
            true,
        );
        let spec = InterfaceSpec {
            name: "Tags".to_string(),
            client_name: "TagsClient".to_string(),
            base_path: String::new(),
            methods: vec![method],
        };
        let code = server_tokens(&spec);
        assert!(code.contains(&squash("service.rename(ctx, &params.string(\"slug\")?, &body)")));
        assert!(code.contains(&squash(
            ".route(\"/tags/{slug}\", ::switchboard::server::routing::put(Self::handle_rename))"
        )));
    }

    #[test]
    fn generated_dispatcher_parses() {
        let tokens = generate_server(&make_posts_spec(), &Runtime::default()).unwrap();
        let file: syn::File = syn::parse2(tokens).unwrap();
        let handlers = file
            .items
            .iter()
            .filter_map(|item| match item {
                syn::Item::Impl(block) => Some(block),
                _ => None,
            })
            .flat_map(|block| block.items.iter())
            .filter(|item| {
                matches!(item, syn::ImplItem::Fn(f) if f.sig.ident.to_string().starts_with("handle_"))
            })
            .count();
        assert_eq!(handlers, 5);
    }
}
