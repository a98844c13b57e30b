//! Shared fixtures for switchboard-gen unit tests.

use proc_macro2::TokenStream;
use switchboard_define::{
    BodyParam, HttpMethod, InterfaceSpec, MethodSpec, PathParam, ReturnShape, ReturnSpec,
};

/// A routed method with no parameters and no return value.
pub fn make_method(name: &str, verb: HttpMethod, path: &str) -> MethodSpec {
    MethodSpec {
        name: name.to_string(),
        http_method: verb,
        path: path.to_string(),
        path_params: vec![],
        context_by_ref: false,
        body: None,
        argument_order: vec![],
        returns: None,
        error_type: Some("BlogError".to_string()),
        summary: None,
    }
}

pub fn with_path_param(mut method: MethodSpec, param: PathParam) -> MethodSpec {
    method.argument_order.push(param.name.clone());
    method.path_params.push(param);
    method
}

pub fn with_body(mut method: MethodSpec, name: &str, type_name: &str, by_ref: bool) -> MethodSpec {
    method.argument_order.push(name.to_string());
    method.body = Some(BodyParam {
        name: name.to_string(),
        type_name: type_name.to_string(),
        by_ref,
    });
    method
}

pub fn returning(
    mut method: MethodSpec,
    type_name: &str,
    inner: &str,
    shape: ReturnShape,
) -> MethodSpec {
    method.returns = Some(ReturnSpec {
        type_name: type_name.to_string(),
        inner: inner.to_string(),
        shape,
    });
    method
}

/// The posts contract used throughout the emitter tests:
///
/// - `GET /api/posts/{id}` -> `Option<Post>`
/// - `GET /api/posts` -> `Vec<Post>`
/// - `POST /api/posts` with a `NewPost` payload -> `Post`
/// - `DELETE /api/posts/{id}` -> `()`
/// - `GET /api/posts/users/{user_id}/posts/{post_id}`, parameters declared
///   `(post_id, user_id)`
pub fn make_posts_spec() -> InterfaceSpec {
    let mut get_by_id = returning(
        with_path_param(
            make_method("get_by_id", HttpMethod::Get, "/{id}"),
            PathParam::integer("id", "i64"),
        ),
        "Option<Post>",
        "Post",
        ReturnShape::Pointer,
    );
    get_by_id.summary = Some("Fetches one post.".to_string());

    let list = returning(
        make_method("list", HttpMethod::Get, "/"),
        "Vec<Post>",
        "Post",
        ReturnShape::Slice,
    );

    let mut create = returning(
        with_body(make_method("create", HttpMethod::Post, "/"), "post", "NewPost", false),
        "Post",
        "Post",
        ReturnShape::Value,
    );
    create.context_by_ref = true;

    let delete = with_path_param(
        make_method("delete", HttpMethod::Delete, "/{id}"),
        PathParam::integer("id", "i64"),
    );

    let get_user_post = returning(
        with_path_param(
            with_path_param(
                make_method(
                    "get_user_post",
                    HttpMethod::Get,
                    "/users/{user_id}/posts/{post_id}",
                ),
                PathParam::integer("post_id", "i64"),
            ),
            PathParam::integer("user_id", "u32"),
        ),
        "Option<Post>",
        "Post",
        ReturnShape::Pointer,
    );

    InterfaceSpec {
        name: "PostsService".to_string(),
        client_name: "PostsClient".to_string(),
        base_path: "/api/posts".to_string(),
        methods: vec![get_by_id, list, create, delete, get_user_post],
    }
}

/// Formats tokens the way the generator writes them.
pub fn pretty(tokens: TokenStream) -> String {
    let file: syn::File = syn::parse2(tokens).expect("generated tokens should parse");
    prettyplease::unparse(&file)
}

/// Removes all whitespace, for layout-independent comparisons.
pub fn squash(code: &str) -> String {
    code.chars().filter(|c| !c.is_whitespace()).collect()
}
