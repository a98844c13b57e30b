//! Output assembly and file writing for generated code.
//!
//! Every source file with at least one contract produces two artifacts next
//! to it:
//!
//! ```text
//! src/
//! ├── posts.rs               # declares `PostsService` with @client / @route
//! ├── posts_client_gen.rs    # PostsClient
//! └── posts_server_gen.rs    # PostsServiceDispatcher<S>
//! ```
//!
//! Generated files start with `use super::*;` and are mounted as child
//! modules of the module that declares the contract:
//!
//! ```rust,ignore
//! #[path = "posts_client_gen.rs"]
//! pub mod client;
//! ```
//!
//! ## Safety Guarantees
//!
//! - **Validation**: All generated code is validated with `syn` before writing
//! - **Formatting**: Output is formatted with `prettyplease` for consistent style
//! - **Atomic writes**: Uses temp file + rename so a reader never sees a
//!   partially written file

use std::fs;
use std::path::{Path, PathBuf};

use proc_macro2::TokenStream;
use quote::quote;
use switchboard_define::InterfaceSpec;

use crate::codegen::{Runtime, generate_client, generate_server};
use crate::errors::GeneratorError;

/// First line of every generated file.
pub const HEADER: &str =
    "// This code was automatically generated by switchboard-gen. Do not edit manually.";

/// Which half of a contract an artifact implements.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactKind {
    Client,
    Server,
}

/// Assembles the client file for every contract declared in `source_name`.
///
/// ## Errors
///
/// Propagates [`GeneratorError::CodeGen`] from the emitter.
pub fn assemble_client(
    source_name: &str,
    specs: &[InterfaceSpec],
    runtime: &Runtime,
) -> Result<TokenStream, GeneratorError> {
    let clients = specs
        .iter()
        .map(|spec| generate_client(spec, runtime))
        .collect::<Result<Vec<_>, _>>()?;
    let doc = format!(" HTTP clients for the contracts declared in `{source_name}`.");

    Ok(quote! {
        #![doc = #doc]

        #[allow(unused_imports)]
        use super::*;

        #(#clients)*
    })
}

/// Assembles the server file for every contract declared in `source_name`.
///
/// ## Errors
///
/// Propagates [`GeneratorError::CodeGen`] from the emitter.
pub fn assemble_server(
    source_name: &str,
    specs: &[InterfaceSpec],
    runtime: &Runtime,
) -> Result<TokenStream, GeneratorError> {
    let dispatchers = specs
        .iter()
        .map(|spec| generate_server(spec, runtime))
        .collect::<Result<Vec<_>, _>>()?;
    let doc = format!(" axum dispatchers for the contracts declared in `{source_name}`.");

    Ok(quote! {
        #![doc = #doc]

        #[allow(unused_imports)]
        use super::*;

        #(#dispatchers)*
    })
}

/// Validates generated code using syn.
///
/// ## Errors
///
/// Returns `GeneratorError::CodeGen` if the tokens do not form a Rust file.
pub fn validate_code(tokens: TokenStream) -> Result<syn::File, GeneratorError> {
    syn::parse2(tokens)
        .map_err(|e| GeneratorError::CodeGen(format!("generated code is invalid: {e}")))
}

/// Formats generated code using prettyplease, prefixed with [`HEADER`].
pub fn format_code(file: &syn::File) -> String {
    format!("{HEADER}\n\n{}", prettyplease::unparse(file))
}

/// Validates and formats one artifact.
///
/// ## Errors
///
/// Returns `GeneratorError::CodeGen` if emission fails or produces invalid
/// Rust.
pub fn render(
    kind: ArtifactKind,
    source_name: &str,
    specs: &[InterfaceSpec],
    runtime: &Runtime,
) -> Result<String, GeneratorError> {
    let tokens = match kind {
        ArtifactKind::Client => assemble_client(source_name, specs, runtime)?,
        ArtifactKind::Server => assemble_server(source_name, specs, runtime)?,
    };
    Ok(format_code(&validate_code(tokens)?))
}

/// `<dir>/<stem><suffix>.rs` for a source file at `<dir>/<stem>.rs`.
pub fn output_path(source: &Path, suffix: &str) -> PathBuf {
    let stem = source
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default();
    source.with_file_name(format!("{stem}{suffix}.rs"))
}

/// Writes `content` next to `path` as `<path>.tmp` and returns the temp path.
/// Nothing at `path` itself changes until [`commit`].
///
/// ## Errors
///
/// Returns `GeneratorError::Write` if the parent directory cannot be created
/// or the temp file cannot be written.
pub fn stage(path: &Path, content: &str) -> Result<PathBuf, GeneratorError> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).map_err(|source| GeneratorError::Write {
            path: parent.to_path_buf(),
            source,
        })?;
    }

    let temp_path = path.with_extension("rs.tmp");
    fs::write(&temp_path, content).map_err(|source| GeneratorError::Write {
        path: temp_path.clone(),
        source,
    })?;
    Ok(temp_path)
}

/// Moves a staged temp file over `path`.
///
/// ## Errors
///
/// Returns `GeneratorError::Write` if the rename fails; the temp file is
/// removed in that case.
pub fn commit(temp_path: &Path, path: &Path) -> Result<(), GeneratorError> {
    fs::rename(temp_path, path).map_err(|source| {
        // Best effort; the rename error is the one worth reporting.
        let _ = fs::remove_file(temp_path);
        GeneratorError::Write {
            path: path.to_path_buf(),
            source,
        }
    })
}

/// Writes content to a file atomically using temp file + rename.
///
/// ## Errors
///
/// Returns `GeneratorError::Write` if the parent directory cannot be created,
/// the temp file cannot be written, or the rename fails.
pub fn write_atomic(path: &Path, content: &str) -> Result<(), GeneratorError> {
    let temp_path = stage(path, content)?;
    commit(&temp_path, path)
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;
    use crate::test_utils::make_posts_spec;

    fn posts_code(kind: ArtifactKind) -> String {
        render(kind, "posts.rs", &[make_posts_spec()], &Runtime::default()).unwrap()
    }

    #[test]
    fn generated_files_start_with_header() {
        for kind in [ArtifactKind::Client, ArtifactKind::Server] {
            let code = posts_code(kind);
            assert!(code.starts_with(HEADER));
            assert!(code.contains("#[allow(unused_imports)]\nuse super::*;"));
        }
    }

    #[test]
    fn generated_files_name_their_source() {
        assert!(posts_code(ArtifactKind::Client)
            .contains("//! HTTP clients for the contracts declared in `posts.rs`."));
        assert!(posts_code(ArtifactKind::Server)
            .contains("//! axum dispatchers for the contracts declared in `posts.rs`."));
    }

    #[test]
    fn rendering_is_deterministic() {
        assert_eq!(posts_code(ArtifactKind::Client), posts_code(ArtifactKind::Client));
        assert_eq!(posts_code(ArtifactKind::Server), posts_code(ArtifactKind::Server));
    }

    #[test]
    fn several_contracts_share_one_file() {
        let mut tags = make_posts_spec();
        tags.name = "TagsService".to_string();
        tags.client_name = "TagsClient".to_string();
        let code = render(
            ArtifactKind::Client,
            "blog.rs",
            &[make_posts_spec(), tags],
            &Runtime::default(),
        )
        .unwrap();
        assert!(code.contains("pub struct PostsClient"));
        assert!(code.contains("pub struct TagsClient"));
    }

    #[test]
    fn validate_code_rejects_invalid_code() {
        let tokens = quote! { fn broken() };
        assert!(matches!(validate_code(tokens), Err(GeneratorError::CodeGen(_))));
    }

    #[test]
    fn output_paths_use_suffix() {
        assert_eq!(
            output_path(Path::new("src/api/posts.rs"), "_client_gen"),
            PathBuf::from("src/api/posts_client_gen.rs")
        );
        assert_eq!(
            output_path(Path::new("posts.rs"), "_server_gen"),
            PathBuf::from("posts_server_gen.rs")
        );
    }

    #[test]
    fn write_atomic_creates_file() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("nested/posts_client_gen.rs");

        write_atomic(&file_path, "// Content").unwrap();

        assert_eq!(fs::read_to_string(&file_path).unwrap(), "// Content");
        assert!(!file_path.with_extension("rs.tmp").exists());
    }

    #[test]
    fn write_atomic_overwrites_existing_file() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("existing.rs");
        fs::write(&file_path, "// Old content").unwrap();

        write_atomic(&file_path, "// New content").unwrap();

        assert_eq!(fs::read_to_string(&file_path).unwrap(), "// New content");
    }

    #[test]
    fn write_atomic_reports_the_failing_path() {
        let temp_dir = TempDir::new().unwrap();
        let blocker = temp_dir.path().join("blocker");
        fs::write(&blocker, "").unwrap();

        let err = write_atomic(&blocker.join("out.rs"), "// x").unwrap_err();
        assert!(matches!(err, GeneratorError::Write { .. }));
    }

    #[test]
    fn staged_files_leave_the_target_untouched() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("posts_client_gen.rs");
        fs::write(&file_path, "// Old content").unwrap();

        let staged = stage(&file_path, "// New content").unwrap();
        assert_eq!(fs::read_to_string(&file_path).unwrap(), "// Old content");

        commit(&staged, &file_path).unwrap();
        assert_eq!(fs::read_to_string(&file_path).unwrap(), "// New content");
        assert!(!staged.exists());
    }
}
