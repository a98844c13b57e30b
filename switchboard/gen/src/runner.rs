//! The `generate` run.
//!
//! A run has two phases:
//!
//! 1. **Plan** (parallel): every candidate file is read, parsed, extracted
//!    and rendered on a rayon worker. Any parse error aborts the run here,
//!    before a single file is written.
//! 2. **Write** (sequential): each planned artifact is written atomically. A
//!    failed write fails that file's pair only; the other files are still
//!    written and every failure is reported at the end.

use std::fs;
use std::path::{Path, PathBuf};

use rayon::prelude::*;
use tracing::{info, instrument, warn};

use crate::builder::{self, Extraction};
use crate::codegen::Runtime;
use crate::config::GenerateOptions;
use crate::discovery;
use crate::errors::GeneratorError;
use crate::extract;
use crate::output::{self, ArtifactKind};

/// A file about to be written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub kind: ArtifactKind,
    pub path: PathBuf,
    pub contents: String,
}

/// Everything generated from one source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilePlan {
    pub source: PathBuf,
    pub extraction: Extraction,
    /// Empty when the file declares no usable contract.
    pub artifacts: Vec<Artifact>,
}

impl FilePlan {
    pub fn method_count(&self) -> usize {
        self.extraction
            .interfaces
            .iter()
            .map(|spec| spec.methods.len())
            .sum()
    }
}

/// Outcome of a successful run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Report {
    pub plans: Vec<FilePlan>,
    /// Paths actually written; empty on a dry run.
    pub written: Vec<PathBuf>,
}

impl Report {
    pub fn skipped_count(&self) -> usize {
        self.plans.iter().map(|plan| plan.extraction.skipped.len()).sum()
    }
}

/// Parses `source` and builds its route IR.
///
/// ## Errors
///
/// Returns the [`syn::Error`] if `source` is not valid Rust.
pub fn extract_source(source: &str) -> Result<Extraction, syn::Error> {
    let file = syn::parse_file(source)?;
    Ok(builder::build(extract::extract_file(&file)))
}

/// Plans one file: read, extract, render both artifacts.
///
/// Runs entirely on the calling thread; syntax trees are not `Send`, so only
/// owned strings and IR leave it.
///
/// ## Errors
///
/// [`GeneratorError::Read`], [`GeneratorError::Parse`], or
/// [`GeneratorError::CodeGen`].
pub fn plan_file(path: &Path, options: &GenerateOptions) -> Result<FilePlan, GeneratorError> {
    let text = fs::read_to_string(path).map_err(|source| GeneratorError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let extraction = extract_source(&text).map_err(|source| GeneratorError::Parse {
        path: path.to_path_buf(),
        source,
    })?;

    let mut artifacts = Vec::new();
    if !extraction.interfaces.is_empty() {
        let runtime = Runtime::parse(&options.runtime)?;
        let source_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();

        for (kind, suffix) in [
            (ArtifactKind::Client, &options.client_suffix),
            (ArtifactKind::Server, &options.server_suffix),
        ] {
            artifacts.push(Artifact {
                kind,
                path: output::output_path(path, suffix),
                contents: output::render(kind, &source_name, &extraction.interfaces, &runtime)?,
            });
        }
    }

    Ok(FilePlan {
        source: path.to_path_buf(),
        extraction,
        artifacts,
    })
}

/// Plans every file in parallel. The first failing file, in input order,
/// aborts the run.
///
/// ## Errors
///
/// The error of the first file that failed to plan.
pub fn plan_files(
    files: &[PathBuf],
    options: &GenerateOptions,
) -> Result<Vec<FilePlan>, GeneratorError> {
    files
        .par_iter()
        .map(|path| plan_file(path, options))
        .collect::<Vec<_>>()
        .into_iter()
        .collect()
}

/// Generates clients and dispatchers for every contract under `dir`.
///
/// ## Errors
///
/// - discovery, read and parse errors abort the run before any write
/// - [`GeneratorError::Strict`] when `options.strict` is set and a candidate
///   was skipped, also before any write
/// - [`GeneratorError::Failed`] listing every artifact that could not be
///   written
#[instrument(skip(options), fields(dir = %dir.display(), dry_run = options.dry_run))]
pub fn generate_dir(dir: &Path, options: &GenerateOptions) -> Result<Report, GeneratorError> {
    let files = discovery::discover(dir)?;
    info!(files = files.len(), "planning");
    let plans = plan_files(&files, options)?;

    if options.strict
        && let Some(plan) = plans.iter().find(|plan| !plan.extraction.skipped.is_empty())
    {
        return Err(GeneratorError::Strict {
            path: plan.source.clone(),
            issues: plan.extraction.skipped.clone(),
        });
    }

    let mut report = Report {
        plans,
        written: Vec::new(),
    };
    if options.dry_run {
        return Ok(report);
    }

    let mut failures = Vec::new();
    for plan in &report.plans {
        match write_plan(plan) {
            Ok(mut written) => report.written.append(&mut written),
            Err(err) => {
                warn!(
                    source = %plan.source.display(),
                    error = %err,
                    "failed to write generated files"
                );
                failures.push(err);
            }
        }
    }

    if failures.is_empty() {
        Ok(report)
    } else {
        Err(GeneratorError::Failed { failures })
    }
}

/// Writes one file's artifacts. Every artifact is staged before any is
/// committed, so a failed write leaves the previous pair on disk as it was.
/// Only a rename failing after an earlier rename succeeded can leave the
/// pair split; the error names that file.
fn write_plan(plan: &FilePlan) -> Result<Vec<PathBuf>, GeneratorError> {
    let mut staged = Vec::new();
    for artifact in &plan.artifacts {
        match output::stage(&artifact.path, &artifact.contents) {
            Ok(temp_path) => staged.push((temp_path, &artifact.path)),
            Err(err) => {
                discard(&staged);
                return Err(err);
            }
        }
    }

    let mut written = Vec::new();
    for (index, (temp_path, path)) in staged.iter().enumerate() {
        if let Err(err) = output::commit(temp_path, path) {
            discard(&staged[index + 1..]);
            return Err(err);
        }
        info!(path = %path.display(), "wrote generated file");
        written.push(path.to_path_buf());
    }
    Ok(written)
}

fn discard(staged: &[(PathBuf, &PathBuf)]) {
    for (temp_path, _) in staged {
        let _ = fs::remove_file(temp_path);
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    const POSTS: &str = r#"
use switchboard::{ApiError, Context};

/// @client PostsClient
/// @basepath /api/posts
pub trait PostsService {
    /// @route GET /{id}
    async fn get_by_id(&self, ctx: Context, id: i64) -> Result<Option<Post>, ApiError>;

    /// @route DELETE /{id}
    async fn delete(&self, ctx: Context, id: i64) -> Result<(), ApiError>;
}
"#;

    #[test]
    fn extract_source_builds_ir() {
        let extraction = extract_source(POSTS).unwrap();
        assert_eq!(extraction.interfaces.len(), 1);
        assert_eq!(extraction.interfaces[0].methods.len(), 2);
        assert!(extraction.skipped.is_empty());
    }

    #[test]
    fn extract_source_reports_syntax_errors() {
        assert!(extract_source("pub trait Broken {").is_err());
    }

    #[test]
    fn plan_file_renders_both_artifacts() {
        let dir = TempDir::new().unwrap();
        let source = dir.path().join("posts.rs");
        fs::write(&source, POSTS).unwrap();

        let plan = plan_file(&source, &GenerateOptions::default()).unwrap();
        assert_eq!(plan.method_count(), 2);
        let paths: Vec<_> = plan.artifacts.iter().map(|a| a.path.clone()).collect();
        assert_eq!(
            paths,
            vec![
                dir.path().join("posts_client_gen.rs"),
                dir.path().join("posts_server_gen.rs"),
            ]
        );
        assert!(plan.artifacts[0].contents.contains("pub struct PostsClient"));
        assert!(plan.artifacts[1].contents.contains("pub struct PostsServiceDispatcher<S>"));
    }

    #[test]
    fn files_without_contracts_produce_nothing() {
        let dir = TempDir::new().unwrap();
        let source = dir.path().join("notes.rs");
        fs::write(&source, "// mentions @client but declares no trait\n").unwrap();

        let plan = plan_file(&source, &GenerateOptions::default()).unwrap();
        assert!(plan.artifacts.is_empty());
    }

    #[test]
    fn parse_errors_abort_before_writing() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("a_posts.rs"), POSTS).unwrap();
        fs::write(dir.path().join("b_broken.rs"), "/// @client X\npub trait X {").unwrap();

        let err = generate_dir(dir.path(), &GenerateOptions::default()).unwrap_err();
        assert!(matches!(err, GeneratorError::Parse { .. }));
        assert!(!dir.path().join("a_posts_client_gen.rs").exists());
    }

    #[test]
    fn dry_run_writes_nothing() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("posts.rs"), POSTS).unwrap();

        let options = GenerateOptions {
            dry_run: true,
            ..GenerateOptions::default()
        };
        let report = generate_dir(dir.path(), &options).unwrap();
        assert_eq!(report.plans.len(), 1);
        assert!(report.written.is_empty());
        assert!(!dir.path().join("posts_client_gen.rs").exists());
    }

    #[test]
    fn write_failures_are_collected() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("posts.rs"), POSTS).unwrap();
        // A directory where the client file should go makes the rename fail.
        fs::create_dir(dir.path().join("posts_client_gen.rs")).unwrap();
        fs::write(dir.path().join("posts_client_gen.rs/keep"), "").unwrap();

        let err = generate_dir(dir.path(), &GenerateOptions::default()).unwrap_err();
        let GeneratorError::Failed { failures } = err else {
            panic!("expected aggregated failures, got {err}");
        };
        assert_eq!(failures.len(), 1);
        assert!(!dir.path().join("posts_server_gen.rs").exists());
        assert!(!dir.path().join("posts_server_gen.rs.tmp").exists());
    }

    #[test]
    fn commit_failure_cleans_up_staged_files() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("posts.rs"), POSTS).unwrap();
        generate_dir(dir.path(), &GenerateOptions::default()).unwrap();
        let client = dir.path().join("posts_client_gen.rs");
        let server = dir.path().join("posts_server_gen.rs");
        let previous_client = fs::read_to_string(&client).unwrap();

        // The contract changes, but the server file can no longer be replaced.
        fs::write(
            dir.path().join("posts.rs"),
            POSTS.replace("GET /{id}", "GET /by-id/{id}"),
        )
        .unwrap();
        fs::remove_file(&server).unwrap();
        fs::create_dir(&server).unwrap();
        fs::write(server.join("keep"), "").unwrap();

        let err = generate_dir(dir.path(), &GenerateOptions::default()).unwrap_err();
        assert!(matches!(err, GeneratorError::Failed { .. }));
        // Staging succeeded for both; only the server rename failed.
        assert_ne!(fs::read_to_string(&client).unwrap(), previous_client);
        assert!(!dir.path().join("posts_client_gen.rs.tmp").exists());
        assert!(!dir.path().join("posts_server_gen.rs.tmp").exists());
    }

    #[test]
    fn staging_failure_touches_nothing() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("posts.rs"), POSTS).unwrap();
        generate_dir(dir.path(), &GenerateOptions::default()).unwrap();
        let client = dir.path().join("posts_client_gen.rs");
        let previous_client = fs::read_to_string(&client).unwrap();

        fs::write(
            dir.path().join("posts.rs"),
            POSTS.replace("GET /{id}", "GET /by-id/{id}"),
        )
        .unwrap();
        // A directory where the server temp file goes makes staging fail.
        fs::create_dir(dir.path().join("posts_server_gen.rs.tmp")).unwrap();

        let err = generate_dir(dir.path(), &GenerateOptions::default()).unwrap_err();
        assert!(matches!(err, GeneratorError::Failed { .. }));
        assert_eq!(fs::read_to_string(&client).unwrap(), previous_client);
        assert!(!dir.path().join("posts_client_gen.rs.tmp").exists());
    }
}
