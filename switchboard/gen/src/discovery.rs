//! Source discovery.

use std::fs;
use std::path::{Path, PathBuf};

use ignore::WalkBuilder;
use tracing::{debug, trace};

use crate::config::is_generated;
use crate::errors::GeneratorError;

/// Text every candidate source must contain.
const MARKER: &str = "@client";

/// Finds the Rust sources under `dir` that may declare contracts.
///
/// Honors `.gitignore` and skips hidden entries. Generated files
/// (`*_gen.rs`) and files that never mention `@client` are left out. The
/// result is sorted.
///
/// ## Errors
///
/// Returns [`GeneratorError::Discovery`] when `dir` is not a directory or
/// cannot be walked, and [`GeneratorError::Read`] when a candidate cannot be
/// read.
pub fn discover(dir: &Path) -> Result<Vec<PathBuf>, GeneratorError> {
    if !dir.is_dir() {
        return Err(GeneratorError::Discovery {
            path: dir.to_path_buf(),
            reason: "not a directory".to_string(),
        });
    }

    let walker = WalkBuilder::new(dir)
        .standard_filters(true)
        .require_git(false)
        .build();

    let mut files = Vec::new();
    for entry in walker {
        let entry = entry.map_err(|err| GeneratorError::Discovery {
            path: dir.to_path_buf(),
            reason: err.to_string(),
        })?;

        let is_file = entry
            .file_type()
            .map(|file| file.is_file())
            .unwrap_or(false);
        let path = entry.path();
        if !is_file || path.extension().is_none_or(|ext| ext != "rs") {
            continue;
        }
        if is_generated(path) {
            trace!(path = %path.display(), "skipping generated file");
            continue;
        }

        let contents = fs::read_to_string(path).map_err(|source| GeneratorError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        if !contents.contains(MARKER) {
            continue;
        }

        files.push(entry.into_path());
    }

    files.sort();
    debug!(count = files.len(), dir = %dir.display(), "discovered candidate sources");
    Ok(files)
}
