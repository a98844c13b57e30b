//! Generator configuration.
//!
//! Options come from three layers, later layers winning:
//!
//! 1. built-in defaults
//! 2. `switchboard.toml` in the target directory (or the file passed with
//!    `--config`)
//! 3. command-line flags
//!
//! ```toml
//! strict = true
//! client_suffix = "_client_gen"
//! server_suffix = "_server_gen"
//! runtime = "::switchboard"
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::debug;

use crate::codegen::Runtime;
use crate::errors::GeneratorError;

/// Name of the configuration file looked up in the target directory.
pub const CONFIG_FILE: &str = "switchboard.toml";

const GENERATED_MARKER: &str = "_gen";

const DEFAULT_RUNTIME: &str = "::switchboard";

/// Contents of `switchboard.toml`. Every key is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub strict: Option<bool>,
    pub client_suffix: Option<String>,
    pub server_suffix: Option<String>,
    pub runtime: Option<String>,
}

impl FileConfig {
    /// Parses configuration text; `origin` only appears in error messages.
    ///
    /// ## Errors
    ///
    /// Returns [`GeneratorError::Config`] on invalid TOML or unknown keys.
    pub fn parse(text: &str, origin: &Path) -> Result<Self, GeneratorError> {
        toml::from_str(text)
            .map_err(|err| GeneratorError::Config(format!("{}: {err}", origin.display())))
    }

    /// Reads `path`.
    ///
    /// ## Errors
    ///
    /// Returns [`GeneratorError::Read`] if the file cannot be read and
    /// [`GeneratorError::Config`] if it is invalid.
    pub fn load(path: &Path) -> Result<Self, GeneratorError> {
        let text = fs::read_to_string(path).map_err(|source| GeneratorError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&text, path)
    }

    /// Loads `explicit` if given, else `<dir>/switchboard.toml` if it exists.
    ///
    /// ## Errors
    ///
    /// Same as [`FileConfig::load`]; a missing default file is not an error.
    pub fn discover(dir: &Path, explicit: Option<&Path>) -> Result<Self, GeneratorError> {
        if let Some(path) = explicit {
            return Self::load(path);
        }

        let default = dir.join(CONFIG_FILE);
        if default.is_file() {
            debug!(path = %default.display(), "loading configuration");
            Self::load(&default)
        } else {
            Ok(Self::default())
        }
    }
}

/// Resolved options for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerateOptions {
    /// Fail the run when any candidate is skipped.
    pub strict: bool,
    /// Plan and report without writing files.
    pub dry_run: bool,
    pub client_suffix: String,
    pub server_suffix: String,
    /// Path of the runtime crate in generated code. Kept as text so the
    /// options can be shared with worker threads.
    pub runtime: String,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        Self {
            strict: false,
            dry_run: false,
            client_suffix: "_client_gen".to_string(),
            server_suffix: "_server_gen".to_string(),
            runtime: DEFAULT_RUNTIME.to_string(),
        }
    }
}

impl GenerateOptions {
    /// Applies file values over the defaults.
    ///
    /// ## Errors
    ///
    /// Returns [`GeneratorError::Config`] for an invalid runtime path or
    /// suffix.
    pub fn from_file(file: FileConfig) -> Result<Self, GeneratorError> {
        let mut options = Self::default();
        if let Some(strict) = file.strict {
            options.strict = strict;
        }
        if let Some(suffix) = file.client_suffix {
            options.client_suffix = suffix;
        }
        if let Some(suffix) = file.server_suffix {
            options.server_suffix = suffix;
        }
        if let Some(runtime) = file.runtime {
            options.runtime = runtime;
        }
        options.validate()?;
        Ok(options)
    }

    /// Checks the runtime path and both suffixes.
    ///
    /// Suffixes must end in `_gen` so generated files are never scanned as
    /// sources, and must differ so the two artifacts never overwrite each
    /// other.
    ///
    /// ## Errors
    ///
    /// Returns [`GeneratorError::Config`] describing the first problem.
    pub fn validate(&self) -> Result<(), GeneratorError> {
        Runtime::parse(&self.runtime)?;

        for (key, suffix) in [
            ("client_suffix", &self.client_suffix),
            ("server_suffix", &self.server_suffix),
        ] {
            if !suffix.ends_with(GENERATED_MARKER) {
                return Err(GeneratorError::Config(format!(
                    "{key} {suffix:?} must end with {GENERATED_MARKER:?}"
                )));
            }
            if !suffix
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-' || c == '.')
            {
                return Err(GeneratorError::Config(format!(
                    "{key} {suffix:?} contains characters not allowed in a file name"
                )));
            }
        }

        if self.client_suffix == self.server_suffix {
            return Err(GeneratorError::Config(format!(
                "client_suffix and server_suffix are both {:?}",
                self.client_suffix
            )));
        }
        Ok(())
    }
}

/// `true` when `path` names a file this generator may have written.
pub fn is_generated(path: &Path) -> bool {
    path.file_stem()
        .and_then(|stem| stem.to_str())
        .is_some_and(|stem| stem.ends_with(GENERATED_MARKER))
}

/// The configuration file that `discover` would load, for diagnostics.
pub fn config_path(dir: &Path, explicit: Option<&Path>) -> Option<PathBuf> {
    match explicit {
        Some(path) => Some(path.to_path_buf()),
        None => Some(dir.join(CONFIG_FILE)).filter(|path| path.is_file()),
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn defaults() {
        let options = GenerateOptions::default();
        assert!(!options.strict);
        assert_eq!(options.client_suffix, "_client_gen");
        assert_eq!(options.server_suffix, "_server_gen");
        assert_eq!(options.runtime, "::switchboard");
        assert!(options.validate().is_ok());
    }

    #[test]
    fn file_values_override_defaults() {
        let file = FileConfig::parse(
            "strict = true\nclient_suffix = \"_rpc_client_gen\"\nruntime = \"crate::rpc\"\n",
            Path::new("switchboard.toml"),
        )
        .unwrap();
        let options = GenerateOptions::from_file(file).unwrap();

        assert!(options.strict);
        assert_eq!(options.client_suffix, "_rpc_client_gen");
        assert_eq!(options.server_suffix, "_server_gen");
        assert_eq!(options.runtime, "crate::rpc");
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let err = FileConfig::parse("stritc = true", Path::new("switchboard.toml")).unwrap_err();
        assert!(matches!(err, GeneratorError::Config(_)));
        assert!(err.to_string().contains("switchboard.toml"));
    }

    #[test]
    fn suffixes_are_validated() {
        let file = FileConfig {
            client_suffix: Some("_client".to_string()),
            ..FileConfig::default()
        };
        assert!(GenerateOptions::from_file(file).is_err());

        let file = FileConfig {
            client_suffix: Some("_gen".to_string()),
            server_suffix: Some("_gen".to_string()),
            ..FileConfig::default()
        };
        assert!(GenerateOptions::from_file(file).is_err());

        let file = FileConfig {
            server_suffix: Some("/../x_gen".to_string()),
            ..FileConfig::default()
        };
        assert!(GenerateOptions::from_file(file).is_err());
    }

    #[test]
    fn invalid_runtime_path() {
        let file = FileConfig {
            runtime: Some("::".to_string()),
            ..FileConfig::default()
        };
        assert!(matches!(
            GenerateOptions::from_file(file),
            Err(GeneratorError::Config(_))
        ));
    }

    #[test]
    fn discover_reads_default_file() {
        let dir = TempDir::new().unwrap();
        assert_eq!(
            FileConfig::discover(dir.path(), None).unwrap(),
            FileConfig::default()
        );
        assert!(config_path(dir.path(), None).is_none());

        fs::write(dir.path().join(CONFIG_FILE), "strict = true").unwrap();
        assert_eq!(
            FileConfig::discover(dir.path(), None).unwrap().strict,
            Some(true)
        );
        assert!(config_path(dir.path(), None).is_some());
    }

    #[test]
    fn explicit_file_must_exist() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("custom.toml");
        assert!(matches!(
            FileConfig::discover(dir.path(), Some(&missing)),
            Err(GeneratorError::Read { .. })
        ));
    }

    #[test]
    fn generated_files_are_recognised() {
        assert!(is_generated(Path::new("src/posts_client_gen.rs")));
        assert!(is_generated(Path::new("posts_server_gen.rs")));
        assert!(!is_generated(Path::new("src/posts.rs")));
        assert!(!is_generated(Path::new("src/general.rs")));
    }
}
