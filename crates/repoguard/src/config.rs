//! Guard configuration.
//!
//! The configuration file is JSON with a `defaults` block applied to every
//! repository and a `repos` list keyed by repository root:
//!
//! ```json
//! {
//!   "defaults": {
//!     "allowed_paths": ["docs/*"],
//!     "always_forbidden_paths": ["*.env", "*.pem"],
//!     "public_block_paths": "internal/*",
//!     "unknown_remotes_assume_public": true
//!   },
//!   "repos": [
//!     {
//!       "root": "/work/site",
//!       "expected_visibility": "public",
//!       "public_remotes": "https://github.com/acme/*",
//!       "allowed_paths": ["src/*", "README.md"]
//!     }
//!   ]
//! }
//! ```
//!
//! Every pattern-bearing field accepts a single string or a list of strings
//! and is normalised to a [`PatternSet`] while parsing, so the decision logic
//! never sees the difference.

use std::fmt;
use std::path::{Component, Path, PathBuf};

use serde::de::{self, Deserializer, Unexpected};
use serde::{Deserialize, Serialize};

use crate::pattern::PatternSet;
use crate::{Error, Result};

/// Default config location, relative to the repository root.
pub const DEFAULT_CONFIG_PATH: &str = "tools/ci/repo_visibility.json";

/// Config files above this size are rejected before parsing.
const MAX_CONFIG_BYTES: u64 = 4 * 1024 * 1024;

/// Visibility a repository is declared to have.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeclaredVisibility {
    Public,
    Private,
}

impl DeclaredVisibility {
    pub fn as_str(self) -> &'static str {
        match self {
            DeclaredVisibility::Public => "public",
            DeclaredVisibility::Private => "private",
        }
    }
}

impl fmt::Display for DeclaredVisibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn blank_as_unset<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> std::result::Result<Option<DeclaredVisibility>, D::Error> {
    match Option::<String>::deserialize(deserializer)?.as_deref() {
        None | Some("") => Ok(None),
        Some("public") => Ok(Some(DeclaredVisibility::Public)),
        Some("private") => Ok(Some(DeclaredVisibility::Private)),
        Some(other) => Err(<D::Error as de::Error>::invalid_value(
            Unexpected::Str(other),
            &"\"public\" or \"private\"",
        )),
    }
}

/// Per-repository policy entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoConfig {
    /// Repository root this entry applies to
    #[serde(default)]
    pub root: PathBuf,
    /// Visibility the repository is expected to have; blank means unset
    #[serde(default, deserialize_with = "blank_as_unset")]
    pub expected_visibility: Option<DeclaredVisibility>,
    /// Remote URL patterns that mark the repository public
    #[serde(default)]
    pub public_remotes: PatternSet,
    /// Remote URL patterns that mark the repository private
    #[serde(default)]
    pub private_remotes: PatternSet,
    /// Staged paths must match one of these
    #[serde(default)]
    pub allowed_paths: PatternSet,
    /// Staged paths that are never accepted
    #[serde(default)]
    pub always_forbidden_paths: PatternSet,
    /// Staged paths rejected while the repository is public
    #[serde(default)]
    pub public_block_paths: PatternSet,
}

impl RepoConfig {
    /// Create an entry for the given root with no patterns.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            ..Self::default()
        }
    }

    /// Set the expected visibility.
    pub fn expected(mut self, visibility: DeclaredVisibility) -> Self {
        self.expected_visibility = Some(visibility);
        self
    }

    /// Set the public remote patterns.
    pub fn public_remotes(mut self, patterns: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.public_remotes = PatternSet::from_patterns(patterns);
        self
    }

    /// Set the private remote patterns.
    pub fn private_remotes(
        mut self,
        patterns: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        self.private_remotes = PatternSet::from_patterns(patterns);
        self
    }

    /// Set the allowed path patterns.
    pub fn allow(mut self, patterns: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.allowed_paths = PatternSet::from_patterns(patterns);
        self
    }

    /// Set the always-forbidden path patterns.
    pub fn forbid(mut self, patterns: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.always_forbidden_paths = PatternSet::from_patterns(patterns);
        self
    }

    /// Set the path patterns blocked while public.
    pub fn block_when_public(
        mut self,
        patterns: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        self.public_block_paths = PatternSet::from_patterns(patterns);
        self
    }
}

fn default_assume_public() -> bool {
    true
}

/// Policy applied to every repository in addition to its own entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DefaultsConfig {
    /// Organisation-wide public remote patterns, checked after the repo's own
    #[serde(default)]
    pub public_remotes: PatternSet,
    /// Organisation-wide private remote patterns, checked after the repo's own
    #[serde(default)]
    pub private_remotes: PatternSet,
    #[serde(default)]
    pub allowed_paths: PatternSet,
    #[serde(default)]
    pub always_forbidden_paths: PatternSet,
    #[serde(default)]
    pub public_block_paths: PatternSet,
    /// Treat repositories with unrecognised remotes as public.
    /// Default: true
    #[serde(default = "default_assume_public")]
    pub unknown_remotes_assume_public: bool,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            public_remotes: PatternSet::new(),
            private_remotes: PatternSet::new(),
            allowed_paths: PatternSet::new(),
            always_forbidden_paths: PatternSet::new(),
            public_block_paths: PatternSet::new(),
            unknown_remotes_assume_public: default_assume_public(),
        }
    }
}

impl DefaultsConfig {
    /// Create defaults with no patterns and `unknown_remotes_assume_public = true`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set whether unknown remotes are assumed public.
    pub fn assume_public(mut self, assume: bool) -> Self {
        self.unknown_remotes_assume_public = assume;
        self
    }

    /// Set the default allowed path patterns.
    pub fn allow(mut self, patterns: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.allowed_paths = PatternSet::from_patterns(patterns);
        self
    }

    /// Set the default always-forbidden path patterns.
    pub fn forbid(mut self, patterns: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.always_forbidden_paths = PatternSet::from_patterns(patterns);
        self
    }

    /// Set the default path patterns blocked while public.
    pub fn block_when_public(
        mut self,
        patterns: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        self.public_block_paths = PatternSet::from_patterns(patterns);
        self
    }
}

/// Whole configuration file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuardConfig {
    #[serde(default)]
    pub defaults: DefaultsConfig,
    #[serde(default)]
    pub repos: Vec<RepoConfig>,
}

impl GuardConfig {
    /// Parse a configuration from JSON text.
    pub fn from_json_str(raw: &str) -> std::result::Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }

    /// Load and parse a configuration file.
    ///
    /// A missing file is reported as [`Error::ConfigMissing`] so callers can
    /// distinguish it from a malformed one.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let metadata = match std::fs::metadata(path) {
            Ok(metadata) => metadata,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Err(Error::ConfigMissing(path.to_path_buf()));
            }
            Err(err) => return Err(Error::Io(err)),
        };
        if !metadata.is_file() {
            return Err(Error::ConfigMissing(path.to_path_buf()));
        }
        if metadata.len() > MAX_CONFIG_BYTES {
            return Err(Error::config_invalid(
                path,
                format!(
                    "config file is too large ({} bytes; max {} bytes)",
                    metadata.len(),
                    MAX_CONFIG_BYTES
                ),
            ));
        }

        let raw = std::fs::read_to_string(path)?;
        let config =
            Self::from_json_str(&raw).map_err(|err| Error::config_invalid(path, err.to_string()))?;

        #[cfg(feature = "logging")]
        tracing::debug!(
            path = %path.display(),
            repos = config.repos.len(),
            "loaded guard config"
        );

        Ok(config)
    }

    /// Find the entry whose `root` resolves to `root`.
    ///
    /// Relative entry roots are resolved against `cwd`. Both sides are
    /// canonicalised when they exist on disk and compared lexically otherwise.
    pub fn repo_for(&self, root: &Path, cwd: &Path) -> Option<&RepoConfig> {
        let target = resolve_path(root, cwd);
        self.repos
            .iter()
            .find(|repo| resolve_path(&repo.root, cwd) == target)
    }
}

/// Locate the config file: absolute paths are used as-is, relative ones are
/// resolved against the repository root.
pub fn config_path(path: &Path, root: &Path) -> PathBuf {
    if path.is_absolute() {
        return path.to_path_buf();
    }
    resolve_path(path, root)
}

/// Resolve `path` against `base` to an absolute, normalised path.
pub fn resolve_path(path: &Path, base: &Path) -> PathBuf {
    let joined = if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    };
    std::fs::canonicalize(&joined).unwrap_or_else(|_| normalize_lexically(&joined))
}

/// Remove `.` and resolve `..` without touching the filesystem.
fn normalize_lexically(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}
