//! Repoguard - pre-commit guard for repository visibility and staged paths
//!
//! Given the files staged for a commit and the repository's remotes, the
//! guard decides whether the commit may proceed:
//!
//! 1. resolve the repository's visibility (public, private, unknown or
//!    conflict) from remote URL patterns and configuration
//! 2. classify every staged path against forbidden, public-block and allowed
//!    pattern sets
//! 3. collect all problems into one [`Decision`] with errors and notes
//!
//! # Example
//!
//! ```rust
//! use repoguard::{DeclaredVisibility, DefaultsConfig, RepoConfig, evaluate};
//!
//! let repo = RepoConfig::new("/work/site")
//!     .expected(DeclaredVisibility::Public)
//!     .public_remotes(["https://github.com/acme/*"])
//!     .allow(["src/*", "README.md"])
//!     .forbid(["*.env"]);
//!
//! let decision = evaluate(
//!     &repo,
//!     &DefaultsConfig::new(),
//!     &["https://github.com/acme/site.git"],
//!     &["src/main.rs", "config/.env"],
//! );
//!
//! assert!(!decision.ok);
//! assert_eq!(
//!     decision.error_messages(),
//!     vec!["Forbidden path staged: config/.env".to_string()]
//! );
//! ```
//!
//! Each run is a pure function of the configuration and the repository
//! state; nothing is persisted and the repository is never modified.

mod error;

pub mod classify;
pub mod config;
pub mod credentials;
pub mod decision;
pub mod git;
pub mod logging_impl;
pub mod pattern;
pub mod report;
pub mod visibility;

pub use classify::{PathRules, PathVerdict, RejectReason};
pub use config::{DeclaredVisibility, DefaultsConfig, GuardConfig, RepoConfig};
pub use credentials::{RemoteScan, redact_remote, remote_has_credentials, scan_remote};
pub use decision::{Decision, Finding, Findings, evaluate};
pub use error::{Error, Result};
pub use git::{GitCli, RepoSnapshot, RepoState};
pub use pattern::{PatternSet, matches, matches_any};
pub use visibility::{Visibility, VisibilitySource, VisibilityVerdict, resolve_visibility};

use std::path::{Path, PathBuf};

/// Guard bound to one loaded configuration.
///
/// The configuration is immutable for the lifetime of the guard and is the
/// only policy input; nothing is read from the environment.
#[derive(Debug, Clone)]
pub struct Guard {
    config: GuardConfig,
}

impl Guard {
    /// Create a guard for a parsed configuration.
    pub fn new(config: GuardConfig) -> Self {
        Self { config }
    }

    /// Load the configuration file and create a guard.
    pub fn from_config_file(path: impl AsRef<Path>) -> Result<Self> {
        GuardConfig::load(path).map(Self::new)
    }

    /// Evaluate a captured repository snapshot.
    ///
    /// An empty snapshot root means the root could not be determined; `cwd`
    /// is used in its place. Fails with [`Error::RepoEntryMissing`] when no
    /// `repos` entry matches the root.
    pub fn check(&self, snapshot: &RepoSnapshot, cwd: &Path) -> Result<Decision> {
        let root = effective_root(snapshot, cwd);
        let repo = self
            .config
            .repo_for(&root, cwd)
            .ok_or_else(|| Error::RepoEntryMissing(root.display().to_string()))?;

        Ok(evaluate(
            repo,
            &self.config.defaults,
            &snapshot.remotes,
            &snapshot.staged,
        ))
    }
}

/// Repository root of a snapshot, falling back to `cwd` when unknown.
pub fn effective_root(snapshot: &RepoSnapshot, cwd: &Path) -> PathBuf {
    if snapshot.root.is_empty() {
        return config::resolve_path(Path::new("."), cwd);
    }
    config::resolve_path(Path::new(&snapshot.root), cwd)
}
