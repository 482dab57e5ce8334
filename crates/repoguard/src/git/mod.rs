//! Repository state for Repoguard
//!
//! The guard needs three facts about the repository: its root, its remote
//! URLs and the paths staged for the next commit. [`RepoState`] is the seam
//! that provides them; [`GitCli`] implements it with the `git` binary.
//!
//! # Degradation
//!
//! Reading repository state never fails a run. [`RepoSnapshot::capture`]
//! substitutes an empty value for any query that fails (empty root, no
//! remotes, nothing staged) and the decision logic treats that as ordinary
//! input.

mod client;

pub use client::{GitCli, parse_remotes, parse_staged};

use crate::Result;

/// Source of repository state.
pub trait RepoState {
    /// Absolute path of the repository root.
    fn root(&self) -> Result<String>;

    /// Remote URLs, deduplicated and sorted.
    fn remotes(&self) -> Result<Vec<String>>;

    /// Paths staged for commit (added, copied, modified or renamed).
    fn staged_files(&self) -> Result<Vec<String>>;
}

/// Repository state captured once at the start of a run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RepoSnapshot {
    /// Repository root, empty if it could not be determined
    pub root: String,
    pub remotes: Vec<String>,
    pub staged: Vec<String>,
}

impl RepoSnapshot {
    /// Query `state` once per fact, replacing failures with empty values.
    pub fn capture(state: &dyn RepoState) -> Self {
        Self {
            root: or_empty(state.root(), "root"),
            remotes: or_empty(state.remotes(), "remotes"),
            staged: or_empty(state.staged_files(), "staged files"),
        }
    }
}

fn or_empty<T: Default>(result: Result<T>, _what: &str) -> T {
    match result {
        Ok(value) => value,
        Err(_err) => {
            #[cfg(feature = "logging")]
            tracing::debug!(query = _what, error = %_err, "repository query failed; using empty value");
            T::default()
        }
    }
}
