//! Staged path classification.
//!
//! Each staged path is checked in a fixed order and the first failing check
//! decides the outcome:
//!
//! 1. absolute paths are rejected
//! 2. paths with a `..` segment are rejected
//! 3. paths matching an always-forbidden pattern are rejected
//! 4. while the repository is public, paths matching a public-block pattern are rejected
//! 5. when an allowlist exists, paths outside it are rejected
//!
//! Checks 1 and 2 hold regardless of configuration.

use std::fmt;

use serde::Serialize;

use crate::config::{DefaultsConfig, RepoConfig};
use crate::pattern::PatternSet;
use crate::visibility::Visibility;

/// Why a staged path was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum RejectReason {
    AbsolutePath,
    ParentTraversal,
    Forbidden,
    PublicBlocked,
    OutsideAllowlist,
}

impl RejectReason {
    pub fn as_str(self) -> &'static str {
        match self {
            RejectReason::AbsolutePath => "absolute-path",
            RejectReason::ParentTraversal => "parent-traversal",
            RejectReason::Forbidden => "forbidden",
            RejectReason::PublicBlocked => "public-blocked",
            RejectReason::OutsideAllowlist => "outside-allowlist",
        }
    }
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of classifying one staged path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathVerdict {
    Allowed,
    Rejected(RejectReason),
}

impl PathVerdict {
    pub fn is_allowed(self) -> bool {
        matches!(self, PathVerdict::Allowed)
    }
}

/// Merged path pattern sets for one repository.
///
/// Repo-specific patterns come first, then the defaults.
#[derive(Debug, Clone, Default)]
pub struct PathRules {
    pub allowed: PatternSet,
    pub forbidden: PatternSet,
    pub public_block: PatternSet,
}

impl PathRules {
    /// Merge a repo entry with the defaults block.
    pub fn merge(repo: &RepoConfig, defaults: &DefaultsConfig) -> Self {
        Self {
            allowed: repo.allowed_paths.merged(&defaults.allowed_paths),
            forbidden: repo
                .always_forbidden_paths
                .merged(&defaults.always_forbidden_paths),
            public_block: repo.public_block_paths.merged(&defaults.public_block_paths),
        }
    }

    /// Classify a single staged path under the resolved visibility.
    pub fn classify(&self, path: &str, visibility: Visibility) -> PathVerdict {
        if path.starts_with('/') {
            return PathVerdict::Rejected(RejectReason::AbsolutePath);
        }
        if path.split('/').any(|segment| segment == "..") {
            return PathVerdict::Rejected(RejectReason::ParentTraversal);
        }

        let candidate = normalize_for_matching(path);

        if self.forbidden.is_match(&candidate) {
            return PathVerdict::Rejected(RejectReason::Forbidden);
        }
        if visibility == Visibility::Public && self.public_block.is_match(&candidate) {
            return PathVerdict::Rejected(RejectReason::PublicBlocked);
        }
        // An empty allowlist is reported once by the aggregator, not per path
        if !self.allowed.is_empty() && !self.allowed.is_match(&candidate) {
            return PathVerdict::Rejected(RejectReason::OutsideAllowlist);
        }
        PathVerdict::Allowed
    }
}

/// Drop `.` and empty segments so `./src//a.rs` matches like `src/a.rs`.
fn normalize_for_matching(path: &str) -> String {
    let segments: Vec<&str> = path
        .split('/')
        .filter(|segment| !segment.is_empty() && *segment != ".")
        .collect();
    if segments.is_empty() {
        return ".".to_string();
    }
    segments.join("/")
}
