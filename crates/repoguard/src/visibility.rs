//! Repository visibility resolution.
//!
//! Visibility is derived from the repository's remote URLs first, then from
//! the declared `expected_visibility`, then from the defaults. Staged paths are
//! never consulted here.

use std::fmt;

use serde::Serialize;

use crate::config::{DeclaredVisibility, DefaultsConfig, RepoConfig};
use crate::pattern::PatternSet;

/// Resolved visibility of the repository.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    Public,
    Private,
    Unknown,
    /// Remotes matched both public and private patterns
    Conflict,
}

impl Visibility {
    pub fn as_str(self) -> &'static str {
        match self {
            Visibility::Public => "public",
            Visibility::Private => "private",
            Visibility::Unknown => "unknown",
            Visibility::Conflict => "conflict",
        }
    }

    /// The declared form of this visibility, if it is public or private.
    pub fn declared(self) -> Option<DeclaredVisibility> {
        match self {
            Visibility::Public => Some(DeclaredVisibility::Public),
            Visibility::Private => Some(DeclaredVisibility::Private),
            Visibility::Unknown | Visibility::Conflict => None,
        }
    }
}

impl From<DeclaredVisibility> for Visibility {
    fn from(value: DeclaredVisibility) -> Self {
        match value {
            DeclaredVisibility::Public => Visibility::Public,
            DeclaredVisibility::Private => Visibility::Private,
        }
    }
}

impl fmt::Display for Visibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a visibility verdict came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum VisibilitySource {
    /// A remote URL matched a configured pattern
    Remote,
    /// The repo entry's `expected_visibility`
    Expected,
    /// Fallback from the defaults block
    Default,
}

impl VisibilitySource {
    pub fn as_str(self) -> &'static str {
        match self {
            VisibilitySource::Remote => "remote",
            VisibilitySource::Expected => "expected",
            VisibilitySource::Default => "default",
        }
    }
}

impl fmt::Display for VisibilitySource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Visibility verdict with its provenance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VisibilityVerdict {
    pub visibility: Visibility,
    pub source: VisibilitySource,
    /// Human-readable explanation of the rule that fired
    pub note: &'static str,
}

impl VisibilityVerdict {
    fn new(visibility: Visibility, source: VisibilitySource, note: &'static str) -> Self {
        Self {
            visibility,
            source,
            note,
        }
    }
}

/// Resolve repository visibility from remotes and configuration.
///
/// Rules, first applicable wins:
/// 1. remotes match both public and private patterns: `conflict`
/// 2. a remote matches a public pattern: `public`
/// 3. a remote matches a private pattern: `private`
/// 4. `expected_visibility` is set: that value
/// 5. `unknown_remotes_assume_public`: `public`
/// 6. otherwise `unknown`
///
/// The public and private matches may come from different URLs. With no
/// remotes at all, resolution falls through to rule 4.
pub fn resolve_visibility<S: AsRef<str>>(
    remotes: &[S],
    repo: &RepoConfig,
    defaults: &DefaultsConfig,
) -> VisibilityVerdict {
    let public = repo.public_remotes.merged(&defaults.public_remotes);
    let private = repo.private_remotes.merged(&defaults.private_remotes);

    let matched_public = matches_remote(remotes, &public);
    let matched_private = matches_remote(remotes, &private);

    let verdict = if matched_public && matched_private {
        VisibilityVerdict::new(
            Visibility::Conflict,
            VisibilitySource::Remote,
            "Remote URLs match both public and private patterns.",
        )
    } else if matched_public {
        VisibilityVerdict::new(
            Visibility::Public,
            VisibilitySource::Remote,
            "Matched public remote pattern.",
        )
    } else if matched_private {
        VisibilityVerdict::new(
            Visibility::Private,
            VisibilitySource::Remote,
            "Matched private remote pattern.",
        )
    } else if let Some(expected) = repo.expected_visibility {
        VisibilityVerdict::new(
            expected.into(),
            VisibilitySource::Expected,
            "Using expected visibility from config.",
        )
    } else if defaults.unknown_remotes_assume_public {
        VisibilityVerdict::new(
            Visibility::Public,
            VisibilitySource::Default,
            "Unknown remote; defaulting to public for safety.",
        )
    } else {
        VisibilityVerdict::new(
            Visibility::Unknown,
            VisibilitySource::Default,
            "Unknown remote visibility.",
        )
    };

    #[cfg(feature = "logging")]
    tracing::debug!(
        visibility = %verdict.visibility,
        source = %verdict.source,
        remotes = remotes.len(),
        "resolved repository visibility"
    );

    verdict
}

fn matches_remote<S: AsRef<str>>(remotes: &[S], patterns: &PatternSet) -> bool {
    !patterns.is_empty() && patterns.is_match_any(remotes)
}

#[cfg(test)]
mod tests {
    use super::*;

    const PUBLIC_URL: &str = "https://github.com/acme/site.git";
    const PRIVATE_URL: &str = "git@git.internal.example:acme/site.git";

    fn repo() -> RepoConfig {
        RepoConfig::new("/work/site")
            .public_remotes(["https://github.com/acme/*"])
            .private_remotes(["git@git.internal.example:*"])
    }

    #[test]
    fn test_conflict_across_different_urls() {
        let verdict = resolve_visibility(
            &[PUBLIC_URL, PRIVATE_URL],
            &repo().expected(DeclaredVisibility::Public),
            &DefaultsConfig::new(),
        );
        assert_eq!(verdict.visibility, Visibility::Conflict);
        assert_eq!(verdict.source, VisibilitySource::Remote);
    }

    #[test]
    fn test_remote_match_beats_expected() {
        let verdict = resolve_visibility(
            &[PRIVATE_URL],
            &repo().expected(DeclaredVisibility::Public),
            &DefaultsConfig::new(),
        );
        assert_eq!(verdict.visibility, Visibility::Private);
        assert_eq!(verdict.source, VisibilitySource::Remote);
        assert_eq!(verdict.note, "Matched private remote pattern.");
    }

    #[test]
    fn test_expected_when_nothing_matches() {
        let verdict = resolve_visibility(
            &["https://gitlab.com/x/y.git"],
            &repo().expected(DeclaredVisibility::Private),
            &DefaultsConfig::new(),
        );
        assert_eq!(verdict.visibility, Visibility::Private);
        assert_eq!(verdict.source, VisibilitySource::Expected);
    }

    #[test]
    fn test_no_remotes_falls_through_to_default() {
        let none: [&str; 0] = [];
        let assumed = resolve_visibility(&none, &repo(), &DefaultsConfig::new());
        assert_eq!(assumed.visibility, Visibility::Public);
        assert_eq!(assumed.source, VisibilitySource::Default);

        let unknown = resolve_visibility(&none, &repo(), &DefaultsConfig::new().assume_public(false));
        assert_eq!(unknown.visibility, Visibility::Unknown);
        assert_eq!(unknown.source, VisibilitySource::Default);
    }

    #[test]
    fn test_defaults_remote_patterns_apply() {
        let mut defaults = DefaultsConfig::new();
        defaults.private_remotes = PatternSet::from_patterns(["git@git.internal.example:*"]);
        let verdict = resolve_visibility(&[PRIVATE_URL], &RepoConfig::new("/r"), &defaults);
        assert_eq!(verdict.visibility, Visibility::Private);
        assert_eq!(verdict.source, VisibilitySource::Remote);
    }
}
