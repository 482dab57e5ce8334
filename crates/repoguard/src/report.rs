//! Report rendering.
//!
//! Text layout, one item per line:
//!
//! ```text
//! [repo-guard] No staged files; skipping.     (nothing staged)
//!
//! [repo-guard] OK                             (passing run)
//! [repo-guard] NOTE: <warning>
//!
//!                                             (failing run)
//! [repo-guard] FAIL
//!  - <error>
//!
//! [repo-guard] Notes
//!  - <warning>
//! ```

use std::fmt::Write as _;

use crate::decision::Decision;

/// Prefix on every report header line.
pub const REPORT_PREFIX: &str = "[repo-guard]";

/// Render a decision as the plain-text report written to stdout.
pub fn render_text(decision: &Decision) -> String {
    let mut out = String::new();

    if decision.skipped {
        let _ = writeln!(out, "{REPORT_PREFIX} No staged files; skipping.");
        return out;
    }

    if decision.ok {
        let _ = writeln!(out, "{REPORT_PREFIX} OK");
        for warning in &decision.warnings {
            let _ = writeln!(out, "{REPORT_PREFIX} NOTE: {warning}");
        }
        return out;
    }

    let _ = writeln!(out, "\n{REPORT_PREFIX} FAIL");
    for error in &decision.errors {
        let _ = writeln!(out, " - {error}");
    }
    if !decision.warnings.is_empty() {
        let _ = writeln!(out, "\n{REPORT_PREFIX} Notes");
        for warning in &decision.warnings {
            let _ = writeln!(out, " - {warning}");
        }
    }
    out
}

/// Render a decision as pretty-printed JSON.
pub fn render_json(decision: &Decision) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(decision)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{DefaultsConfig, RepoConfig};
    use crate::decision::evaluate;
    use pretty_assertions::assert_eq;

    fn repo() -> RepoConfig {
        RepoConfig::new("/work/site").allow(["src/*"])
    }

    #[test]
    fn test_render_skipped() {
        let decision = evaluate(&repo(), &DefaultsConfig::new(), &[] as &[&str], &[] as &[&str]);
        assert_eq!(render_text(&decision), "[repo-guard] No staged files; skipping.\n");
    }

    #[test]
    fn test_render_ok() {
        let decision = evaluate(&repo(), &DefaultsConfig::new(), &[] as &[&str], &["src/a.rs"]);
        assert_eq!(
            render_text(&decision),
            "[repo-guard] OK\n\
             [repo-guard] NOTE: Repo visibility: public (source: default).\n\
             [repo-guard] NOTE: Unknown remote; defaulting to public for safety.\n"
        );
    }

    #[test]
    fn test_render_fail() {
        let decision = evaluate(
            &repo(),
            &DefaultsConfig::new().assume_public(false),
            &[] as &[&str],
            &["docs/a.md"],
        );
        assert_eq!(
            render_text(&decision),
            "\n[repo-guard] FAIL\n \
             - Path outside allowlist: docs/a.md\n\
             \n[repo-guard] Notes\n \
             - Repo visibility unknown; verify in GitHub UI.\n"
        );
    }

    #[test]
    fn test_render_json() {
        let decision = evaluate(&repo(), &DefaultsConfig::new(), &[] as &[&str], &["docs/a.md"]);
        let json = render_json(&decision).unwrap_or_default();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap_or_default();
        assert_eq!(value["ok"], false);
        assert_eq!(value["visibility"]["visibility"], "public");
        assert_eq!(value["errors"][0]["code"], "outside-allowlist");
    }
}
