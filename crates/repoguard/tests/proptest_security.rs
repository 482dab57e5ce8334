//! Property-based security tests for Repoguard
//!
//! Path-safety and redaction invariants must hold for arbitrary staged paths,
//! patterns and remote URLs, including malformed ones.
//!
//! Run with: cargo test --test proptest_security

use proptest::prelude::*;
use repoguard::{
    PathRules, PathVerdict, PatternSet, RejectReason, Visibility, matches, matches_any,
    redact_remote, scan_remote,
};

// Literal path-like strings: no glob metacharacters, but braces, commas and
// regex metacharacters are included since they carry no glob meaning
fn literal_strategy() -> impl Strategy<Value = String> {
    proptest::string::string_regex("[a-zA-Z0-9_./{},+()|$^-]{0,30}").unwrap()
}

// Arbitrary pattern text, including unbalanced brackets and stray metacharacters
fn pattern_strategy() -> impl Strategy<Value = String> {
    proptest::string::string_regex("[a-z/*?\\[\\]{},!^.-]{0,16}").unwrap()
}

fn visibility_strategy() -> impl Strategy<Value = Visibility> {
    prop_oneof![
        Just(Visibility::Public),
        Just(Visibility::Private),
        Just(Visibility::Unknown),
        Just(Visibility::Conflict),
    ]
}

fn rules_strategy() -> impl Strategy<Value = PathRules> {
    (
        proptest::collection::vec(pattern_strategy(), 0..4),
        proptest::collection::vec(pattern_strategy(), 0..4),
        proptest::collection::vec(pattern_strategy(), 0..4),
    )
        .prop_map(|(allowed, forbidden, public_block)| PathRules {
            allowed: PatternSet::from_patterns(allowed),
            forbidden: PatternSet::from_patterns(forbidden),
            public_block: PatternSet::from_patterns(public_block),
        })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// No text matches an empty pattern set
    #[test]
    fn empty_set_never_matches(text in ".{0,40}") {
        let empty: [&str; 0] = [];
        prop_assert!(!matches_any(&text, &empty));
        prop_assert!(!PatternSet::new().is_match(&text));
    }

    /// A pattern without metacharacters matches only itself
    #[test]
    fn literal_pattern_matches_iff_equal(text in literal_strategy(), pattern in literal_strategy()) {
        prop_assert_eq!(matches(&text, &pattern), text == pattern);
        prop_assert!(matches(&pattern, &pattern));
    }

    /// A run of stars means the same as a single star
    #[test]
    fn star_runs_collapse(text in "[a-z/.]{0,20}", head in "[a-z/]{0,6}", tail in "[a-z/.]{0,6}") {
        let single = format!("{head}*{tail}");
        let double = format!("{head}**{tail}");
        prop_assert_eq!(matches(&text, &single), matches(&text, &double));
    }

    /// Malformed or odd patterns never panic
    #[test]
    fn arbitrary_patterns_never_panic(text in ".{0,40}", pattern in pattern_strategy()) {
        let _ = matches(&text, &pattern);
        let set = PatternSet::from_patterns([pattern]);
        let _ = set.is_match(&text);
    }

    /// Absolute paths are rejected whatever the configuration
    #[test]
    fn absolute_paths_always_rejected(
        rest in literal_strategy(),
        rules in rules_strategy(),
        visibility in visibility_strategy(),
    ) {
        let path = format!("/{rest}");
        prop_assert_eq!(
            rules.classify(&path, visibility),
            PathVerdict::Rejected(RejectReason::AbsolutePath)
        );
    }

    /// Relative paths with a `..` segment are rejected whatever the configuration
    #[test]
    fn parent_traversal_always_rejected(
        head in "[a-z]{0,8}",
        tail in "[a-z]{0,8}",
        rules in rules_strategy(),
        visibility in visibility_strategy(),
    ) {
        let path = if head.is_empty() {
            format!("../{tail}")
        } else {
            format!("{head}/../{tail}")
        };
        prop_assert_eq!(
            rules.classify(&path, visibility),
            PathVerdict::Rejected(RejectReason::ParentTraversal)
        );
    }

    /// Public-block patterns never reject a path unless the repository is public
    #[test]
    fn public_block_inert_unless_public(path in "[a-z]{1,8}(/[a-z]{1,8}){0,3}") {
        let rules = PathRules {
            public_block: PatternSet::from_patterns(["*"]),
            ..PathRules::default()
        };
        for visibility in [Visibility::Private, Visibility::Unknown, Visibility::Conflict] {
            prop_assert_eq!(rules.classify(&path, visibility), PathVerdict::Allowed);
        }
        prop_assert_eq!(
            rules.classify(&path, Visibility::Public),
            PathVerdict::Rejected(RejectReason::PublicBlocked)
        );
    }

    /// Redaction removes the userinfo and keeps everything from the host on
    #[test]
    fn redaction_hides_userinfo(
        scheme in "(https|http|ssh)",
        user in "[a-z]{1,8}",
        password in "[A-Za-z0-9]{1,12}",
        host in "[a-z]{1,10}\\.example\\.com",
        path in "(/[a-z]{1,8}){0,3}",
    ) {
        let url = format!("{scheme}://{user}:{password}@{host}{path}");
        let scan = scan_remote(&url);
        prop_assert!(scan.has_credentials);
        let expected = format!("{scheme}://***@{host}{path}");
        prop_assert_eq!(scan.redacted.as_ref(), expected.as_str());
    }

    /// URLs without userinfo are passed through untouched
    #[test]
    fn plain_urls_untouched(
        host in "[a-z]{1,10}\\.example\\.com",
        path in "(/[a-z]{1,8}){0,3}",
    ) {
        let url = format!("https://{host}{path}");
        let redacted = redact_remote(&url);
        prop_assert_eq!(redacted.as_ref(), url.as_str());
        prop_assert!(!scan_remote(&url).has_credentials);
    }
}
