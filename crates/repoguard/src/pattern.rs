//! Shell-style glob matching for staged paths and remote URLs
//!
//! Patterns follow `fnmatch` semantics rather than gitignore semantics:
//!
//! - `*` matches any run of characters, including `/` (`**` is the same as `*`)
//! - `?` matches exactly one character
//! - `[abc]`, `[a-z]` and `[!abc]` match a character class
//! - a `[` without a closing `]` is a literal character, as are `{`, `}` and `\`
//! - the whole input must match the whole pattern
//!
//! Patterns are translated to anchored regular expressions. A pattern that
//! cannot match anything by construction (a class whose only range is
//! reversed, such as `[z-a]`) is rejected; rejected patterns never match and
//! never panic.

use regex::Regex;
use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize, Serializer};

/// Why a glob pattern could not be compiled.
#[derive(Debug, Clone, PartialEq, Eq)]
enum PatternError {
    /// A non-negated character class with no members left
    EmptyClass,
    Regex(String),
}

impl std::fmt::Display for PatternError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PatternError::EmptyClass => f.write_str("character class matches nothing"),
            PatternError::Regex(msg) => write!(f, "invalid pattern: {msg}"),
        }
    }
}

/// Translate a glob pattern into an anchored regular expression.
fn translate(pattern: &str) -> Result<String, PatternError> {
    let chars: Vec<char> = pattern.chars().collect();
    let mut out = String::from("(?s)^");
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        i += 1;
        match c {
            '*' => {
                while i < chars.len() && chars[i] == '*' {
                    i += 1;
                }
                out.push_str(".*");
            }
            '?' => out.push('.'),
            '[' => match class_end(&chars, i) {
                Some(end) => {
                    out.push_str(&translate_class(&chars[i..end])?);
                    i = end + 1;
                }
                None => out.push_str("\\["),
            },
            other => out.push_str(&regex::escape(other.encode_utf8(&mut [0; 4]))),
        }
    }
    out.push_str("\\z");
    Ok(out)
}

/// Index of the `]` closing a class whose body starts at `start`.
///
/// A leading `!` and a `]` directly after it (or after `[`) belong to the body.
fn class_end(chars: &[char], start: usize) -> Option<usize> {
    let mut j = start;
    if chars.get(j) == Some(&'!') {
        j += 1;
    }
    if chars.get(j) == Some(&']') {
        j += 1;
    }
    (j..chars.len()).find(|&k| chars[k] == ']')
}

fn translate_class(body: &[char]) -> Result<String, PatternError> {
    let (negated, members) = match body.split_first() {
        Some(('!', rest)) => (true, rest),
        _ => (false, body),
    };

    let mut items: Vec<(char, char)> = Vec::new();
    let mut k = 0;
    while k < members.len() {
        let lo = members[k];
        if k + 2 < members.len() && members[k + 1] == '-' {
            let hi = members[k + 2];
            // Reversed ranges contribute nothing
            if lo <= hi {
                items.push((lo, hi));
            }
            k += 3;
        } else {
            items.push((lo, lo));
            k += 1;
        }
    }

    if items.is_empty() {
        return if negated {
            Ok(".".to_string())
        } else {
            Err(PatternError::EmptyClass)
        };
    }

    let mut class = String::from(if negated { "[^" } else { "[" });
    for (lo, hi) in items {
        class.push_str(&regex::escape(lo.encode_utf8(&mut [0; 4])));
        if hi != lo {
            class.push('-');
            class.push_str(&regex::escape(hi.encode_utf8(&mut [0; 4])));
        }
    }
    class.push(']');
    Ok(class)
}

/// Compile a single glob into an anchored matcher.
fn build_glob(pattern: &str) -> Result<Regex, PatternError> {
    let source = translate(pattern)?;
    Regex::new(&source).map_err(|err| PatternError::Regex(err.to_string()))
}

/// Check whether `text` matches the glob `pattern`.
///
/// Malformed patterns are treated as non-matching.
pub fn matches(text: &str, pattern: &str) -> bool {
    match build_glob(pattern) {
        Ok(glob) => glob.is_match(text),
        Err(_) => false,
    }
}

/// Check whether `text` matches any of `patterns`.
///
/// An empty pattern list never matches.
pub fn matches_any<S: AsRef<str>>(text: &str, patterns: &[S]) -> bool {
    patterns.iter().any(|pattern| matches(text, pattern.as_ref()))
}

/// Ordered, pre-compiled set of glob patterns.
///
/// The original pattern strings are kept in declaration order for diagnostics.
/// Matching is "any pattern matches"; an empty set matches nothing.
#[derive(Debug, Clone, Default)]
pub struct PatternSet {
    patterns: Vec<String>,
    compiled: Vec<Regex>,
    /// Patterns that failed to compile, in declaration order
    rejected: Vec<String>,
}

impl PatternSet {
    /// Create an empty pattern set (matches nothing).
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a pattern set from an ordered list of patterns.
    pub fn from_patterns(patterns: impl IntoIterator<Item = impl Into<String>>) -> Self {
        let patterns: Vec<String> = patterns.into_iter().map(Into::into).collect();
        let mut compiled = Vec::with_capacity(patterns.len());
        let mut rejected = Vec::new();
        for pattern in &patterns {
            match build_glob(pattern) {
                Ok(glob) => compiled.push(glob),
                Err(_err) => {
                    #[cfg(feature = "logging")]
                    tracing::warn!(
                        pattern = %crate::logging_impl::sanitize_for_log(pattern),
                        error = %_err,
                        "ignoring malformed glob pattern"
                    );
                    rejected.push(pattern.clone());
                }
            }
        }
        Self {
            patterns,
            compiled,
            rejected,
        }
    }

    /// Concatenate two pattern sets, `self` first.
    pub fn merged(&self, other: &PatternSet) -> Self {
        Self::from_patterns(self.patterns.iter().chain(other.patterns.iter()).cloned())
    }

    /// Check whether `text` matches any pattern in the set.
    pub fn is_match(&self, text: &str) -> bool {
        self.compiled.iter().any(|glob| glob.is_match(text))
    }

    /// Check whether any of `texts` matches any pattern in the set.
    pub fn is_match_any<S: AsRef<str>>(&self, texts: &[S]) -> bool {
        texts.iter().any(|text| self.is_match(text.as_ref()))
    }

    /// Patterns in declaration order.
    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }

    /// Patterns that could not be compiled and therefore never match.
    pub fn rejected(&self) -> &[String] {
        &self.rejected
    }

    /// Patterns declared more than once, each reported once in first-seen order.
    pub fn duplicates(&self) -> Vec<&str> {
        let mut seen = std::collections::HashSet::new();
        let mut reported = std::collections::HashSet::new();
        let mut out = Vec::new();
        for pattern in &self.patterns {
            if !seen.insert(pattern.as_str()) && reported.insert(pattern.as_str()) {
                out.push(pattern.as_str());
            }
        }
        out
    }

    /// Number of declared patterns.
    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    /// True if no patterns are declared.
    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}

impl PartialEq for PatternSet {
    fn eq(&self, other: &Self) -> bool {
        self.patterns == other.patterns
    }
}

impl Eq for PatternSet {}

impl<S: Into<String>> FromIterator<S> for PatternSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self::from_patterns(iter)
    }
}

/// Config fields accept either a single pattern or a list of patterns.
#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

impl<'de> Deserialize<'de> for PatternSet {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Option::<OneOrMany>::deserialize(deserializer).map_err(|_| {
            <D::Error as de::Error>::custom(
                "expected a glob pattern string or a list of pattern strings",
            )
        })?;
        let patterns = match raw {
            None => Vec::new(),
            // A blank scalar means "not configured"
            Some(OneOrMany::One(single)) if single.is_empty() => Vec::new(),
            Some(OneOrMany::One(single)) => vec![single],
            Some(OneOrMany::Many(list)) => list,
        };
        Ok(Self::from_patterns(patterns))
    }
}

impl Serialize for PatternSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.patterns.serialize(serializer)
    }
}
