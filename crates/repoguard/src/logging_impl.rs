//! Logging helpers for Repoguard
//!
//! Structured logging is enabled with the `logging` feature and goes through
//! the `tracing` crate. Staged paths, patterns and remote URLs all come from
//! outside the guard, so they are sanitised before being logged:
//!
//! - control characters are escaped or dropped (no forged log lines)
//! - long values are truncated
//! - remote URLs are logged in their redacted form only
//!
//! # Log Levels
//!
//! - **WARN**: malformed patterns that were ignored
//! - **INFO**: run outcome
//! - **DEBUG**: visibility resolution, rejected paths, config loading

use std::borrow::Cow;

/// Maximum length of a logged value before truncation.
pub const MAX_LOG_VALUE_LENGTH: usize = 200;

/// Escape newlines and tabs, drop other control characters, truncate.
pub fn sanitize_for_log(input: &str) -> Cow<'_, str> {
    let clean = !input.chars().any(char::is_control) && input.len() <= MAX_LOG_VALUE_LENGTH;
    if clean {
        return Cow::Borrowed(input);
    }

    let escaped: String = input
        .replace('\n', "\\n")
        .replace('\r', "\\r")
        .replace('\t', "\\t")
        .chars()
        .filter(|c| !c.is_control())
        .collect();
    Cow::Owned(truncate(&escaped, MAX_LOG_VALUE_LENGTH))
}

/// Redacted, sanitised form of a remote URL for logging.
pub fn remote_for_log(url: &str) -> String {
    let redacted = crate::credentials::redact_remote(url);
    sanitize_for_log(&redacted).into_owned()
}

/// Truncate on a char boundary at or before `max` bytes.
fn truncate(value: &str, max: usize) -> String {
    if value.len() <= max {
        return value.to_string();
    }
    let mut end = max;
    while end > 0 && !value.is_char_boundary(end) {
        end -= 1;
    }
    format!(
        "{}...[truncated {} bytes]",
        &value[..end],
        value.len() - end
    )
}
