//! Text hygiene helpers shared by the pipeline stages.

use regex::{Regex, RegexBuilder};
use std::sync::OnceLock;

/// Marker appended when text is cut short
pub const ELLIPSIS: &str = "...";

/// Replacement for redacted terms
pub const REDACTED: &str = "[REDACTED]";

/// Terms removed from user-facing output by [`redact_sensitive`]
pub const REDACTED_TERMS: &[&str] = &["password", "ssn", "secret"];

static REDACTION_PATTERN: OnceLock<Option<Regex>> = OnceLock::new();

/// Collapse runs of whitespace (including newlines) into single spaces and trim.
///
/// arXiv titles and abstracts are hard-wrapped in the feed; this flattens them.
pub fn sanitize_text(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Case-insensitively replace every occurrence of [`REDACTED_TERMS`] with [`REDACTED`].
pub fn redact_sensitive(text: &str) -> String {
    let pattern = REDACTION_PATTERN.get_or_init(|| {
        let alternation = REDACTED_TERMS
            .iter()
            .map(|term| regex::escape(term))
            .collect::<Vec<_>>()
            .join("|");
        RegexBuilder::new(&alternation)
            .case_insensitive(true)
            .build()
            .ok()
    });

    match pattern {
        Some(re) => re.replace_all(text, REDACTED).into_owned(),
        None => text.to_string(),
    }
}

/// Keep at most `limit` characters, appending [`ELLIPSIS`] when anything was cut.
pub fn truncate_chars(text: &str, limit: usize) -> String {
    match text.char_indices().nth(limit) {
        Some((byte_idx, _)) => format!("{}{}", text[..byte_idx].trim_end(), ELLIPSIS),
        None => text.to_string(),
    }
}

/// The first `limit` characters, without any marker
pub fn take_chars(text: &str, limit: usize) -> &str {
    match text.char_indices().nth(limit) {
        Some((byte_idx, _)) => &text[..byte_idx],
        None => text,
    }
}

/// Number of whitespace-delimited words
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_text() {
        assert_eq!(
            sanitize_text("  Deep\n  Residual\tLearning  "),
            "Deep Residual Learning"
        );
        assert_eq!(sanitize_text(""), "");
        assert_eq!(sanitize_text(" \n "), "");
    }

    #[test]
    fn test_redact_sensitive() {
        assert_eq!(
            redact_sensitive("The Password and the SSN are secret."),
            "The [REDACTED] and the [REDACTED] are [REDACTED]."
        );
        assert_eq!(redact_sensitive("nothing to hide"), "nothing to hide");
    }

    #[test]
    fn test_truncate_chars() {
        assert_eq!(truncate_chars("abcdef", 10), "abcdef");
        assert_eq!(truncate_chars("abcdef", 6), "abcdef");
        assert_eq!(truncate_chars("abcdef", 3), "abc...");
        assert_eq!(truncate_chars("ab cdef", 3), "ab...");
        assert_eq!(truncate_chars("日本語テキスト", 3), "日本語...");
    }

    #[test]
    fn test_take_chars() {
        assert_eq!(take_chars("héllo", 2), "hé");
        assert_eq!(take_chars("hi", 800), "hi");
    }

    #[test]
    fn test_word_count() {
        assert_eq!(word_count("one  two\nthree"), 3);
        assert_eq!(word_count("   "), 0);
    }
}
