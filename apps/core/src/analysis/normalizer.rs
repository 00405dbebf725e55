//! Text normalization.
//!
//! Strips embedded links and collapses whitespace. Pure, allocation-only.

use regex::Regex;
use std::sync::LazyLock;

/// `http`/`https` scheme followed by a run of URL-legal characters.
pub(crate) static URL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"https?://(?:[a-zA-Z0-9$-_@.&+!*\\(),]|%[0-9a-fA-F]{2})+")
        .expect("Invalid regex: URL pattern")
});

static WHITESPACE_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("Invalid regex: whitespace run"));

/// Remove URLs, collapse whitespace runs to one space and trim.
///
/// Idempotent: link removal is repeated until no link remains, so splicing the
/// surrounding text together can never produce a new one.
pub fn normalize(text: &str) -> String {
    if text.trim().is_empty() {
        return String::new();
    }

    let mut stripped = URL_PATTERN.replace_all(text, "").into_owned();
    while URL_PATTERN.is_match(&stripped) {
        stripped = URL_PATTERN.replace_all(&stripped, "").into_owned();
    }

    WHITESPACE_RUN.replace_all(&stripped, " ").trim().to_string()
}

/// Number of whitespace-delimited tokens.
pub fn token_count(text: &str) -> usize {
    text.split_whitespace().count()
}
