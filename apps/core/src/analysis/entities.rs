//! Pattern-based entity extraction.
//!
//! Runs on the raw text: normalization strips links, so extracting afterwards
//! would never see a URL.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

use super::normalizer::URL_PATTERN;

static HASHTAG_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"#(\w+)").expect("Invalid regex: hashtag pattern"));

static MENTION_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"@(\w+)").expect("Invalid regex: mention pattern"));

static EMAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}\b")
        .expect("Invalid regex: email pattern")
});

static PHONE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(?:\+?1[-.\s]?)?\(?[0-9]{3}\)?[-.\s]?[0-9]{3}[-.\s]?[0-9]{4}\b")
        .expect("Invalid regex: phone pattern")
});

/// Entities found in one text, in order of occurrence. Duplicates are kept so
/// frequency survives until display.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entities {
    /// Tag text without the leading `#`
    pub hashtags: Vec<String>,
    /// Handle without the leading `@`
    pub mentions: Vec<String>,
    pub urls: Vec<String>,
    pub emails: Vec<String>,
    pub phone_numbers: Vec<String>,
}

impl Entities {
    pub fn is_empty(&self) -> bool {
        self.hashtags.is_empty()
            && self.mentions.is_empty()
            && self.urls.is_empty()
            && self.emails.is_empty()
            && self.phone_numbers.is_empty()
    }

    pub fn total(&self) -> usize {
        self.hashtags.len()
            + self.mentions.len()
            + self.urls.len()
            + self.emails.len()
            + self.phone_numbers.len()
    }
}

/// Extracts hashtags, mentions, URLs, emails and phone-like numbers.
///
/// Categories are matched independently; an email also yields a mention for its
/// domain part, and that overlap is kept.
#[derive(Debug, Default, Clone, Copy)]
pub struct EntityExtractor;

impl EntityExtractor {
    pub fn new() -> Self {
        Self
    }

    pub fn extract(&self, text: &str) -> Entities {
        Entities {
            hashtags: captures(&HASHTAG_PATTERN, text),
            mentions: captures(&MENTION_PATTERN, text),
            urls: matches(&URL_PATTERN, text),
            emails: matches(&EMAIL_PATTERN, text),
            phone_numbers: matches(&PHONE_PATTERN, text),
        }
    }
}

fn captures(pattern: &Regex, text: &str) -> Vec<String> {
    pattern
        .captures_iter(text)
        .filter_map(|c| c.get(1))
        .map(|m| m.as_str().to_string())
        .collect()
}

fn matches(pattern: &Regex, text: &str) -> Vec<String> {
    pattern
        .find_iter(text)
        .map(|m| m.as_str().to_string())
        .collect()
}
