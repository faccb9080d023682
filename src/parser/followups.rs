//! Follow-up question extraction.
//!
//! Assistant replies are asked to end with a `Follow-up questions:` block.
//! Two passes recover those suggestions:
//!
//! 1. **Heading scan**: every line after the first heading that mentions
//!    "follow-up" / "follow up" is stripped of its enumerator and kept when
//!    it is longer than 10 characters and contains a `?`.
//! 2. **Loose scan**: only when the heading scan finds nothing: any line
//!    ending in `?` longer than 15 characters, deduplicated.
//!
//! Suggestions should read as questions about the data. With the reject
//! list active, lines phrased about the user ("would you like ...") are
//! dropped. The list is a literal phrase match, nothing smarter.

use std::sync::LazyLock;

use regex::Regex;

/// Leading list markers: digits, dots, dashes, bullets, parentheses.
static ENUMERATOR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[\s\d.\-*•()\[\]#>]+").expect("enumerator regex must compile")
});

/// Heading that opens the follow-up section.
static HEADING_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)follow[- ]up").expect("heading regex must compile"));

/// Second-person phrasing that marks a question about the user, not the data.
pub const SECOND_PERSON_PHRASES: &[&str] = &[
    "would you",
    "do you",
    "are there any",
    "would it help",
    "should i",
    "can i help",
    "shall i",
    "let me know",
    "you'd like",
    "you want",
];

/// Minimum cleaned length for a heading-scan suggestion (exclusive).
const MIN_HEADED_LEN: usize = 10;

/// Minimum length for a loose-scan suggestion (exclusive).
const MIN_LOOSE_LEN: usize = 15;

/// Extraction settings.
#[derive(Debug, Clone, Copy)]
pub struct FollowupOptions {
    pub max: usize,
    pub reject_second_person: bool,
}

impl Default for FollowupOptions {
    fn default() -> Self {
        Self {
            max: 3,
            reject_second_person: true,
        }
    }
}

/// Extract up to `options.max` follow-up questions, in source order.
pub fn extract_followups(text: &str, options: FollowupOptions) -> Vec<String> {
    let headed = scan_after_heading(text, options);
    if !headed.is_empty() {
        return headed;
    }
    scan_loose(text, options)
}

fn scan_after_heading(text: &str, options: FollowupOptions) -> Vec<String> {
    let mut lines = text.lines();
    if !lines.by_ref().any(|line| HEADING_RE.is_match(line)) {
        return Vec::new();
    }

    let mut found = Vec::new();
    for line in lines {
        if found.len() >= options.max {
            break;
        }
        let cleaned = strip_enumerator(line);
        if cleaned.chars().count() > MIN_HEADED_LEN
            && cleaned.contains('?')
            && is_acceptable(cleaned, options)
        {
            found.push(cleaned.to_string());
        }
    }
    found
}

fn scan_loose(text: &str, options: FollowupOptions) -> Vec<String> {
    let mut found: Vec<String> = Vec::new();
    for line in text.lines() {
        if found.len() >= options.max {
            break;
        }
        let cleaned = strip_enumerator(line);
        if cleaned.ends_with('?')
            && cleaned.chars().count() > MIN_LOOSE_LEN
            && is_acceptable(cleaned, options)
            && !found.iter().any(|q| q == cleaned)
        {
            found.push(cleaned.to_string());
        }
    }
    found
}

/// Remove a leading enumerator and markdown emphasis, then trim.
pub fn strip_enumerator(line: &str) -> &str {
    let trimmed = line.trim();
    let stripped = ENUMERATOR_RE.replace(trimmed, "");
    // `replace` only ever removes a prefix, so the remainder is a suffix.
    let rest = &trimmed[trimmed.len() - stripped.len()..];
    rest.trim_matches(|c: char| c == '*' || c == '_' || c.is_whitespace())
}

fn is_acceptable(question: &str, options: FollowupOptions) -> bool {
    !(options.reject_second_person && is_second_person(question))
}

/// Whether a question is phrased about the user rather than the data.
pub fn is_second_person(question: &str) -> bool {
    let lower = question.to_lowercase();
    SECOND_PERSON_PHRASES.iter().any(|p| lower.contains(p))
}
