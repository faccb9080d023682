//! Display cleanup and dashboard marker handling.
//!
//! The raw assistant text carries machine-oriented parts the user shouldn't
//! see: the fenced chart JSON, the `[DASHBOARD:<url>]` sentinel, and the
//! trailing follow-up block (rendered separately as suggestion buttons).

use std::sync::LazyLock;

use regex::Regex;

use super::chart::JSON_BLOCK_RE;

/// Dashboard sentinel: `[DASHBOARD:<url>]`.
static DASHBOARD_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\[DASHBOARD:\s*([^\]\s]+)\s*\]").expect("dashboard regex must compile")
});

/// Start of the follow-up section.
static FOLLOWUP_SECTION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)follow[- ]up questions").expect("follow-up section regex must compile")
});

static BLANK_RUN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n[ \t]*(?:\n[ \t]*){2,}").expect("blank run regex must compile"));

/// Format the sentinel that asks the UI to embed a dashboard.
pub fn dashboard_marker(url: &str) -> String {
    format!("[DASHBOARD:{url}]")
}

/// URL of the first dashboard marker in `text`.
///
/// Only `http://` and `https://` URLs are embeddable; a marker with any
/// other scheme counts as no dashboard.
pub fn extract_dashboard_url(text: &str) -> Option<String> {
    DASHBOARD_RE
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
        .filter(|url| is_embeddable(url))
        .map(str::to_string)
}

fn is_embeddable(url: &str) -> bool {
    let lower = url.to_ascii_lowercase();
    lower
        .strip_prefix("https://")
        .or_else(|| lower.strip_prefix("http://"))
        .is_some_and(|rest| !rest.is_empty())
}

/// Produce the text shown to the user.
pub fn clean_display(text: &str) -> String {
    let mut out = DASHBOARD_RE.replace_all(text, "").into_owned();

    // Removing one block can splice its neighbours into a new one.
    while JSON_BLOCK_RE.is_match(&out) {
        out = JSON_BLOCK_RE.replace_all(&out, "").into_owned();
    }

    if let Some(m) = FOLLOWUP_SECTION_RE.find(&out) {
        let line_start = out[..m.start()].rfind('\n').map_or(0, |i| i + 1);
        out.truncate(line_start);
    }

    BLANK_RUN_RE.replace_all(&out, "\n\n").trim().to_string()
}
