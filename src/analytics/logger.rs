use std::fs::{self, OpenOptions, create_dir_all};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use anyhow::Result;
use chrono::Utc;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Interaction log entry (JSONL analytics)
// ---------------------------------------------------------------------------

/// A single entry in the interaction log (`~/.datachat/interactions.jsonl`).
///
/// One line per handled question. Used by the reporter for `datachat stats`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InteractionLogEntry {
    pub timestamp: String,
    pub dataset_id: String,
    pub question: String,
    /// `"dashboard"` or `"analytic"`.
    pub intent: String,
    /// Provider that produced the answer; `"canned"` for dashboard replies.
    pub provider: String,
    #[serde(default)]
    pub fallback: bool,
    #[serde(default)]
    pub latency_ms: u64,
    /// Why the configured provider wasn't used.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub error: Option<String>,
    #[serde(default)]
    pub has_chart: bool,
    #[serde(default)]
    pub followups: usize,
}

impl InteractionLogEntry {
    /// Entry stamped with the current time.
    pub fn now(dataset_id: &str, question: &str, intent: &str, provider: &str) -> Self {
        Self {
            timestamp: Utc::now().to_rfc3339(),
            dataset_id: dataset_id.to_string(),
            question: question.to_string(),
            intent: intent.to_string(),
            provider: provider.to_string(),
            fallback: false,
            latency_ms: 0,
            error: None,
            has_chart: false,
            followups: 0,
        }
    }
}

// ---------------------------------------------------------------------------
// Logging
// ---------------------------------------------------------------------------

/// Append to the default log. Best effort: failures are reported on stderr
/// and never reach the caller.
pub fn log_interaction(entry: &InteractionLogEntry) {
    let Some(path) = interaction_log_path() else {
        return;
    };
    if let Err(e) = append_entry(&path, entry) {
        eprintln!("[datachat] failed to write interaction log: {e:#}");
    }
}

pub fn append_entry(path: &Path, entry: &InteractionLogEntry) -> Result<()> {
    if let Some(parent) = path.parent() {
        create_dir_all(parent)?;
    }

    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    let json = serde_json::to_string(entry)?;
    writeln!(file, "{json}")?;

    Ok(())
}

// ---------------------------------------------------------------------------
// Reading log entries
// ---------------------------------------------------------------------------

/// Read every entry in `path`, skipping malformed lines. A missing or
/// unreadable file yields an empty vec.
pub fn read_entries(path: &Path) -> Vec<InteractionLogEntry> {
    let Ok(file) = fs::File::open(path) else {
        return Vec::new();
    };

    BufReader::new(file)
        .lines()
        .map_while(Result::ok)
        .filter_map(|line| serde_json::from_str::<InteractionLogEntry>(&line).ok())
        .collect()
}

/// Entries from the default log, optionally limited to the last `days` days.
pub fn read_entries_since_days(days: Option<u32>) -> Vec<InteractionLogEntry> {
    let entries = interaction_log_path()
        .map(|p| read_entries(&p))
        .unwrap_or_default();
    filter_since_days(entries, days)
}

fn filter_since_days(
    entries: Vec<InteractionLogEntry>,
    days: Option<u32>,
) -> Vec<InteractionLogEntry> {
    let Some(days) = days else {
        return entries;
    };

    let cutoff = (Utc::now() - chrono::Duration::days(i64::from(days))).to_rfc3339();
    entries
        .into_iter()
        .filter(|e| e.timestamp >= cutoff)
        .collect()
}

/// Return the path to the interaction log file.
pub fn interaction_log_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".datachat").join("interactions.jsonl"))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_log(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("datachat-log-{}-{name}", std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        dir.join("interactions.jsonl")
    }

    #[test]
    fn append_then_read() {
        let path = temp_log("roundtrip");
        let mut entry = InteractionLogEntry::now("sales", "top region?", "analytic", "simulated");
        entry.followups = 3;
        append_entry(&path, &entry).unwrap();
        append_entry(&path, &entry).unwrap();

        let entries = read_entries(&path);
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].question, "top region?");
        assert_eq!(entries[1].followups, 3);
        let _ = fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn malformed_lines_are_skipped() {
        let path = temp_log("malformed");
        create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(
            &path,
            "not json\n{\"timestamp\":\"t\",\"dataset_id\":\"d\",\"question\":\"q\",\"intent\":\"analytic\",\"provider\":\"p\"}\n",
        )
        .unwrap();

        let entries = read_entries(&path);
        assert_eq!(entries.len(), 1);
        assert!(!entries[0].fallback);
        let _ = fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn missing_file_reads_empty() {
        assert!(read_entries(Path::new("/nonexistent/datachat/log.jsonl")).is_empty());
    }

    #[test]
    fn day_filter_drops_old_entries() {
        let mut old = InteractionLogEntry::now("d", "q", "analytic", "p");
        old.timestamp = "2000-01-01T00:00:00+00:00".to_string();
        let fresh = InteractionLogEntry::now("d", "q", "analytic", "p");

        let kept = filter_since_days(vec![old, fresh], Some(7));
        assert_eq!(kept.len(), 1);
    }
}
