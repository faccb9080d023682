//! Analytics reporter: aggregates the interaction log for `datachat stats`.

use std::collections::HashMap;

use crate::analytics::logger::{self, InteractionLogEntry};

// ---------------------------------------------------------------------------
// Aggregated stats
// ---------------------------------------------------------------------------

/// Summary statistics for `datachat stats`.
#[derive(Debug, Default)]
pub struct Stats {
    pub total_questions: usize,
    pub intents: IntentDistribution,
    pub fallbacks: usize,
    pub charts: usize,
    /// Mean latency over analytic questions.
    pub avg_latency_ms: f64,
    /// Sorted by count, descending.
    pub providers: Vec<ProviderStat>,
    /// Sorted by count, descending.
    pub datasets: Vec<DatasetStat>,
}

impl Stats {
    pub fn fallback_pct(&self) -> f64 {
        pct(self.fallbacks, self.intents.analytic)
    }
}

#[derive(Debug, Default)]
pub struct IntentDistribution {
    pub dashboard: usize,
    pub analytic: usize,
}

impl IntentDistribution {
    pub fn total(&self) -> usize {
        self.dashboard + self.analytic
    }

    /// Percentage for a given intent, 0.0 if total is zero.
    pub fn pct(&self, count: usize) -> f64 {
        pct(count, self.total())
    }
}

#[derive(Debug, Clone)]
pub struct ProviderStat {
    pub provider: String,
    pub count: usize,
    pub avg_latency_ms: f64,
}

#[derive(Debug, Clone)]
pub struct DatasetStat {
    pub dataset_id: String,
    pub count: usize,
    pub dashboard_requests: usize,
    pub charts: usize,
}

/// Questions handled on one day.
#[derive(Debug, Clone)]
pub struct TrendEntry {
    pub date: String,
    pub questions: usize,
    pub fallbacks: usize,
}

fn pct(count: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        (count as f64 / total as f64) * 100.0
    }
}

// ---------------------------------------------------------------------------
// Stats computation
// ---------------------------------------------------------------------------

/// Compute aggregate stats from the log, optionally limited to the last
/// `days` days.
pub fn compute_stats(days: Option<u32>) -> Stats {
    let entries = logger::read_entries_since_days(days);
    build_stats(&entries)
}

pub fn build_stats(entries: &[InteractionLogEntry]) -> Stats {
    if entries.is_empty() {
        return Stats::default();
    }

    let mut intents = IntentDistribution::default();
    for entry in entries {
        if entry.intent == "dashboard" {
            intents.dashboard += 1;
        } else {
            intents.analytic += 1;
        }
    }

    let analytic: Vec<&InteractionLogEntry> =
        entries.iter().filter(|e| e.intent != "dashboard").collect();

    Stats {
        total_questions: entries.len(),
        intents,
        fallbacks: entries.iter().filter(|e| e.fallback).count(),
        charts: entries.iter().filter(|e| e.has_chart).count(),
        avg_latency_ms: mean_latency(&analytic),
        providers: compute_provider_stats(entries),
        datasets: compute_dataset_stats(entries),
    }
}

fn mean_latency(entries: &[&InteractionLogEntry]) -> f64 {
    if entries.is_empty() {
        return 0.0;
    }
    entries.iter().map(|e| e.latency_ms as f64).sum::<f64>() / entries.len() as f64
}

fn compute_provider_stats(entries: &[InteractionLogEntry]) -> Vec<ProviderStat> {
    let mut groups: HashMap<&str, Vec<&InteractionLogEntry>> = HashMap::new();
    for entry in entries {
        groups.entry(entry.provider.as_str()).or_default().push(entry);
    }

    let mut stats: Vec<ProviderStat> = groups
        .into_iter()
        .map(|(provider, group)| ProviderStat {
            provider: provider.to_string(),
            count: group.len(),
            avg_latency_ms: mean_latency(&group),
        })
        .collect();

    stats.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.provider.cmp(&b.provider)));
    stats
}

fn compute_dataset_stats(entries: &[InteractionLogEntry]) -> Vec<DatasetStat> {
    let mut groups: HashMap<&str, DatasetStat> = HashMap::new();
    for entry in entries {
        let stat = groups
            .entry(entry.dataset_id.as_str())
            .or_insert_with(|| DatasetStat {
                dataset_id: entry.dataset_id.clone(),
                count: 0,
                dashboard_requests: 0,
                charts: 0,
            });
        stat.count += 1;
        if entry.intent == "dashboard" {
            stat.dashboard_requests += 1;
        }
        if entry.has_chart {
            stat.charts += 1;
        }
    }

    let mut stats: Vec<DatasetStat> = groups.into_values().collect();
    stats.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.dataset_id.cmp(&b.dataset_id)));
    stats
}

// ---------------------------------------------------------------------------
// Trends
// ---------------------------------------------------------------------------

/// Daily question counts over the last `days` days, oldest first.
pub fn compute_trends(days: u32) -> Vec<TrendEntry> {
    build_trends(&logger::read_entries_since_days(Some(days)))
}

fn build_trends(entries: &[InteractionLogEntry]) -> Vec<TrendEntry> {
    let mut daily: HashMap<String, TrendEntry> = HashMap::new();
    for entry in entries {
        // RFC 3339 timestamps start with YYYY-MM-DD
        let date = entry.timestamp.get(..10).unwrap_or("unknown").to_string();
        let day = daily.entry(date.clone()).or_insert_with(|| TrendEntry {
            date,
            questions: 0,
            fallbacks: 0,
        });
        day.questions += 1;
        if entry.fallback {
            day.fallbacks += 1;
        }
    }

    let mut trends: Vec<TrendEntry> = daily.into_values().collect();
    trends.sort_by(|a, b| a.date.cmp(&b.date));
    trends
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(ts: &str, dataset: &str, intent: &str, provider: &str) -> InteractionLogEntry {
        InteractionLogEntry {
            timestamp: ts.to_string(),
            dataset_id: dataset.to_string(),
            question: "q".to_string(),
            intent: intent.to_string(),
            provider: provider.to_string(),
            fallback: false,
            latency_ms: 0,
            error: None,
            has_chart: false,
            followups: 3,
        }
    }

    fn sample_entries() -> Vec<InteractionLogEntry> {
        let mut slow = entry("2025-01-15T10:00:00+00:00", "hdb", "analytic", "openai:gpt-4o-mini");
        slow.latency_ms = 1200;
        slow.has_chart = true;

        let mut fast = entry("2025-01-15T10:05:00+00:00", "hdb", "analytic", "openai:gpt-4o-mini");
        fast.latency_ms = 800;

        let mut failed = entry("2025-01-16T09:00:00+00:00", "sales", "analytic", "simulated");
        failed.fallback = true;
        failed.error = Some("openai: HTTP 500".to_string());

        let dashboard = entry("2025-01-16T09:30:00+00:00", "hdb", "dashboard", "canned");

        vec![slow, fast, failed, dashboard]
    }

    #[test]
    fn totals_and_intents() {
        let stats = build_stats(&sample_entries());
        assert_eq!(stats.total_questions, 4);
        assert_eq!(stats.intents.dashboard, 1);
        assert_eq!(stats.intents.analytic, 3);
        assert_eq!(stats.charts, 1);
        assert!((stats.intents.pct(stats.intents.dashboard) - 25.0).abs() < 1e-9);
    }

    #[test]
    fn fallback_rate_is_over_analytic_questions() {
        let stats = build_stats(&sample_entries());
        assert_eq!(stats.fallbacks, 1);
        assert!((stats.fallback_pct() - 100.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn providers_sorted_by_count() {
        let stats = build_stats(&sample_entries());
        assert_eq!(stats.providers[0].provider, "openai:gpt-4o-mini");
        assert_eq!(stats.providers[0].count, 2);
        assert!((stats.providers[0].avg_latency_ms - 1000.0).abs() < 1e-9);
    }

    #[test]
    fn datasets_grouped() {
        let stats = build_stats(&sample_entries());
        let hdb = stats.datasets.iter().find(|d| d.dataset_id == "hdb").unwrap();
        assert_eq!(hdb.count, 3);
        assert_eq!(hdb.dashboard_requests, 1);
        assert_eq!(hdb.charts, 1);
    }

    #[test]
    fn empty_log() {
        let stats = build_stats(&[]);
        assert_eq!(stats.total_questions, 0);
        assert_eq!(stats.fallback_pct(), 0.0);
    }

    #[test]
    fn trends_grouped_by_day() {
        let trends = build_trends(&sample_entries());
        assert_eq!(trends.len(), 2);
        assert_eq!(trends[0].date, "2025-01-15");
        assert_eq!(trends[0].questions, 2);
        assert_eq!(trends[1].fallbacks, 1);
    }
}
