/// Local simulated answers.
///
/// Used whenever no provider is configured or the configured one fails. The
/// answer is built from the dataset's precomputed stats: a keyword topic
/// picks which stats to quote, and the reply always closes with a
/// `Follow-up questions:` block so it parses like a real model answer.
use std::sync::LazyLock;

use regex::Regex;

use crate::datasets::{Dataset, Stat};

/// First number in a stat value, e.g. `219,541` in `"$219,541 (39%)"`.
static NUMBER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d[\d,]*(?:\.\d+)?").expect("number regex must compile"));

// ---------------------------------------------------------------------------
// Topics
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Topic {
    Price,
    Location,
    Breakdown,
    Overview,
}

impl Topic {
    /// Topics are checked in declaration order; the first hit wins.
    fn detect(question_lower: &str) -> Self {
        const PRICE: &[&str] = &[
            "price", "cost", "expensive", "cheap", "afford", "trend", "average",
        ];
        const LOCATION: &[&str] = &[
            "town", "area", "location", "where", "region", "bishan", "tampines", "bedok",
        ];
        const BREAKDOWN: &[&str] = &[
            "room", "flat type", "3-room", "4-room", "5-room", "executive", "type", "bedroom",
        ];

        let hit = |words: &[&str]| words.iter().any(|w| question_lower.contains(w));
        if hit(PRICE) {
            Self::Price
        } else if hit(LOCATION) {
            Self::Location
        } else if hit(BREAKDOWN) {
            Self::Breakdown
        } else {
            Self::Overview
        }
    }

    /// Words matched against a stat's category and name.
    fn stat_words(self) -> &'static [&'static str] {
        match self {
            Self::Price => &["price", "cost", "trend"],
            Self::Location => &["town", "region", "location", "area"],
            Self::Breakdown => &["type", "room", "product", "categor"],
            Self::Overview => &["overview"],
        }
    }

    fn heading(self, dataset: &str) -> String {
        match self {
            Self::Price => format!("Here are the price figures for {dataset}:"),
            Self::Location => format!("Here's how {dataset} breaks down by location:"),
            Self::Breakdown => format!("Here's a breakdown of {dataset} by type:"),
            Self::Overview => format!("Here's an overview of {dataset}:"),
        }
    }

    fn followups(self) -> [&'static str; 3] {
        match self {
            Self::Price => [
                "Which group has the highest average price?",
                "How did prices change over the period covered?",
                "What is the gap between the lowest and highest prices?",
            ],
            Self::Location => [
                "Which location has the highest average value?",
                "Which locations had the most transactions?",
                "How do the most affordable locations compare on volume?",
            ],
            Self::Breakdown => [
                "Which type accounts for the largest share of records?",
                "How does the average value differ between types?",
                "Which type has the smallest number of records?",
            ],
            Self::Overview => [
                "What is the average price across all records?",
                "Which location has the most records?",
                "How are records distributed across types?",
            ],
        }
    }
}

// ---------------------------------------------------------------------------
// Answer construction
// ---------------------------------------------------------------------------

/// Build a simulated answer for `question` on `dataset`. Never empty.
pub fn simulate_answer(question: &str, dataset: &Dataset) -> String {
    let lower = question.to_lowercase();
    let topic = Topic::detect(&lower);
    let stats = select_stats(topic, &dataset.stats);

    let mut out = String::new();

    if stats.is_empty() {
        out.push_str(&format!(
            "I'm analyzing the {} dataset. {}\n\n\
             No precomputed statistics are available for it yet.",
            dataset.name,
            dataset.summary.trim()
        ));
    } else {
        out.push_str(&topic.heading(&dataset.name));
        out.push('\n');
        for stat in &stats {
            out.push_str(&format!("- {}: {}\n", stat.name, stat.value));
        }
        if wants_chart(&lower)
            && let Some(block) = chart_block(topic, &lower, &stats)
        {
            out.push('\n');
            out.push_str(&block);
            out.push('\n');
        }
    }

    out.push_str(
        "\n\nThis is a demo response built from the precomputed statistics. \
         Configure a provider for full answers.",
    );

    out.push_str("\n\nFollow-up questions:\n");
    for (i, q) in topic.followups().iter().enumerate() {
        out.push_str(&format!("{}. {q}\n", i + 1));
    }

    out.trim_end().to_string()
}

/// Stats for the topic; falls back to overview stats, then the first few.
fn select_stats(topic: Topic, stats: &[Stat]) -> Vec<&Stat> {
    let matching = |words: &[&str]| -> Vec<&Stat> {
        stats
            .iter()
            .filter(|s| {
                let category = s.category.to_lowercase();
                let name = s.name.to_lowercase();
                words
                    .iter()
                    .any(|w| category.contains(w) || name.contains(w))
            })
            .collect()
    };

    let selected = matching(topic.stat_words());
    if !selected.is_empty() {
        return selected;
    }
    let overview = matching(Topic::Overview.stat_words());
    if !overview.is_empty() {
        return overview;
    }
    stats.iter().take(5).collect()
}

fn wants_chart(question_lower: &str) -> bool {
    ["chart", "graph", "plot", "visuali"]
        .iter()
        .any(|w| question_lower.contains(w))
}

/// Fenced JSON chart of the numeric stats, if at least two have a number.
fn chart_block(topic: Topic, question_lower: &str, stats: &[&Stat]) -> Option<String> {
    let (labels, values): (Vec<String>, Vec<f64>) = stats
        .iter()
        .filter_map(|s| leading_number(&s.value).map(|v| (s.name.clone(), v)))
        .unzip();

    if values.len() < 2 {
        return None;
    }

    let chart_type = if question_lower.contains("pie") || question_lower.contains("share") {
        "pie"
    } else if question_lower.contains("line") || question_lower.contains("over time") {
        "line"
    } else {
        "bar"
    };

    let title = match topic {
        Topic::Price => "Price figures",
        Topic::Location => "By location",
        Topic::Breakdown => "By type",
        Topic::Overview => "Overview",
    };

    let spec = serde_json::json!({
        "chart_type": chart_type,
        "title": title,
        "data": { "labels": labels, "values": values },
        "x_label": "",
        "y_label": "Value",
    });
    Some(format!("```json\n{spec}\n```"))
}

fn leading_number(value: &str) -> Option<f64> {
    let m = NUMBER_RE.find(value)?;
    m.as_str().replace(',', "").parse().ok()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn dataset() -> Dataset {
        let mut d = Dataset::new("hdb", "Flat Resale", "Resale transactions.");
        d.stats = vec![
            Stat::new("Overview", "Total transactions", "287,202"),
            Stat::new("Price", "Average resale price", "$219,541"),
            Stat::new("Price", "Highest resale price", "$900,000"),
            Stat::new("Flat Type", "3 ROOM average price", "$124,352 (39%)"),
            Stat::new("Town", "BISHAN average price", "$312,456"),
        ];
        d
    }

    #[test]
    fn topic_detection_order() {
        assert_eq!(Topic::detect("what is the average price in bishan"), Topic::Price);
        assert_eq!(Topic::detect("which town is busiest"), Topic::Location);
        assert_eq!(Topic::detect("3-room vs executive"), Topic::Breakdown);
        assert_eq!(Topic::detect("hello"), Topic::Overview);
    }

    #[test]
    fn price_question_quotes_price_stats() {
        let answer = simulate_answer("How expensive are flats?", &dataset());
        assert!(answer.contains("$219,541"));
        assert!(answer.contains("$900,000"));
        assert!(answer.contains("Follow-up questions:\n1. "));
    }

    #[test]
    fn overview_falls_back_to_overview_category() {
        let answer = simulate_answer("tell me something", &dataset());
        assert!(answer.contains("Total transactions: 287,202"));
    }

    #[test]
    fn empty_dataset_still_answers() {
        let dataset = Dataset::new("empty", "Empty", "");
        let answer = simulate_answer("anything?", &dataset);
        assert!(answer.contains("I'm analyzing the Empty dataset."));
        assert!(answer.contains("Follow-up questions:"));
    }

    #[test]
    fn chart_request_embeds_json_block() {
        let answer = simulate_answer("plot the price figures as a pie", &dataset());
        assert!(answer.contains("```json"));
        assert!(answer.contains("\"chart_type\":\"pie\""));
    }

    #[test]
    fn leading_number_strips_separators() {
        assert_eq!(leading_number("$124,352 (39%)"), Some(124_352.0));
        assert_eq!(leading_number("North, South"), None);
    }
}
