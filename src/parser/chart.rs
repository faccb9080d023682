//! Chart spec extraction from assistant text.
//!
//! Looks for the first fenced block tagged `json` and parses it as the
//! chart wire format:
//!
//! ```json
//! {"chart_type": "bar", "title": "...", "data": {"labels": [...], "values": [...]},
//!  "x_label": "...", "y_label": "..."}
//! ```
//!
//! Anything that doesn't fit (bad JSON, non-numeric values, unequal
//! lengths) yields `None`.

use std::sync::LazyLock;

use regex::Regex;
use serde::Deserialize;
use serde_json::Value;

use crate::chart::{ChartSpec, ChartType};

/// First fenced ```json block, non-greedy across lines.
pub(crate) static JSON_BLOCK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)```json\s*(.*?)```").expect("json block regex must compile")
});

/// Wire shape of the embedded chart object.
#[derive(Debug, Deserialize)]
struct RawChart {
    #[serde(default)]
    chart_type: String,
    #[serde(default)]
    title: String,
    data: Option<RawSeries>,
    labels: Option<Vec<Value>>,
    values: Option<Vec<Value>>,
    #[serde(default)]
    x_label: String,
    #[serde(default)]
    y_label: String,
}

#[derive(Debug, Deserialize)]
struct RawSeries {
    #[serde(default)]
    labels: Vec<Value>,
    #[serde(default)]
    values: Vec<Value>,
}

/// Return the body of the first fenced JSON block, if any.
pub fn find_json_block(text: &str) -> Option<&str> {
    JSON_BLOCK_RE
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim())
}

/// Extract and validate the chart spec embedded in `text`.
pub fn extract_chart_spec(text: &str) -> Option<ChartSpec> {
    let body = find_json_block(text)?;
    let raw: RawChart = serde_json::from_str(body).ok()?;

    let (labels, values) = match raw.data {
        Some(series) => (series.labels, series.values),
        None => (raw.labels.unwrap_or_default(), raw.values.unwrap_or_default()),
    };

    let labels: Vec<String> = labels.iter().map(label_text).collect::<Option<_>>()?;
    let values: Vec<f64> = values.iter().map(Value::as_f64).collect::<Option<_>>()?;

    if labels.len() != values.len() {
        return None;
    }

    Some(ChartSpec {
        chart_type: ChartType::from_label(&raw.chart_type),
        title: raw.title,
        labels,
        values,
        x_label: raw.x_label,
        y_label: raw.y_label,
    })
}

/// Labels may arrive as strings or bare numbers (years, room counts).
fn label_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
