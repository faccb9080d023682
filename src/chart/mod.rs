//! Chart builder: turns a parsed [`ChartSpec`] into a renderable figure.
//!
//! The output is a Plotly-compatible `{data, layout}` description. The web
//! frontend hands it straight to `Plotly.newPlot`; the CLI prints a textual
//! summary. Every chart type gets the same theme.

use serde::Serialize;

/// Single accent colour used for every trace.
pub const ACCENT_COLOR: &str = "#10a37f";

/// Font stack for titles, ticks and legends.
pub const FONT_FAMILY: &str = "Inter, -apple-system, 'Segoe UI', Helvetica, Arial, sans-serif";

/// Background for both the paper and the plotting area.
pub const BACKGROUND: &str = "#ffffff";

/// Palette for pie slices, starting from the accent.
const PIE_PALETTE: &[&str] = &[
    "#10a37f", "#1a7f64", "#4fc3a1", "#8fd9c2", "#0e6b54", "#c7eee2",
];

// ---------------------------------------------------------------------------
// Chart spec
// ---------------------------------------------------------------------------

/// Chart kinds the builder knows how to draw.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartType {
    #[default]
    Bar,
    Line,
    Pie,
    Scatter,
}

impl ChartType {
    /// Parse a chart type label. Unrecognized labels draw as bars.
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_ascii_lowercase().as_str() {
            "line" => Self::Line,
            "pie" => Self::Pie,
            "scatter" => Self::Scatter,
            _ => Self::Bar,
        }
    }
}

impl std::fmt::Display for ChartType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Bar => write!(f, "bar"),
            Self::Line => write!(f, "line"),
            Self::Pie => write!(f, "pie"),
            Self::Scatter => write!(f, "scatter"),
        }
    }
}

/// A minimal chart description embedded in assistant output.
///
/// Specs produced by the parser always have `labels.len() == values.len()`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSpec {
    pub chart_type: ChartType,
    pub title: String,
    pub labels: Vec<String>,
    pub values: Vec<f64>,
    pub x_label: String,
    pub y_label: String,
}

// ---------------------------------------------------------------------------
// Renderable chart
// ---------------------------------------------------------------------------

/// A themed, Plotly-compatible figure.
#[derive(Debug, Clone, Serialize)]
pub struct Chart {
    #[serde(skip)]
    pub chart_type: ChartType,
    pub data: Vec<Trace>,
    pub layout: Layout,
}

/// One data series.
#[derive(Debug, Clone, Serialize)]
pub struct Trace {
    #[serde(rename = "type")]
    pub kind: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y: Option<Vec<f64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub labels: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub values: Option<Vec<f64>>,
    pub marker: Marker,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<Line>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Marker {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub colors: Option<Vec<&'static str>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u32>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Line {
    pub color: &'static str,
    pub width: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct Layout {
    pub title: Title,
    pub font: Font,
    pub paper_bgcolor: &'static str,
    pub plot_bgcolor: &'static str,
    pub margin: Margin,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub xaxis: Option<Axis>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub yaxis: Option<Axis>,
    pub showlegend: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct Title {
    pub text: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Font {
    pub family: &'static str,
    pub size: u32,
    pub color: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct Margin {
    pub l: u32,
    pub r: u32,
    pub t: u32,
    pub b: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct Axis {
    pub title: Title,
    pub gridcolor: &'static str,
}

// ---------------------------------------------------------------------------
// Builder
// ---------------------------------------------------------------------------

/// Build a themed chart, or `None` when there is nothing to draw.
///
/// Only emptiness is checked. Mismatched lengths are passed through to the
/// renderer as-is.
pub fn build(spec: &ChartSpec) -> Option<Chart> {
    if spec.labels.is_empty() || spec.values.is_empty() {
        return None;
    }

    let trace = match spec.chart_type {
        ChartType::Bar => Trace {
            kind: "bar",
            mode: None,
            x: Some(spec.labels.clone()),
            y: Some(spec.values.clone()),
            labels: None,
            values: None,
            marker: Marker {
                color: Some(ACCENT_COLOR),
                colors: None,
                size: None,
            },
            line: None,
        },
        ChartType::Line => Trace {
            kind: "scatter",
            mode: Some("lines+markers"),
            x: Some(spec.labels.clone()),
            y: Some(spec.values.clone()),
            labels: None,
            values: None,
            marker: Marker {
                color: Some(ACCENT_COLOR),
                colors: None,
                size: Some(8),
            },
            line: Some(Line {
                color: ACCENT_COLOR,
                width: 3,
            }),
        },
        ChartType::Pie => Trace {
            kind: "pie",
            mode: None,
            x: None,
            y: None,
            labels: Some(spec.labels.clone()),
            values: Some(spec.values.clone()),
            marker: Marker {
                color: None,
                colors: Some(pie_colors(spec.labels.len())),
                size: None,
            },
            line: None,
        },
        ChartType::Scatter => Trace {
            kind: "scatter",
            mode: Some("markers"),
            x: Some(spec.labels.clone()),
            y: Some(spec.values.clone()),
            labels: None,
            values: None,
            marker: Marker {
                color: Some(ACCENT_COLOR),
                colors: None,
                size: Some(10),
            },
            line: None,
        },
    };

    Some(Chart {
        chart_type: spec.chart_type,
        data: vec![trace],
        layout: themed_layout(spec),
    })
}

fn themed_layout(spec: &ChartSpec) -> Layout {
    let is_pie = spec.chart_type == ChartType::Pie;
    let axis = |label: &str| Axis {
        title: Title {
            text: label.to_string(),
        },
        gridcolor: "#f0f0f0",
    };

    Layout {
        title: Title {
            text: spec.title.clone(),
        },
        font: Font {
            family: FONT_FAMILY,
            size: 13,
            color: "#1a1a1a",
        },
        paper_bgcolor: BACKGROUND,
        plot_bgcolor: BACKGROUND,
        margin: Margin {
            l: 50,
            r: 20,
            t: 50,
            b: 50,
        },
        xaxis: (!is_pie).then(|| axis(&spec.x_label)),
        yaxis: (!is_pie).then(|| axis(&spec.y_label)),
        showlegend: is_pie,
    }
}

fn pie_colors(n: usize) -> Vec<&'static str> {
    PIE_PALETTE.iter().copied().cycle().take(n).collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn spec(chart_type: ChartType, labels: &[&str], values: &[f64]) -> ChartSpec {
        ChartSpec {
            chart_type,
            title: "Average price".to_string(),
            labels: labels.iter().map(|s| s.to_string()).collect(),
            values: values.to_vec(),
            x_label: "Flat type".to_string(),
            y_label: "SGD".to_string(),
        }
    }

    #[test]
    fn empty_labels_or_values_build_nothing() {
        assert!(build(&spec(ChartType::Bar, &[], &[1.0])).is_none());
        assert!(build(&spec(ChartType::Pie, &["a"], &[])).is_none());
    }

    #[test]
    fn bar_uses_accent_and_axes() {
        let chart = build(&spec(ChartType::Bar, &["3 ROOM", "4 ROOM"], &[1.0, 2.0])).unwrap();
        assert_eq!(chart.chart_type, ChartType::Bar);
        assert_eq!(chart.data[0].kind, "bar");
        assert_eq!(chart.data[0].marker.color, Some(ACCENT_COLOR));
        assert_eq!(chart.layout.xaxis.as_ref().unwrap().title.text, "Flat type");
        assert!(!chart.layout.showlegend);
    }

    #[test]
    fn line_has_point_markers() {
        let chart = build(&spec(ChartType::Line, &["1990", "1991"], &[1.0, 2.0])).unwrap();
        assert_eq!(chart.data[0].kind, "scatter");
        assert_eq!(chart.data[0].mode, Some("lines+markers"));
        assert!(chart.data[0].line.is_some());
    }

    #[test]
    fn pie_uses_labels_and_legend() {
        let chart = build(&spec(ChartType::Pie, &["a", "b", "c"], &[1.0, 2.0, 3.0])).unwrap();
        let trace = &chart.data[0];
        assert_eq!(trace.kind, "pie");
        assert!(trace.x.is_none());
        assert_eq!(trace.marker.colors.as_ref().unwrap().len(), 3);
        assert!(chart.layout.xaxis.is_none());
        assert!(chart.layout.showlegend);
    }

    #[test]
    fn scatter_is_markers_only() {
        let chart = build(&spec(ChartType::Scatter, &["1", "2"], &[3.0, 4.0])).unwrap();
        assert_eq!(chart.data[0].mode, Some("markers"));
    }

    #[test]
    fn theme_is_uniform_across_types() {
        for ty in [ChartType::Bar, ChartType::Line, ChartType::Pie, ChartType::Scatter] {
            let chart = build(&spec(ty, &["a"], &[1.0])).unwrap();
            assert_eq!(chart.layout.font.family, FONT_FAMILY);
            assert_eq!(chart.layout.paper_bgcolor, BACKGROUND);
            assert_eq!(chart.layout.margin.t, 50);
        }
    }

    #[test]
    fn unknown_labels_parse_as_bar() {
        assert_eq!(ChartType::from_label("histogram"), ChartType::Bar);
        assert_eq!(ChartType::from_label(" LINE "), ChartType::Line);
        assert_eq!(ChartType::from_label("pie"), ChartType::Pie);
    }

    #[test]
    fn figure_serializes_like_plotly() {
        let chart = build(&spec(ChartType::Line, &["x"], &[1.5])).unwrap();
        let json = serde_json::to_value(&chart).unwrap();
        assert_eq!(json["data"][0]["type"], "scatter");
        assert_eq!(json["data"][0]["y"][0], 1.5);
        assert_eq!(json["layout"]["title"]["text"], "Average price");
        assert!(json.get("chart_type").is_none());
    }
}
