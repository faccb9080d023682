/// Response parser: splits raw assistant text into its display parts.
///
/// Four independent passes run over the same raw string:
///
/// - [`chart::extract_chart_spec`]: the fenced JSON chart spec
/// - [`followups::extract_followups`]: suggested next questions
/// - [`display::extract_dashboard_url`]: the `[DASHBOARD:<url>]` sentinel
/// - [`display::clean_display`]: the prose shown to the user
///
/// Every pass is total: missing or malformed markers produce empty results,
/// never errors.
pub mod chart;
pub mod display;
pub mod followups;

use serde::Serialize;

use crate::chart::ChartSpec;
use crate::config::schema::ParserConfig;

pub use display::{clean_display, dashboard_marker, extract_dashboard_url};
pub use followups::{FollowupOptions, extract_followups};

/// Everything recovered from one assistant message.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ParsedResponse {
    pub display: String,
    pub chart: Option<ChartSpec>,
    pub followups: Vec<String>,
    pub dashboard_url: Option<String>,
}

/// Heuristic parser with configurable follow-up rules.
#[derive(Debug, Clone, Copy, Default)]
pub struct ResponseParser {
    followups: FollowupOptions,
}

impl ResponseParser {
    pub fn new(followups: FollowupOptions) -> Self {
        Self { followups }
    }

    pub fn from_config(config: &ParserConfig) -> Self {
        Self::new(FollowupOptions {
            max: config.max_followups,
            reject_second_person: config.reject_second_person,
        })
    }

    pub fn parse(&self, raw: &str) -> ParsedResponse {
        ParsedResponse {
            display: clean_display(raw),
            chart: chart::extract_chart_spec(raw),
            followups: extract_followups(raw, self.followups),
            dashboard_url: extract_dashboard_url(raw),
        }
    }
}
