/// Automation-webhook provider.
///
/// Posts `{question, dataset, dataset_info}` to a workflow URL and expects
/// `{insight, dashboard_name?, dashboard_url?}` back. The returned dashboard
/// URL, or the dataset's default dashboard when none comes back, is folded
/// into the text as a `[DASHBOARD:<url>]` marker so it flows through the
/// normal response parser.
use std::time::Duration;

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};

use super::prompts::dataset_info;
use super::provider::{CompletionRequest, Provider};
use crate::datasets::Dashboard;
use crate::parser::dashboard_marker;

const DEFAULT_INSIGHT: &str = "Analysis complete.";
const DEFAULT_DASHBOARD_NAME: &str = "Dashboard";

#[derive(Debug, Serialize)]
struct WebhookRequest<'a> {
    question: &'a str,
    dataset: &'a str,
    dataset_info: String,
}

#[derive(Debug, Default, Deserialize)]
struct WebhookResponse {
    #[serde(default)]
    insight: Option<String>,
    #[serde(default)]
    dashboard_name: Option<String>,
    #[serde(default)]
    dashboard_url: Option<String>,
}

impl WebhookResponse {
    /// Fold the reply into assistant text. Without a usable `dashboard_url`
    /// the dataset's default dashboard is embedded instead.
    fn into_text(self, fallback: Option<&Dashboard>) -> String {
        let insight = self
            .insight
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_INSIGHT.to_string());
        let name = self.dashboard_name.filter(|n| !n.trim().is_empty());

        let (url, name) = match self.dashboard_url.filter(|u| !u.trim().is_empty()) {
            Some(url) => (url, name),
            None => match fallback {
                Some(dash) => (
                    dash.embed_url.clone(),
                    name.or_else(|| Some(dash.name.clone())),
                ),
                None => return insight,
            },
        };

        let name = name.unwrap_or_else(|| DEFAULT_DASHBOARD_NAME.to_string());
        format!(
            "{insight}\n\nDashboard: {}\n\n{}",
            name.trim(),
            dashboard_marker(url.trim())
        )
    }
}

#[derive(Debug)]
pub struct WebhookClient {
    url: String,
    timeout: Duration,
}

impl WebhookClient {
    pub fn new(url: String, timeout: Duration) -> Self {
        Self { url, timeout }
    }
}

impl Provider for WebhookClient {
    fn name(&self) -> String {
        "webhook".to_string()
    }

    fn complete(&self, request: &CompletionRequest<'_>) -> Result<String> {
        let body = WebhookRequest {
            question: request.question,
            dataset: &request.dataset.id,
            dataset_info: dataset_info(request.dataset),
        };

        let resp = ureq::post(&self.url)
            .timeout(self.timeout)
            .send_json(&body)
            .context("webhook request failed")?;

        if resp.status() != 200 {
            bail!("webhook returned HTTP {}", resp.status());
        }

        let parsed: WebhookResponse = resp
            .into_json()
            .context("failed to parse webhook response")?;

        Ok(parsed.into_text(request.dataset.default_dashboard()))
    }
}
