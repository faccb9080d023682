//! Interaction pipeline: one question in, one rendered reply out.
//!
//! ```text
//! question ─► Router ─┬─ dashboard ─► canned text + [DASHBOARD:url]
//!                     └─ analytic ──► Gateway::ask
//!          ─► history append ─► ResponseParser ─► chart::build ─► Reply
//! ```
//!
//! The [`Session`] is owned by the caller (CLI chat loop or web server) and
//! lent to [`Assistant::handle`] for each question.

use anyhow::{Context, Result, bail};
use serde::Serialize;

use crate::analytics::logger::{self, InteractionLogEntry};
use crate::chart::{self, Chart};
use crate::config::schema::DatachatConfig;
use crate::datasets::{Dataset, Registry};
use crate::llm::Gateway;
use crate::parser::{ResponseParser, dashboard_marker};
use crate::router::{Intent, Router};
use crate::session::Session;

/// Provider name logged for dashboard replies.
pub const CANNED: &str = "canned";

/// An embedded dashboard to show under a message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DashboardEmbed {
    pub name: String,
    pub url: String,
}

/// Display parts of one stored assistant message.
#[derive(Debug, Clone, Serialize)]
pub struct Rendered {
    pub display: String,
    pub chart: Option<Chart>,
    pub followups: Vec<String>,
    pub dashboard: Option<DashboardEmbed>,
}

/// Result of handling one question.
#[derive(Debug, Clone, Serialize)]
pub struct Reply {
    /// Raw assistant text as stored in the session.
    pub content: String,
    pub display: String,
    pub chart: Option<Chart>,
    pub followups: Vec<String>,
    pub dashboard: Option<DashboardEmbed>,
    pub intent: Intent,
    pub provider: String,
    pub fallback: bool,
}

pub struct Assistant {
    registry: Registry,
    router: Router,
    gateway: Gateway,
    parser: ResponseParser,
    log_interactions: bool,
}

impl Assistant {
    /// Interaction logging starts disabled; see [`Assistant::with_logging`].
    pub fn new(registry: Registry, router: Router, gateway: Gateway, parser: ResponseParser) -> Self {
        Self {
            registry,
            router,
            gateway,
            parser,
            log_interactions: false,
        }
    }

    pub fn with_logging(mut self, enabled: bool) -> Self {
        self.log_interactions = enabled;
        self
    }

    pub fn from_config(config: &DatachatConfig) -> Result<Self> {
        let path = (!config.datasets.path.trim().is_empty()).then_some(config.datasets.path.as_str());
        let registry = Registry::load(path).context("failed to load dataset registry")?;
        if registry.is_empty() {
            bail!("dataset registry is empty");
        }

        Ok(Self::new(
            registry,
            Router::from_config(&config.router),
            Gateway::from_config(&config.provider),
            ResponseParser::from_config(&config.parser),
        )
        .with_logging(config.logging.enabled))
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn gateway(&self) -> &Gateway {
        &self.gateway
    }

    /// Fresh session on `dataset_id`, or on the first dataset when `None`.
    pub fn start_session(&self, dataset_id: Option<&str>) -> Result<Session> {
        match dataset_id {
            Some(id) => {
                self.dataset(id)?;
                Ok(Session::new(id))
            }
            None => self
                .registry
                .first()
                .map(|d| Session::new(d.id.clone()))
                .context("dataset registry is empty"),
        }
    }

    /// Switch the session to another dataset, dropping its history. An
    /// unknown dataset leaves the session untouched.
    pub fn switch_dataset(&self, session: &mut Session, dataset_id: &str) -> Result<()> {
        self.dataset(dataset_id)?;
        *session = std::mem::take(session).switch_dataset(dataset_id);
        Ok(())
    }

    fn dataset(&self, id: &str) -> Result<&Dataset> {
        match self.registry.get(id) {
            Some(d) => Ok(d),
            None => bail!("unknown dataset '{id}'"),
        }
    }

    /// Handle one user question against the session's dataset.
    ///
    /// Blank questions and unknown datasets are rejected before anything is
    /// appended to the history.
    pub fn handle(&self, session: &mut Session, question: &str) -> Result<Reply> {
        let question = question.trim();
        if question.is_empty() {
            bail!("question is empty");
        }
        let dataset = self.dataset(session.dataset_id())?;

        session.push_user(question);
        let intent = self.router.route(question);

        let (content, provider, fallback, latency_ms, error) = match intent {
            Intent::DashboardRequest => (dashboard_reply(dataset), CANNED.to_string(), false, 0, None),
            Intent::AnalyticQuestion => {
                let answer = self.gateway.ask(question, dataset);
                (answer.text, answer.provider, answer.fallback, answer.latency_ms, answer.error)
            }
        };

        session.push_assistant(content.clone());
        let rendered = self.render(dataset, &content);

        if self.log_interactions {
            let mut entry =
                InteractionLogEntry::now(&dataset.id, question, &intent.to_string(), &provider);
            entry.fallback = fallback;
            entry.latency_ms = latency_ms;
            entry.error = error;
            entry.has_chart = rendered.chart.is_some();
            entry.followups = rendered.followups.len();
            logger::log_interaction(&entry);
        }

        Ok(Reply {
            content,
            display: rendered.display,
            chart: rendered.chart,
            followups: rendered.followups,
            dashboard: rendered.dashboard,
            intent,
            provider,
            fallback,
        })
    }

    /// Parse a stored assistant message into its display parts.
    pub fn render(&self, dataset: &Dataset, content: &str) -> Rendered {
        let parsed = self.parser.parse(content);
        let chart = parsed.chart.as_ref().and_then(chart::build);
        let dashboard = parsed.dashboard_url.map(|url| {
            let name = dataset
                .dashboards
                .iter()
                .find(|d| d.embed_url == url)
                .map(|d| d.name.clone())
                .unwrap_or_else(|| "Dashboard".to_string());
            DashboardEmbed { name, url }
        });

        Rendered {
            display: parsed.display,
            chart,
            followups: parsed.followups,
            dashboard,
        }
    }
}

fn dashboard_reply(dataset: &Dataset) -> String {
    match dataset.default_dashboard() {
        Some(dashboard) => format!(
            "Here is the {} dashboard for {}. Use its filters to explore the data interactively.\n\n{}",
            dashboard.name,
            dataset.name,
            dashboard_marker(&dashboard.embed_url)
        ),
        None => format!(
            "There is no interactive dashboard configured for {}. \
             Ask me a question about the data instead.",
            dataset.name
        ),
    }
}
