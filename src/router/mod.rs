/// Router: decides how a question is answered.
///
/// ```text
/// question ──▶ lower-case ──▶ contains any dashboard keyword?
///                                 │ yes                │ no
///                                 ▼                    ▼
///                          DashboardRequest     AnalyticQuestion
///                       (canned reply + embed)   (AI gateway)
/// ```
///
/// Matching is literal substring containment on the lower-cased question.
/// There is no tokenization or stemming: "dashboards" matches "dashboard",
/// and so does "mydashboard". Only presence matters, so keyword order is
/// irrelevant.
pub mod decision;

use crate::config::schema::RouterConfig;

pub use decision::Intent;

/// Keyword-based question router.
#[derive(Debug, Clone)]
pub struct Router {
    keywords: Vec<String>,
}

impl Router {
    /// Build a router from a keyword list. Keywords are lower-cased; blank
    /// entries are dropped so they can't match every question.
    pub fn new<I, S>(keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let keywords = keywords
            .into_iter()
            .map(|k| k.as_ref().trim().to_lowercase())
            .filter(|k| !k.is_empty())
            .collect();
        Self { keywords }
    }

    pub fn from_config(config: &RouterConfig) -> Self {
        Self::new(&config.dashboard_keywords)
    }

    /// Classify a question. Total over any input.
    pub fn route(&self, question: &str) -> Intent {
        let lower = question.to_lowercase();
        if self.keywords.iter().any(|k| lower.contains(k.as_str())) {
            Intent::DashboardRequest
        } else {
            Intent::AnalyticQuestion
        }
    }

    /// The active keyword set (lower-cased).
    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }
}

impl Default for Router {
    fn default() -> Self {
        Self::from_config(&RouterConfig::default())
    }
}
