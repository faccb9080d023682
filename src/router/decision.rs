//! Router decision types.
//!
//! Defines the intent the router assigns to a question and how it is shown
//! in logs and the CLI.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The router's classification of a user question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    /// The user wants to see the dataset's embedded dashboard.
    DashboardRequest,
    /// A general question answered by the AI gateway.
    AnalyticQuestion,
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DashboardRequest => write!(f, "dashboard"),
            Self::AnalyticQuestion => write!(f, "analytic"),
        }
    }
}
