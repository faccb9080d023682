/// AI gateway: forwards analytic questions to a text-completion provider.
///
/// The gateway wraps one [`Provider`] chosen from `[provider] kind`:
///
/// - `openai` / `groq`: chat-completions APIs ([`openai`])
/// - `ollama`: a local Ollama instance ([`ollama`])
/// - `webhook`: an automation workflow URL ([`webhook`])
/// - `simulated`: no network at all ([`simulate`])
///
/// # Fallback
///
/// [`Gateway::ask`] never fails. A missing API key, transport error,
/// timeout, non-200 status or empty body is logged to stderr and answered
/// with the local simulated response instead, so the user always gets a
/// reply. The reason is carried on the [`Answer`] for the interaction log.
use std::time::Instant;

use crate::config::schema::ProviderConfig;
use crate::datasets::Dataset;

pub mod ollama;
pub mod openai;
pub mod prompts;
pub mod provider;
pub mod simulate;
pub mod webhook;

pub use provider::{ChatMessage, CompletionRequest, Provider};

/// Provider name reported for local answers.
pub const SIMULATED: &str = "simulated";

/// Outcome of one gateway call.
#[derive(Debug, Clone)]
pub struct Answer {
    /// Raw response text, never empty.
    pub text: String,
    /// Provider that produced `text`.
    pub provider: String,
    /// `true` when a configured provider failed and the simulated answer
    /// was substituted.
    pub fallback: bool,
    pub latency_ms: u64,
    /// Why the configured provider was not used, if it wasn't.
    pub error: Option<String>,
}

pub struct Gateway {
    provider: Option<Box<dyn Provider>>,
    /// Set when the configured provider could not even be constructed.
    unavailable: Option<String>,
}

impl Gateway {
    /// Build the gateway for the configured provider. Configuration
    /// problems are remembered, not returned: the gateway degrades to
    /// simulated answers.
    pub fn from_config(config: &ProviderConfig) -> Self {
        match provider::from_config(config) {
            Ok(provider) => Self {
                provider,
                unavailable: None,
            },
            Err(e) => Self {
                provider: None,
                unavailable: Some(format!("{e:#}")),
            },
        }
    }

    pub fn with_provider(provider: Box<dyn Provider>) -> Self {
        Self {
            provider: Some(provider),
            unavailable: None,
        }
    }

    /// A gateway that only ever answers locally.
    pub fn simulated() -> Self {
        Self {
            provider: None,
            unavailable: None,
        }
    }

    pub fn provider_name(&self) -> String {
        self.provider
            .as_ref()
            .map(|p| p.name())
            .unwrap_or_else(|| SIMULATED.to_string())
    }

    /// Configuration problem that forced simulated mode, if any.
    pub fn unavailable_reason(&self) -> Option<&str> {
        self.unavailable.as_deref()
    }

    /// Probe the provider. Simulated mode is always reachable.
    pub fn is_reachable(&self) -> bool {
        self.provider.as_ref().is_none_or(|p| p.is_reachable())
    }

    /// Answer `question` about `dataset`. Always returns non-empty text.
    pub fn ask(&self, question: &str, dataset: &Dataset) -> Answer {
        let start = Instant::now();

        let Some(provider) = &self.provider else {
            if let Some(reason) = &self.unavailable {
                eprintln!("[datachat] {reason}; using simulated response");
            }
            return Answer {
                text: simulate::simulate_answer(question, dataset),
                provider: SIMULATED.to_string(),
                fallback: self.unavailable.is_some(),
                latency_ms: start.elapsed().as_millis() as u64,
                error: self.unavailable.clone(),
            };
        };

        let request = CompletionRequest {
            system: prompts::build_system_prompt(dataset),
            question,
            dataset,
        };

        let (text, fallback, error) = match provider.complete(&request) {
            Ok(text) if !text.trim().is_empty() => (text, false, None),
            Ok(_) => fallback_for(question, dataset, &provider.name(), "empty response"),
            Err(e) => fallback_for(question, dataset, &provider.name(), &format!("{e:#}")),
        };

        Answer {
            text,
            provider: if fallback {
                SIMULATED.to_string()
            } else {
                provider.name()
            },
            fallback,
            latency_ms: start.elapsed().as_millis() as u64,
            error,
        }
    }
}

fn fallback_for(
    question: &str,
    dataset: &Dataset,
    provider: &str,
    reason: &str,
) -> (String, bool, Option<String>) {
    eprintln!("[datachat] {provider} failed: {reason}; using simulated response");
    (
        simulate::simulate_answer(question, dataset),
        true,
        Some(format!("{provider}: {reason}")),
    )
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
