//! Provider abstraction: one implementation per text-completion backend.
//!
//! The gateway only sees [`Provider`]; which implementation sits behind it
//! is decided once from `[provider] kind` by [`from_config`].

use std::time::Duration;

use anyhow::{Result, bail};
use serde::{Deserialize, Serialize};

use crate::config::schema::{ProviderConfig, ProviderKind};
use crate::datasets::Dataset;

use super::ollama::OllamaClient;
use super::openai::ChatCompletionsClient;
use super::webhook::WebhookClient;

/// A single message in a chat conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// Everything a provider may need to answer one question.
#[derive(Debug, Clone)]
pub struct CompletionRequest<'a> {
    /// Fully rendered system prompt (stats + formatting rules).
    pub system: String,
    pub question: &'a str,
    pub dataset: &'a Dataset,
}

impl CompletionRequest<'_> {
    /// `[system, user]` transcript for chat-style APIs.
    pub fn messages(&self) -> Vec<ChatMessage> {
        vec![
            ChatMessage::system(self.system.clone()),
            ChatMessage::user(self.question),
        ]
    }
}

/// A text-completion backend.
pub trait Provider: Send {
    /// Short name for logs (`"openai:gpt-4o-mini"`, `"webhook"`, ...).
    fn name(&self) -> String;

    /// Answer the request. Any error makes the gateway fall back to the
    /// simulated response.
    fn complete(&self, request: &CompletionRequest<'_>) -> Result<String>;

    /// Best-effort reachability probe for `datachat health`.
    fn is_reachable(&self) -> bool {
        true
    }
}

/// Build the configured provider.
///
/// Returns `Ok(None)` for the `simulated` kind and `Err` with a reason when
/// the selected provider is missing required settings.
pub fn from_config(config: &ProviderConfig) -> Result<Option<Box<dyn Provider>>> {
    let timeout = Duration::from_secs(config.timeout_secs.max(1));

    match config.kind {
        ProviderKind::Openai | ProviderKind::Groq => {
            if config.api_key.trim().is_empty() {
                bail!("no API key configured for {} (set DATACHAT_API_KEY)", config.kind);
            }
            Ok(Some(Box::new(ChatCompletionsClient::new(
                config.kind.to_string(),
                config.effective_base_url(),
                config.effective_model(),
                config.api_key.clone(),
                timeout,
                config.temperature,
                config.max_tokens,
            ))))
        }
        ProviderKind::Ollama => Ok(Some(Box::new(OllamaClient::new(
            config.effective_base_url(),
            config.effective_model(),
            timeout,
            config.temperature,
            config.max_tokens,
        )))),
        ProviderKind::Webhook => {
            let url = config.webhook_url.trim();
            if url.is_empty() || url.contains("YOUR_WEBHOOK") {
                bail!("no webhook URL configured (set DATACHAT_WEBHOOK_URL)");
            }
            Ok(Some(Box::new(WebhookClient::new(url.to_string(), timeout))))
        }
        ProviderKind::Simulated => Ok(None),
    }
}
