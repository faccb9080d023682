/// Ollama HTTP API client.
///
/// Talks to a local Ollama instance (default `localhost:11434`) with the
/// synchronous `ureq` client. Uses `/api/chat` so Ollama applies the right
/// chat template for whichever model is loaded.
use std::time::Duration;

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};

use super::provider::{ChatMessage, CompletionRequest, Provider};

// ---------------------------------------------------------------------------
// Request / response types for the Ollama API
// ---------------------------------------------------------------------------

/// Request body for `POST /api/chat`.
#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    stream: bool,
    options: ChatOptions,
}

#[derive(Debug, Serialize)]
struct ChatOptions {
    temperature: f64,
    /// Maximum number of tokens in the response.
    num_predict: u32,
}

/// Response body from `POST /api/chat` (non-streaming).
#[derive(Debug, Deserialize)]
struct ChatResponse {
    message: ChatResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    content: String,
}

/// Response body from `GET /api/tags`.
#[derive(Debug, Deserialize)]
struct TagsResponse {
    #[serde(default)]
    models: Vec<serde_json::Value>,
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub struct OllamaClient {
    base_url: String,
    model: String,
    timeout: Duration,
    temperature: f64,
    max_tokens: u32,
}

impl OllamaClient {
    pub fn new(
        base_url: String,
        model: String,
        timeout: Duration,
        temperature: f64,
        max_tokens: u32,
    ) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            model,
            timeout,
            temperature,
            max_tokens,
        }
    }

    /// `localhost` may resolve to `::1` first while Ollama binds IPv4 only.
    fn endpoint(&self, path: &str) -> String {
        format!("{}{path}", self.base_url).replace("://localhost", "://127.0.0.1")
    }
}

impl Provider for OllamaClient {
    fn name(&self) -> String {
        format!("ollama:{}", self.model)
    }

    fn complete(&self, request: &CompletionRequest<'_>) -> Result<String> {
        let messages = request.messages();
        let body = ChatRequest {
            model: &self.model,
            messages: &messages,
            stream: false,
            options: ChatOptions {
                temperature: self.temperature,
                num_predict: self.max_tokens,
            },
        };

        let resp = ureq::post(&self.endpoint("/api/chat"))
            .timeout(self.timeout)
            .send_json(&body)
            .context("Ollama chat request failed")?;

        let parsed: ChatResponse = resp
            .into_json()
            .context("failed to parse Ollama chat response")?;

        if parsed.message.content.trim().is_empty() {
            bail!("Ollama returned an empty response");
        }

        Ok(parsed.message.content)
    }

    /// Reachable and at least one model pulled.
    fn is_reachable(&self) -> bool {
        match ureq::get(&self.endpoint("/api/tags"))
            .timeout(Duration::from_secs(5))
            .call()
        {
            Ok(resp) => resp
                .into_json::<TagsResponse>()
                .map(|tags| !tags.models.is_empty())
                .unwrap_or(false),
            Err(_) => false,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn client(base: &str) -> OllamaClient {
        OllamaClient::new(
            base.to_string(),
            "llama3.2:3b".to_string(),
            Duration::from_secs(30),
            0.3,
            1500,
        )
    }

    #[test]
    fn localhost_is_rewritten_to_ipv4() {
        let client = client("http://localhost:11434/");
        assert_eq!(client.endpoint("/api/chat"), "http://127.0.0.1:11434/api/chat");
    }

    #[test]
    fn request_disables_streaming() {
        let messages = vec![ChatMessage::user("q")];
        let body = ChatRequest {
            model: "m",
            messages: &messages,
            stream: false,
            options: ChatOptions {
                temperature: 0.3,
                num_predict: 1500,
            },
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["stream"], false);
        assert_eq!(json["options"]["num_predict"], 1500);
    }

    #[test]
    fn name_includes_model() {
        assert_eq!(client("http://x").name(), "ollama:llama3.2:3b");
    }
}
