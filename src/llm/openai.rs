/// Chat-completions client for OpenAI-compatible APIs (OpenAI, Groq).
///
/// Sends `POST {base_url}/chat/completions` with
/// `{model, messages, temperature, max_tokens}` and a bearer token, and
/// reads `choices[0].message.content`. Only HTTP 200 counts as success.
use std::time::Duration;

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};

use super::provider::{ChatMessage, CompletionRequest, Provider};

/// Request body for `POST /chat/completions`.
#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    temperature: f64,
    max_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

/// Synchronous chat-completions client.
#[derive(Debug)]
pub struct ChatCompletionsClient {
    label: String,
    base_url: String,
    model: String,
    api_key: String,
    timeout: Duration,
    temperature: f64,
    max_tokens: u32,
}

impl ChatCompletionsClient {
    pub fn new(
        label: String,
        base_url: String,
        model: String,
        api_key: String,
        timeout: Duration,
        temperature: f64,
        max_tokens: u32,
    ) -> Self {
        Self {
            label,
            base_url: base_url.trim_end_matches('/').to_string(),
            model,
            api_key,
            timeout,
            temperature,
            max_tokens,
        }
    }

    fn auth_header(&self) -> String {
        format!("Bearer {}", self.api_key)
    }
}

impl Provider for ChatCompletionsClient {
    fn name(&self) -> String {
        format!("{}:{}", self.label, self.model)
    }

    fn complete(&self, request: &CompletionRequest<'_>) -> Result<String> {
        let url = format!("{}/chat/completions", self.base_url);
        let messages = request.messages();
        let body = ChatRequest {
            model: &self.model,
            messages: &messages,
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        };

        let resp = ureq::post(&url)
            .timeout(self.timeout)
            .set("Authorization", &self.auth_header())
            .send_json(&body)
            .with_context(|| format!("{} chat request failed", self.label))?;

        if resp.status() != 200 {
            bail!("{} returned HTTP {}", self.label, resp.status());
        }

        let parsed: ChatResponse = resp
            .into_json()
            .with_context(|| format!("failed to parse {} chat response", self.label))?;

        let content = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .unwrap_or_default();

        if content.trim().is_empty() {
            bail!("{} returned an empty response", self.label);
        }

        Ok(content)
    }

    fn is_reachable(&self) -> bool {
        let url = format!("{}/models", self.base_url);
        ureq::get(&url)
            .timeout(Duration::from_secs(5))
            .set("Authorization", &self.auth_header())
            .call()
            .is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_body_matches_contract() {
        let messages = vec![ChatMessage::system("s"), ChatMessage::user("q")];
        let body = ChatRequest {
            model: "gpt-4o-mini",
            messages: &messages,
            temperature: 0.3,
            max_tokens: 1500,
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["model"], "gpt-4o-mini");
        assert_eq!(json["messages"][1]["role"], "user");
        assert_eq!(json["max_tokens"], 1500);
    }

    #[test]
    fn response_content_is_optional() {
        let parsed: ChatResponse =
            serde_json::from_str(r#"{"choices":[{"message":{"content":null}}]}"#).unwrap();
        assert!(parsed.choices[0].message.content.is_none());

        let parsed: ChatResponse = serde_json::from_str("{}").unwrap();
        assert!(parsed.choices.is_empty());
    }

    #[test]
    fn base_url_trailing_slash_is_stripped() {
        let client = ChatCompletionsClient::new(
            "openai".to_string(),
            "https://api.openai.com/v1/".to_string(),
            "m".to_string(),
            "k".to_string(),
            Duration::from_secs(1),
            0.0,
            10,
        );
        assert_eq!(client.base_url, "https://api.openai.com/v1");
        assert_eq!(client.name(), "openai:m");
    }
}
