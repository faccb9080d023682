/// Configuration schema and defaults for datachat.
///
/// Defines the TOML-serializable configuration structure with the sections
/// `[provider]`, `[router]`, `[parser]`, `[datasets]`, `[server]` and
/// `[logging]`.
///
/// Every field has a built-in default. Users only need to set the values
/// they want to override.
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// Top-level datachat configuration.
///
/// Maps directly to `~/.datachat/config.toml` and `.datachat.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DatachatConfig {
    pub provider: ProviderConfig,
    pub router: RouterConfig,
    pub parser: ParserConfig,
    pub datasets: DatasetsConfig,
    pub server: ServerConfig,
    pub logging: LoggingConfig,
}

// ---------------------------------------------------------------------------
// [provider]
// ---------------------------------------------------------------------------

/// Which text-completion backend answers analytic questions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProviderKind {
    /// OpenAI chat completions.
    #[default]
    Openai,
    /// Groq's OpenAI-compatible chat completions.
    Groq,
    /// Local Ollama `/api/chat`.
    Ollama,
    /// Automation webhook (question in, insight out).
    Webhook,
    /// Never call out; always answer from the local simulator.
    Simulated,
}

impl ProviderKind {
    /// Default base URL for the provider's HTTP API.
    pub fn default_base_url(self) -> &'static str {
        match self {
            Self::Openai => "https://api.openai.com/v1",
            Self::Groq => "https://api.groq.com/openai/v1",
            Self::Ollama => "http://localhost:11434",
            Self::Webhook | Self::Simulated => "",
        }
    }

    /// Default model for the provider.
    pub fn default_model(self) -> &'static str {
        match self {
            Self::Openai => "gpt-4o-mini",
            Self::Groq => "llama-3.3-70b-versatile",
            Self::Ollama => "llama3.2:3b",
            Self::Webhook | Self::Simulated => "",
        }
    }
}

impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Openai => write!(f, "openai"),
            Self::Groq => write!(f, "groq"),
            Self::Ollama => write!(f, "ollama"),
            Self::Webhook => write!(f, "webhook"),
            Self::Simulated => write!(f, "simulated"),
        }
    }
}

/// AI provider settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    /// Backend: `openai`, `groq`, `ollama`, `webhook`, `simulated`.
    pub kind: ProviderKind,
    /// Model name. Empty means the provider's default.
    pub model: String,
    /// API base URL. Empty means the provider's default.
    pub base_url: String,
    /// Bearer token for chat-completions providers.
    /// Prefer `DATACHAT_API_KEY` over writing the key to disk.
    pub api_key: String,
    /// Endpoint for the `webhook` provider.
    pub webhook_url: String,
    /// Upper bound on a single provider call (seconds).
    pub timeout_secs: u64,
    /// Sampling temperature.
    pub temperature: f64,
    /// Maximum tokens in the completion.
    pub max_tokens: u32,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            kind: ProviderKind::default(),
            model: String::new(),
            base_url: String::new(),
            api_key: String::new(),
            webhook_url: String::new(),
            timeout_secs: 30,
            temperature: 0.3,
            max_tokens: 1500,
        }
    }
}

impl ProviderConfig {
    /// Model name with the provider default filled in.
    pub fn effective_model(&self) -> String {
        if self.model.trim().is_empty() {
            self.kind.default_model().to_string()
        } else {
            self.model.clone()
        }
    }

    /// Base URL with the provider default filled in, trailing slash removed.
    pub fn effective_base_url(&self) -> String {
        let url = if self.base_url.trim().is_empty() {
            self.kind.default_base_url()
        } else {
            self.base_url.as_str()
        };
        url.trim_end_matches('/').to_string()
    }
}

// ---------------------------------------------------------------------------
// [router]
// ---------------------------------------------------------------------------

/// Question routing settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RouterConfig {
    /// Case-insensitive substrings that mark a question as a dashboard request.
    pub dashboard_keywords: Vec<String>,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            dashboard_keywords: vec![
                "dashboard".to_string(),
                "power bi".to_string(),
                "powerbi".to_string(),
                "interactive".to_string(),
                "full view".to_string(),
            ],
        }
    }
}

// ---------------------------------------------------------------------------
// [parser]
// ---------------------------------------------------------------------------

/// Response parsing settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserConfig {
    /// Drop follow-up suggestions phrased about the user ("would you like ...").
    pub reject_second_person: bool,
    /// Maximum follow-up suggestions kept per reply.
    pub max_followups: usize,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            reject_second_person: true,
            max_followups: 3,
        }
    }
}

// ---------------------------------------------------------------------------
// [datasets]
// ---------------------------------------------------------------------------

/// Dataset registry source.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DatasetsConfig {
    /// Path to a registry TOML file. Empty uses the built-in sample registry.
    pub path: String,
}

// ---------------------------------------------------------------------------
// [server]
// ---------------------------------------------------------------------------

/// Web UI settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub addr: String,
    /// Open the UI in the default browser on start.
    pub open_browser: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: "127.0.0.1:8501".to_string(),
            open_browser: true,
        }
    }
}

// ---------------------------------------------------------------------------
// [logging]
// ---------------------------------------------------------------------------

/// Interaction log settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Append one JSONL line per answered question to `~/.datachat/interactions.jsonl`.
    pub enabled: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

// ---------------------------------------------------------------------------
// Default TOML content
// ---------------------------------------------------------------------------

impl DatachatConfig {
    /// Generate the annotated default TOML config file content.
    pub fn default_toml() -> String {
        r#"# datachat configuration
#
# Configuration hierarchy (highest precedence wins):
#   1. Environment variables (DATACHAT_*)
#   2. Project config (.datachat.toml in current directory)
#   3. User global config (~/.datachat/config.toml)
#   4. Built-in defaults

[provider]
kind = "openai"        # openai | groq | ollama | webhook | simulated
model = ""             # empty = provider default
base_url = ""          # empty = provider default
api_key = ""           # prefer DATACHAT_API_KEY
webhook_url = ""       # used when kind = "webhook"
timeout_secs = 30
temperature = 0.3
max_tokens = 1500

[router]
dashboard_keywords = ["dashboard", "power bi", "powerbi", "interactive", "full view"]

[parser]
reject_second_person = true
max_followups = 3

[datasets]
path = ""              # empty = built-in sample registry

[server]
addr = "127.0.0.1:8501"
open_browser = true

[logging]
enabled = true
"#
        .to_string()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
