//! Conversation session: the per-dataset chat history.
//!
//! A [`Session`] is owned by the interaction loop (the CLI chat loop or the
//! web server) and passed by `&mut` to each handler. History is append-only;
//! switching dataset or clearing consumes the session and hands back a fresh
//! one, so no message from the old context can leak into the new one.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Who wrote a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::User => write!(f, "user"),
            Self::Assistant => write!(f, "assistant"),
        }
    }
}

/// One chat message. Assistant content is stored raw (with any chart block
/// or dashboard marker) and parsed again on display.
#[derive(Debug, Clone, Serialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

/// Conversation state scoped to one dataset.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Session {
    dataset_id: String,
    messages: Vec<Message>,
}

impl Session {
    pub fn new(dataset_id: impl Into<String>) -> Self {
        Self {
            dataset_id: dataset_id.into(),
            messages: Vec::new(),
        }
    }

    pub fn dataset_id(&self) -> &str {
        &self.dataset_id
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn push_user(&mut self, content: impl Into<String>) {
        self.push(Role::User, content.into());
    }

    pub fn push_assistant(&mut self, content: impl Into<String>) {
        self.push(Role::Assistant, content.into());
    }

    fn push(&mut self, role: Role, content: String) {
        self.messages.push(Message {
            role,
            content,
            timestamp: Utc::now(),
        });
    }

    /// Start over on another dataset. History never carries over.
    pub fn switch_dataset(self, dataset_id: impl Into<String>) -> Session {
        Session::new(dataset_id)
    }

    /// Start over on the same dataset.
    pub fn clear(self) -> Session {
        Session::new(self.dataset_id)
    }
}
