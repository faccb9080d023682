//! JSON API handlers for the web chat.
//!
//! Each handler corresponds to an API endpoint and returns a
//! `Response<Cursor<Vec<u8>>>` with JSON content. Client mistakes (bad JSON,
//! blank question, unknown dataset) are answered with 400.

use std::io::Cursor;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tiny_http::{Response, StatusCode};

use crate::analytics::logger;
use crate::assistant::Rendered;
use crate::config;
use crate::session::Role;

use super::{WebState, content_type_json, error_response};

// ---------------------------------------------------------------------------
// JSON request / response types
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct DatasetsResponse<'a> {
    active: &'a str,
    datasets: Vec<DatasetSummary<'a>>,
}

#[derive(Serialize)]
struct DatasetSummary<'a> {
    id: &'a str,
    name: &'a str,
    summary: &'a str,
    stats: usize,
    dashboards: usize,
}

#[derive(Serialize)]
struct SessionResponse<'a> {
    dataset_id: &'a str,
    dataset_name: &'a str,
    messages: Vec<MessageView>,
}

/// One history entry as the frontend draws it.
#[derive(Serialize)]
struct MessageView {
    role: Role,
    timestamp: DateTime<Utc>,
    /// Raw text for user messages, cleaned text for assistant messages.
    display: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    rendered: Option<Rendered>,
}

#[derive(Deserialize)]
struct DatasetRequest {
    dataset_id: String,
}

#[derive(Deserialize)]
struct AskRequest {
    question: String,
}

#[derive(Serialize)]
struct HealthResponse {
    version: &'static str,
    provider: String,
    reachable: bool,
    /// Why the configured provider is not in use.
    #[serde(skip_serializing_if = "Option::is_none")]
    provider_issue: Option<String>,
    datasets: usize,
    config_exists: bool,
    log_exists: bool,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn json_response<T: Serialize>(data: &T) -> Result<Response<Cursor<Vec<u8>>>> {
    let body = serde_json::to_string(data).context("failed to serialize JSON response")?;
    Ok(Response::from_data(body.into_bytes())
        .with_header(content_type_json())
        .with_status_code(StatusCode(200)))
}

fn session_response(state: &WebState) -> Result<Response<Cursor<Vec<u8>>>> {
    let session = &state.session;
    let Some(dataset) = state.assistant.registry().get(session.dataset_id()) else {
        return Ok(error_response(
            404,
            &format!("unknown dataset '{}'", session.dataset_id()),
        ));
    };

    let messages = session
        .messages()
        .iter()
        .map(|m| match m.role {
            Role::User => MessageView {
                role: m.role,
                timestamp: m.timestamp,
                display: m.content.clone(),
                rendered: None,
            },
            Role::Assistant => {
                let rendered = state.assistant.render(dataset, &m.content);
                MessageView {
                    role: m.role,
                    timestamp: m.timestamp,
                    display: rendered.display.clone(),
                    rendered: Some(rendered),
                }
            }
        })
        .collect();

    json_response(&SessionResponse {
        dataset_id: &dataset.id,
        dataset_name: &dataset.name,
        messages,
    })
}

// ---------------------------------------------------------------------------
// API Handlers
// ---------------------------------------------------------------------------

/// `GET /api/datasets`: registered datasets and the active one.
pub fn get_datasets(state: &WebState) -> Result<Response<Cursor<Vec<u8>>>> {
    let datasets = state
        .assistant
        .registry()
        .datasets()
        .iter()
        .map(|d| DatasetSummary {
            id: &d.id,
            name: &d.name,
            summary: &d.summary,
            stats: d.stats.len(),
            dashboards: d.dashboards.len(),
        })
        .collect();

    json_response(&DatasetsResponse {
        active: state.session.dataset_id(),
        datasets,
    })
}

/// `GET /api/session`: active dataset and rendered history.
pub fn get_session(state: &WebState) -> Result<Response<Cursor<Vec<u8>>>> {
    session_response(state)
}

/// `POST /api/session/dataset`: switch dataset; history starts empty.
///
/// Expects JSON body: `{ "dataset_id": "sample_sales" }`
pub fn post_session_dataset(state: &mut WebState, body: &str) -> Result<Response<Cursor<Vec<u8>>>> {
    let req: DatasetRequest = match serde_json::from_str(body) {
        Ok(req) => req,
        Err(e) => return Ok(error_response(400, &format!("invalid request: {e}"))),
    };

    if let Err(e) = state
        .assistant
        .switch_dataset(&mut state.session, &req.dataset_id)
    {
        return Ok(error_response(400, &format!("{e:#}")));
    }

    session_response(state)
}

/// `POST /api/session/clear`: drop the history, keep the dataset.
pub fn post_session_clear(state: &mut WebState) -> Result<Response<Cursor<Vec<u8>>>> {
    state.session = std::mem::take(&mut state.session).clear();
    session_response(state)
}

/// `POST /api/ask`: handle one question.
///
/// Expects JSON body: `{ "question": "..." }`
pub fn post_ask(state: &mut WebState, body: &str) -> Result<Response<Cursor<Vec<u8>>>> {
    let req: AskRequest = match serde_json::from_str(body) {
        Ok(req) => req,
        Err(e) => return Ok(error_response(400, &format!("invalid request: {e}"))),
    };

    match state.assistant.handle(&mut state.session, &req.question) {
        Ok(reply) => json_response(&reply),
        Err(e) => Ok(error_response(400, &format!("{e:#}"))),
    }
}

/// `GET /api/health`: provider and environment summary.
///
/// The provider probe result is cached on the state, so repeated page loads
/// don't each wait on the network.
pub fn get_health(state: &mut WebState) -> Result<Response<Cursor<Vec<u8>>>> {
    let reachable = state.provider_reachable();
    let gateway = state.assistant.gateway();

    let resp = HealthResponse {
        version: env!("CARGO_PKG_VERSION"),
        provider: gateway.provider_name(),
        reachable,
        provider_issue: gateway.unavailable_reason().map(str::to_string),
        datasets: state.assistant.registry().datasets().len(),
        config_exists: config::global_config_file()
            .map(|p| p.exists())
            .unwrap_or(false),
        log_exists: logger::interaction_log_path()
            .map(|p| p.exists())
            .unwrap_or(false),
    };

    json_response(&resp)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assistant::Assistant;
    use crate::datasets::Registry;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use crate::llm::{CompletionRequest, Gateway, Provider};
    use crate::parser::ResponseParser;
    use crate::router::Router;

    fn state() -> WebState {
        let assistant = Assistant::new(
            Registry::builtin().unwrap(),
            Router::default(),
            Gateway::simulated(),
            ResponseParser::default(),
        );
        WebState::new(assistant, Some("singapore_flat_resale")).unwrap()
    }

    #[test]
    fn switching_dataset_resets_history() {
        let mut state = state();
        post_ask(&mut state, r#"{"question":"hello?"}"#).unwrap();
        assert!(!state.session.is_empty());

        let resp = post_session_dataset(&mut state, r#"{"dataset_id":"sample_sales"}"#).unwrap();
        assert_eq!(resp.status_code(), StatusCode(200));
        assert_eq!(state.session.dataset_id(), "sample_sales");
        assert!(state.session.is_empty());
    }

    #[test]
    fn unknown_dataset_is_400_and_keeps_session() {
        let mut state = state();
        post_ask(&mut state, r#"{"question":"hello?"}"#).unwrap();

        let resp = post_session_dataset(&mut state, r#"{"dataset_id":"nope"}"#).unwrap();
        assert_eq!(resp.status_code(), StatusCode(400));
        assert_eq!(state.session.dataset_id(), "singapore_flat_resale");
        assert_eq!(state.session.messages().len(), 2);
    }

    #[test]
    fn blank_question_is_400() {
        let mut state = state();
        let resp = post_ask(&mut state, r#"{"question":"  "}"#).unwrap();
        assert_eq!(resp.status_code(), StatusCode(400));
        assert!(state.session.is_empty());
    }

    #[test]
    fn malformed_body_is_400() {
        let mut state = state();
        let resp = post_ask(&mut state, "not json").unwrap();
        assert_eq!(resp.status_code(), StatusCode(400));
    }

    #[test]
    fn clear_keeps_dataset() {
        let mut state = state();
        post_ask(&mut state, r#"{"question":"hello?"}"#).unwrap();
        post_session_clear(&mut state).unwrap();
        assert!(state.session.is_empty());
        assert_eq!(state.session.dataset_id(), "singapore_flat_resale");
    }

    /// Provider that counts reachability probes.
    struct Probed(Arc<AtomicUsize>);

    impl Provider for Probed {
        fn name(&self) -> String {
            "probed".to_string()
        }

        fn complete(&self, _request: &CompletionRequest<'_>) -> anyhow::Result<String> {
            Ok("fine".to_string())
        }

        fn is_reachable(&self) -> bool {
            self.0.fetch_add(1, Ordering::SeqCst);
            true
        }
    }

    #[test]
    fn health_reuses_recent_probe() {
        let probes = Arc::new(AtomicUsize::new(0));
        let assistant = Assistant::new(
            Registry::builtin().unwrap(),
            Router::default(),
            Gateway::with_provider(Box::new(Probed(Arc::clone(&probes)))),
            ResponseParser::default(),
        );
        let mut state = WebState::new(assistant, None).unwrap();

        for _ in 0..3 {
            let resp = get_health(&mut state).unwrap();
            assert_eq!(resp.status_code(), StatusCode(200));
        }
        assert_eq!(probes.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn message_view_skips_rendered_for_user() {
        let view = MessageView {
            role: Role::User,
            timestamp: Utc::now(),
            display: "hi".to_string(),
            rendered: None,
        };
        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["role"], "user");
        assert!(json.get("rendered").is_none());
    }
}
