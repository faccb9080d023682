//! Embedded web chat for datachat.
//!
//! A lightweight HTTP server (sync, via `tiny_http`) that serves:
//! - A single-page chat UI with dataset picker, charts and dashboard embeds
//! - JSON API endpoints for datasets, the session, questions and health
//!
//! Launched via `datachat serve` (default: `http://127.0.0.1:8501`).

mod api;
mod frontend;

use std::io::Cursor;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use tiny_http::{Header, Method, Response, Server, StatusCode};

use crate::assistant::Assistant;
use crate::session::Session;

/// How long a provider reachability probe result is reused.
const REACHABILITY_TTL: Duration = Duration::from_secs(60);

/// Everything the request loop owns: the assistant and the one session.
pub struct WebState {
    assistant: Assistant,
    session: Session,
    /// Last provider probe, so health checks don't block the loop each time.
    reachability: Option<(Instant, bool)>,
}

impl WebState {
    /// Start on `dataset_id`, or on the first registered dataset.
    pub fn new(assistant: Assistant, dataset_id: Option<&str>) -> Result<Self> {
        let session = assistant.start_session(dataset_id)?;
        Ok(Self {
            assistant,
            session,
            reachability: None,
        })
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Provider reachability, probed at most once per [`REACHABILITY_TTL`].
    fn provider_reachable(&mut self) -> bool {
        if let Some((checked, reachable)) = self.reachability
            && checked.elapsed() < REACHABILITY_TTL
        {
            return reachable;
        }
        let reachable = self.assistant.gateway().is_reachable();
        self.reachability = Some((Instant::now(), reachable));
        reachable
    }
}

// ---------------------------------------------------------------------------
// Server entry point
// ---------------------------------------------------------------------------

/// Bind `addr` and serve until the process is stopped.
pub fn serve(addr: &str, state: WebState, open: bool) -> Result<()> {
    let server = Server::http(addr)
        .map_err(|e| anyhow::anyhow!("failed to start HTTP server on {addr}: {e}"))?;

    println!("datachat running at http://{addr}");
    println!("Press Ctrl+C to stop.\n");

    if open {
        let url = format!("http://{addr}");
        if let Err(e) = open_browser(&url) {
            eprintln!("[datachat] {e:#}");
        }
    }

    run(server, state);
    Ok(())
}

/// Handle requests from an already-bound server, one at a time.
///
/// Errors are answered per request; the loop only ends when the server
/// stops yielding requests.
pub fn run(server: Server, mut state: WebState) {
    for mut request in server.incoming_requests() {
        let method = request.method().clone();
        let url = request.url().to_string();

        // Read body up-front for methods that carry one
        let body = if matches!(method, Method::Put | Method::Post | Method::Patch) {
            let mut buf = String::new();
            let _ = request.as_reader().read_to_string(&mut buf);
            Some(buf)
        } else {
            None
        };

        let resp = match dispatch(&mut state, &method, &url, body.as_deref()) {
            Ok(resp) => resp,
            Err(e) => {
                eprintln!("[datachat] {method} {url}: {e:#}");
                error_response(500, &format!("{e:#}"))
            }
        };
        let _ = request.respond(resp);

        // Brief access log
        println!(
            "{} {} {}",
            method,
            url,
            chrono::Local::now().format("%H:%M:%S")
        );
    }
}

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

fn dispatch(
    state: &mut WebState,
    method: &Method,
    url: &str,
    body: Option<&str>,
) -> Result<Response<Cursor<Vec<u8>>>> {
    // Strip query string for path matching
    let path = url.split('?').next().unwrap_or(url);

    match (method, path) {
        (&Method::Get, "/") | (&Method::Get, "/index.html") => Ok(serve_frontend()),

        (&Method::Get, "/api/datasets") => api::get_datasets(state),
        (&Method::Get, "/api/session") => api::get_session(state),
        (&Method::Post, "/api/session/dataset") => {
            api::post_session_dataset(state, body.unwrap_or("{}"))
        }
        (&Method::Post, "/api/session/clear") => api::post_session_clear(state),
        (&Method::Post, "/api/ask") => api::post_ask(state, body.unwrap_or("{}")),
        (&Method::Get, "/api/health") => api::get_health(state),

        _ => Ok(error_response(404, "not found")),
    }
}

// ---------------------------------------------------------------------------
// Response helpers
// ---------------------------------------------------------------------------

fn serve_frontend() -> Response<Cursor<Vec<u8>>> {
    Response::from_data(frontend::INDEX_HTML.as_bytes().to_vec())
        .with_header(content_type_html())
        .with_status_code(StatusCode(200))
}

/// `{"error": message}` with the given status.
pub(crate) fn error_response(status: u16, message: &str) -> Response<Cursor<Vec<u8>>> {
    let body = serde_json::json!({ "error": message }).to_string();
    Response::from_data(body.into_bytes())
        .with_header(content_type_json())
        .with_status_code(StatusCode(status))
}

pub(crate) fn content_type_json() -> Header {
    header("Content-Type", "application/json; charset=utf-8")
}

fn content_type_html() -> Header {
    header("Content-Type", "text/html; charset=utf-8")
}

fn header(name: &str, value: &str) -> Header {
    Header::from_bytes(name.as_bytes(), value.as_bytes())
        .expect("static header must be valid ASCII")
}

/// Attempt to open a URL in the system default browser.
fn open_browser(url: &str) -> Result<()> {
    #[cfg(target_os = "windows")]
    {
        std::process::Command::new("cmd")
            .args(["/C", "start", url])
            .spawn()
            .context("failed to open browser")?;
    }

    #[cfg(target_os = "macos")]
    {
        std::process::Command::new("open")
            .arg(url)
            .spawn()
            .context("failed to open browser")?;
    }

    #[cfg(target_os = "linux")]
    {
        std::process::Command::new("xdg-open")
            .arg(url)
            .spawn()
            .context("failed to open browser")?;
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datasets::Registry;
    use crate::llm::Gateway;
    use crate::parser::ResponseParser;
    use crate::router::Router;

    fn state() -> WebState {
        let assistant = Assistant::new(
            Registry::builtin().unwrap(),
            Router::default(),
            Gateway::simulated(),
            ResponseParser::default(),
        );
        WebState::new(assistant, None).unwrap()
    }

    #[test]
    fn routes_known_paths() {
        let mut state = state();
        let resp = dispatch(&mut state, &Method::Get, "/", None).unwrap();
        assert_eq!(resp.status_code(), StatusCode(200));

        let resp = dispatch(&mut state, &Method::Get, "/api/datasets?x=1", None).unwrap();
        assert_eq!(resp.status_code(), StatusCode(200));
    }

    #[test]
    fn unknown_path_is_404() {
        let mut state = state();
        let resp = dispatch(&mut state, &Method::Get, "/nope", None).unwrap();
        assert_eq!(resp.status_code(), StatusCode(404));
    }

    #[test]
    fn ask_appends_to_owned_session() {
        let mut state = state();
        let resp = dispatch(
            &mut state,
            &Method::Post,
            "/api/ask",
            Some(r#"{"question":"what is the average price?"}"#),
        )
        .unwrap();
        assert_eq!(resp.status_code(), StatusCode(200));
        assert_eq!(state.session().messages().len(), 2);
    }
}
