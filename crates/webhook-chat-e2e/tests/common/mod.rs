// crates/webhook-chat-e2e/tests/common/mod.rs
// ============================================================================
// Module: Stub Webhook Server
// Description: Scripted tiny_http server standing in for the chat workflow.
// Purpose: Exercise the real HTTP client against deterministic responses.
// Dependencies: tiny_http
// ============================================================================

//! ## Overview
//! [`StubServer`] answers liveness and webhook paths from a route table and
//! records every request it receives. Requests are handled on their own
//! threads so a slow route never delays the next candidate endpoint.

#![allow(dead_code, reason = "Shared test helpers may be unused in some cases.")]
#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::unwrap_in_result,
    reason = "Test fixtures favor direct unwraps for setup clarity."
)]

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::net::TcpListener;
use std::sync::Arc;
use std::sync::Mutex;
use std::thread;
use std::thread::JoinHandle;
use std::time::Duration;

use tiny_http::Header;
use tiny_http::Request;
use tiny_http::Response;
use tiny_http::Server;

// ============================================================================
// SECTION: Routes
// ============================================================================

/// Webhook id used by every stub.
pub const WEBHOOK_ID: &str = "stub-workflow";

/// Canned response for one path.
#[derive(Debug, Clone)]
pub struct StubRoute {
    /// HTTP status.
    pub status: u16,
    /// Response body.
    pub body: String,
    /// Delay before responding.
    pub delay: Duration,
}

impl StubRoute {
    /// Responds immediately.
    pub fn new(status: u16, body: &str) -> Self {
        Self {
            status,
            body: body.to_string(),
            delay: Duration::ZERO,
        }
    }

    /// Responds with a JSON `output` field.
    pub fn output(text: &str) -> Self {
        Self::new(200, &serde_json::json!({ "output": text }).to_string())
    }

    /// Delays the response.
    pub fn delayed(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

/// Returns the active-binding chat path.
pub fn active_path() -> String {
    format!("/webhook/{WEBHOOK_ID}/chat")
}

/// Returns the test-binding chat path.
pub fn test_path() -> String {
    format!("/webhook-test/{WEBHOOK_ID}/chat")
}

// ============================================================================
// SECTION: Recorded Requests
// ============================================================================

/// Request observed by the stub.
#[derive(Debug, Clone)]
pub struct SeenRequest {
    /// HTTP method.
    pub method: String,
    /// Request path.
    pub path: String,
    /// Content-Type header value, when present.
    pub content_type: Option<String>,
    /// Request body.
    pub body: String,
}

impl SeenRequest {
    /// Parses the body as JSON.
    pub fn json(&self) -> serde_json::Value {
        serde_json::from_str(&self.body).expect("json request body")
    }
}

// ============================================================================
// SECTION: Server
// ============================================================================

/// Scripted webhook server bound to an ephemeral local port.
pub struct StubServer {
    /// Underlying server, shared with the accept thread.
    server: Arc<Server>,
    /// Base URL of the stub.
    base_url: String,
    /// Requests observed so far.
    seen: Arc<Mutex<Vec<SeenRequest>>>,
    /// Accept loop thread.
    handle: Option<JoinHandle<()>>,
}

impl StubServer {
    /// Starts a stub serving `routes`; unknown paths answer 404.
    pub fn start(routes: BTreeMap<String, StubRoute>) -> Self {
        let server = Arc::new(Server::http("127.0.0.1:0").unwrap());
        let addr = server.server_addr().to_ip().expect("ip listener");
        let base_url = format!("http://{addr}");
        let seen = Arc::new(Mutex::new(Vec::new()));
        let routes = Arc::new(routes);

        let accept_server = Arc::clone(&server);
        let accept_seen = Arc::clone(&seen);
        let handle = thread::spawn(move || {
            while let Ok(request) = accept_server.recv() {
                let routes = Arc::clone(&routes);
                let seen = Arc::clone(&accept_seen);
                thread::spawn(move || respond(request, &routes, &seen));
            }
        });

        Self {
            server,
            base_url,
            seen,
            handle: Some(handle),
        }
    }

    /// Starts a stub with a healthy liveness route plus `chat_routes`.
    pub fn with_chat_routes(chat_routes: impl IntoIterator<Item = (String, StubRoute)>) -> Self {
        let mut routes: BTreeMap<String, StubRoute> = chat_routes.into_iter().collect();
        routes.insert("/healthz".to_string(), StubRoute::new(200, r#"{"status":"ok"}"#));
        Self::start(routes)
    }

    /// Returns the base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Returns every request observed so far.
    pub fn seen(&self) -> Vec<SeenRequest> {
        self.seen.lock().unwrap().clone()
    }

    /// Returns the paths of every request observed so far.
    pub fn seen_paths(&self) -> Vec<String> {
        self.seen().into_iter().map(|request| request.path).collect()
    }
}

impl Drop for StubServer {
    fn drop(&mut self) {
        self.server.unblock();
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

/// Records and answers one request.
fn respond(
    mut request: Request,
    routes: &BTreeMap<String, StubRoute>,
    seen: &Mutex<Vec<SeenRequest>>,
) {
    let mut body = String::new();
    let _ = request.as_reader().read_to_string(&mut body);
    let content_type = request
        .headers()
        .iter()
        .find(|header| header.field.equiv("Content-Type"))
        .map(|header| header.value.as_str().to_string());
    let path = request.url().to_string();
    seen.lock().unwrap().push(SeenRequest {
        method: request.method().to_string(),
        path: path.clone(),
        content_type,
        body,
    });

    let route =
        routes.get(&path).cloned().unwrap_or_else(|| StubRoute::new(404, "webhook not registered"));
    if !route.delay.is_zero() {
        thread::sleep(route.delay);
    }
    let header = Header::from_bytes("Content-Type", "application/json").unwrap();
    let response =
        Response::from_string(route.body).with_status_code(route.status).with_header(header);
    let _ = request.respond(response);
}

/// Returns a local URL nothing is listening on.
pub fn refused_base_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}")
}
