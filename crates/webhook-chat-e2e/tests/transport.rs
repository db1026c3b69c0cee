// crates/webhook-chat-e2e/tests/transport.rs
// ============================================================================
// Module: Webhook Transport Integration Tests
// Description: Real HTTP delivery against a stub webhook server.
// Purpose: Validate endpoint fallback, error mapping, and wire format.
// Dependencies: tiny_http, webhook-chat-e2e
// ============================================================================

//! ## Overview
//! Drives [`WebhookClient`] against local stub servers to cover the
//! active-then-test endpoint fallback, status mapping, unreachable targets,
//! timeouts, and the JSON request body.

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only output and panic-based assertions are permitted."
)]

mod common;

use std::sync::Arc;
use std::sync::Mutex;
use std::time::Duration;

use common::StubRoute;
use common::StubServer;
use common::WEBHOOK_ID;
use common::active_path;
use common::refused_base_url;
use common::test_path;
use serde_json::json;
use webhook_chat_e2e::ChatPayload;
use webhook_chat_e2e::ChatTransport;
use webhook_chat_e2e::SessionId;
use webhook_chat_e2e::WebhookClient;
use webhook_chat_e2e::telemetry::RunEvent;
use webhook_chat_e2e::telemetry::RunObserver;
use webhook_chat_e2e::transport::EndpointBinding;
use webhook_chat_e2e::transport::webhook::ClientTimeouts;

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Builds a client with short timeouts against `base_url`.
fn client(base_url: &str) -> WebhookClient {
    let timeouts = ClientTimeouts {
        chat: Duration::from_secs(5),
        liveness: Duration::from_secs(2),
    };
    WebhookClient::new(base_url, WEBHOOK_ID, timeouts).unwrap()
}

/// Observer collecting events in memory.
#[derive(Default)]
struct RecordingObserver {
    /// Recorded events in order.
    events: Mutex<Vec<RunEvent>>,
}

impl RunObserver for RecordingObserver {
    fn record(&self, event: &RunEvent) {
        self.events.lock().unwrap().push(event.clone());
    }
}

// ============================================================================
// SECTION: Endpoint Fallback
// ============================================================================

#[test]
fn active_endpoint_answers_first() {
    let stub = StubServer::with_chat_routes([(active_path(), StubRoute::output("3 dresses"))]);
    let result = client(stub.base_url()).send_chat("Show me dresses", &SessionId::new("s-1"));
    assert_eq!(result.status, 200);
    assert_eq!(result.output_text(), "3 dresses");
    assert_eq!(stub.seen_paths(), vec![active_path()]);
}

#[test]
fn not_found_on_active_falls_back_to_test_binding() {
    let stub = StubServer::with_chat_routes([(test_path(), StubRoute::output("from preview"))]);
    let result = client(stub.base_url()).send_chat("Show me dresses", &SessionId::new("s-1"));
    assert_eq!(result.status, 200);
    assert_eq!(result.output_text(), "from preview");
    assert_eq!(stub.seen_paths(), vec![active_path(), test_path()]);
}

#[test]
fn server_error_on_active_is_terminal() {
    let stub = StubServer::with_chat_routes([
        (active_path(), StubRoute::new(500, "workflow crashed")),
        (test_path(), StubRoute::output("never reached")),
    ]);
    let result = client(stub.base_url()).send_chat("Show me dresses", &SessionId::new("s-1"));
    assert_eq!(result.status, 500);
    assert_eq!(result.payload.error_text(), Some("workflow crashed"));
    assert_eq!(stub.seen_paths(), vec![active_path()]);
}

#[test]
fn not_found_on_both_reports_unreachable() {
    let stub = StubServer::with_chat_routes([]);
    let result = client(stub.base_url()).send_chat("Show me dresses", &SessionId::new("s-1"));
    assert_eq!(result.status, 0);
    assert_eq!(result.payload.error_text(), Some("Could not connect to webhook"));
    assert_eq!(stub.seen_paths().len(), 2);
}

#[test]
fn unreachable_target_reports_status_zero() {
    let result = client(&refused_base_url()).send_chat("Show me dresses", &SessionId::new("s-1"));
    assert_eq!(result.status, 0);
    assert_eq!(result.payload.error_text(), Some("Could not connect to webhook"));
}

#[test]
fn timeout_on_active_falls_back_to_test_binding() {
    let stub = StubServer::with_chat_routes([
        (active_path(), StubRoute::output("too late").delayed(Duration::from_secs(3))),
        (test_path(), StubRoute::output("quick preview")),
    ]);
    let timeouts = ClientTimeouts {
        chat: Duration::from_millis(300),
        liveness: Duration::from_secs(2),
    };
    let client = WebhookClient::new(stub.base_url(), WEBHOOK_ID, timeouts).unwrap();
    let result = client.send_chat("Show me dresses", &SessionId::new("s-1"));
    assert_eq!(result.status, 200);
    assert_eq!(result.output_text(), "quick preview");
}

// ============================================================================
// SECTION: Wire Format
// ============================================================================

#[test]
fn non_json_body_is_returned_raw() {
    let stub = StubServer::with_chat_routes([(active_path(), StubRoute::new(200, "not json"))]);
    let result = client(stub.base_url()).send_chat("Show me dresses", &SessionId::new("s-1"));
    assert_eq!(result.status, 200);
    assert_eq!(result.payload, ChatPayload::Raw("not json".to_string()));
    assert_eq!(result.output_text(), "not json");
}

#[test]
fn request_is_json_post_with_message_and_session() {
    let stub = StubServer::with_chat_routes([(active_path(), StubRoute::output("ok"))]);
    let session = SessionId::new("0f8fad5b-d9cb-469f-a165-70867728950e");
    client(stub.base_url()).send_chat("Tell me more about the first one", &session);

    let seen = stub.seen();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].method, "POST");
    assert_eq!(seen[0].content_type.as_deref(), Some("application/json"));
    assert_eq!(
        seen[0].json(),
        json!({
            "chatInput": "Tell me more about the first one",
            "sessionId": "0f8fad5b-d9cb-469f-a165-70867728950e",
        })
    );
}

// ============================================================================
// SECTION: Liveness
// ============================================================================

#[test]
fn liveness_probe_gets_health_path() {
    let stub = StubServer::with_chat_routes([]);
    assert_eq!(client(stub.base_url()).check_liveness().unwrap(), 200);
    let seen = stub.seen();
    assert_eq!(seen[0].method, "GET");
    assert_eq!(seen[0].path, "/healthz");
}

#[test]
fn liveness_probe_reports_unreachable_target() {
    assert!(client(&refused_base_url()).check_liveness().is_err());
}

// ============================================================================
// SECTION: Telemetry
// ============================================================================

#[test]
fn attempts_are_reported_to_observer() {
    let stub = StubServer::with_chat_routes([(test_path(), StubRoute::output("preview"))]);
    let observer = Arc::new(RecordingObserver::default());
    let client =
        client(stub.base_url()).with_observer(Arc::clone(&observer) as Arc<dyn RunObserver>);
    client.send_chat("Show me dresses", &SessionId::new("s-1"));

    let events = observer.events.lock().unwrap();
    let attempts: Vec<_> = events
        .iter()
        .filter_map(|event| match event {
            RunEvent::Attempt {
                binding,
                status,
                ..
            } => Some((*binding, *status)),
            _ => None,
        })
        .collect();
    assert_eq!(
        attempts,
        vec![(EndpointBinding::Active, Some(404)), (EndpointBinding::Test, Some(200))]
    );
}
