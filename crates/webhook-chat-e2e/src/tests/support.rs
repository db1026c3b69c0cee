// crates/webhook-chat-e2e/src/tests/support.rs
// ============================================================================
// Module: Unit Test Support
// Description: Scripted transport and reporter helpers for unit tests.
// Purpose: Drive scenarios without a network.
// ============================================================================

use std::cell::RefCell;
use std::collections::BTreeMap;

use serde_json::json;

use crate::report::Reporter;
use crate::session::SessionId;
use crate::transport::ChatPayload;
use crate::transport::ChatResult;
use crate::transport::ChatTransport;
use crate::transport::TransportError;

/// Builds a 200 result whose JSON body carries `output`.
pub fn ok_output(text: &str) -> ChatResult {
    ChatResult::new(ChatPayload::from_body(&json!({ "output": text }).to_string()), 200)
}

/// Builds an HTTP error result.
pub fn http_error(status: u16, body: &str) -> ChatResult {
    ChatResult::new(ChatPayload::http_error(body.to_string(), status), status)
}

/// Transport answering from a per-message script and logging every call.
pub struct ScriptedTransport {
    replies: BTreeMap<String, ChatResult>,
    fallback: ChatResult,
    liveness: Option<u16>,
    calls: RefCell<Vec<(String, SessionId)>>,
}

impl ScriptedTransport {
    /// Answers every message with `fallback` and liveness with 200.
    pub fn new(fallback: ChatResult) -> Self {
        Self {
            replies: BTreeMap::new(),
            fallback,
            liveness: Some(200),
            calls: RefCell::new(Vec::new()),
        }
    }

    /// Scripts the reply for one message.
    pub fn reply(mut self, message: &str, result: ChatResult) -> Self {
        self.replies.insert(message.to_string(), result);
        self
    }

    /// Scripts the liveness status; `None` simulates an unreachable service.
    pub fn liveness(mut self, status: Option<u16>) -> Self {
        self.liveness = status;
        self
    }

    /// Returns every (message, session) pair sent so far.
    pub fn calls(&self) -> Vec<(String, SessionId)> {
        self.calls.borrow().clone()
    }

    /// Returns the session used for a message.
    pub fn session_for(&self, message: &str) -> SessionId {
        self.calls
            .borrow()
            .iter()
            .find(|(sent, _)| sent == message)
            .map(|(_, session)| session.clone())
            .expect("message was sent")
    }
}

impl ChatTransport for ScriptedTransport {
    fn send_chat(&self, message: &str, session: &SessionId) -> ChatResult {
        self.calls.borrow_mut().push((message.to_string(), session.clone()));
        self.replies.get(message).cloned().unwrap_or_else(|| self.fallback.clone())
    }

    fn check_liveness(&self) -> Result<u16, TransportError> {
        self.liveness.ok_or_else(|| TransportError::Request("connection refused".to_string()))
    }
}

/// Creates a plain reporter over an in-memory buffer.
pub fn buffer_reporter() -> Reporter<Vec<u8>> {
    Reporter::new(Vec::new())
}

/// Returns the rendered report text.
pub fn rendered(reporter: Reporter<Vec<u8>>) -> String {
    String::from_utf8(reporter.into_inner()).expect("report is utf-8")
}
