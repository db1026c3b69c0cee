// crates/webhook-chat-e2e/src/transport/mod.rs
// ============================================================================
// Module: Chat Transport
// Description: Transport contract and uniform chat result types.
// Purpose: Normalize every webhook outcome into a (payload, status) pair.
// Dependencies: serde, serde_json, thiserror
// ============================================================================

//! ## Overview
//! [`ChatTransport`] is the seam between scenarios and the network. Every call
//! resolves to a [`ChatResult`]; transport faults never escape as errors.
//! Invariants:
//! - A status of [`STATUS_UNREACHABLE`] means no candidate endpoint answered.
//! - [`ChatPayload::output_text`] always yields text, whichever variant holds.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod webhook;

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::borrow::Cow;
use std::fmt;

use serde::Serialize;
use serde_json::Map;
use serde_json::Value;
use thiserror::Error;

use crate::session::SessionId;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Status reported when no endpoint could be reached.
pub const STATUS_UNREACHABLE: u16 = 0;

/// HTTP status expected from a healthy chat call or liveness probe.
pub const STATUS_OK: u16 = 200;

/// Error text carried by the payload of an unreachable result.
pub const UNREACHABLE_MESSAGE: &str = "Could not connect to webhook";

// ============================================================================
// SECTION: Request
// ============================================================================

/// Chat request body sent to the webhook.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatRequest<'a> {
    /// User message text.
    #[serde(rename = "chatInput")]
    pub message: &'a str,
    /// Conversation identifier.
    #[serde(rename = "sessionId")]
    pub session_id: &'a str,
}

impl<'a> ChatRequest<'a> {
    /// Builds a request for the given session.
    #[must_use]
    pub fn new(message: &'a str, session: &'a SessionId) -> Self {
        Self {
            message,
            session_id: session.as_str(),
        }
    }
}

// ============================================================================
// SECTION: Payload
// ============================================================================

/// Response payload, either a JSON object or raw text.
#[derive(Debug, Clone, PartialEq)]
pub enum ChatPayload {
    /// Body parsed as a JSON object.
    Structured(Map<String, Value>),
    /// Body that was not a JSON object, kept verbatim.
    Raw(String),
}

impl ChatPayload {
    /// Parses a response body, falling back to raw text.
    #[must_use]
    pub fn from_body(body: &str) -> Self {
        match serde_json::from_str::<Value>(body) {
            Ok(Value::Object(map)) => Self::Structured(map),
            _ => Self::Raw(body.to_string()),
        }
    }

    /// Builds an error payload for an HTTP error response.
    #[must_use]
    pub fn http_error(body: String, status: u16) -> Self {
        let mut map = Map::new();
        map.insert("error".to_string(), Value::String(body));
        map.insert("code".to_string(), Value::from(status));
        Self::Structured(map)
    }

    /// Builds an error payload carrying only a message.
    #[must_use]
    pub fn error_message(message: &str) -> Self {
        let mut map = Map::new();
        map.insert("error".to_string(), Value::String(message.to_string()));
        Self::Structured(map)
    }

    /// Returns the assistant reply text.
    ///
    /// Objects without an `output` field render as their full JSON so error
    /// bodies stay visible in diagnostics.
    #[must_use]
    pub fn output_text(&self) -> Cow<'_, str> {
        match self {
            Self::Structured(map) => match map.get("output") {
                Some(Value::String(text)) => Cow::Borrowed(text.as_str()),
                Some(other) => Cow::Owned(other.to_string()),
                None => Cow::Owned(Value::Object(map.clone()).to_string()),
            },
            Self::Raw(text) => Cow::Borrowed(text.as_str()),
        }
    }

    /// Returns the `error` field of a structured payload.
    #[must_use]
    pub fn error_text(&self) -> Option<&str> {
        match self {
            Self::Structured(map) => map.get("error").and_then(Value::as_str),
            Self::Raw(_) => None,
        }
    }
}

impl fmt::Display for ChatPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Structured(map) => write!(f, "{}", Value::Object(map.clone())),
            Self::Raw(text) => f.write_str(text),
        }
    }
}

// ============================================================================
// SECTION: Result
// ============================================================================

/// Uniform outcome of one chat call.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatResult {
    /// Parsed or wrapped response payload.
    pub payload: ChatPayload,
    /// HTTP status, or [`STATUS_UNREACHABLE`].
    pub status: u16,
}

impl ChatResult {
    /// Builds a result from a payload and status.
    #[must_use]
    pub const fn new(payload: ChatPayload, status: u16) -> Self {
        Self {
            payload,
            status,
        }
    }

    /// Builds the result reported when every endpoint was unreachable.
    #[must_use]
    pub fn unreachable() -> Self {
        Self::new(ChatPayload::error_message(UNREACHABLE_MESSAGE), STATUS_UNREACHABLE)
    }

    /// Returns true when the call answered with HTTP 200.
    #[must_use]
    pub const fn is_ok(&self) -> bool {
        self.status == STATUS_OK
    }

    /// Returns the assistant reply text.
    #[must_use]
    pub fn output_text(&self) -> Cow<'_, str> {
        self.payload.output_text()
    }
}

// ============================================================================
// SECTION: Endpoint Binding
// ============================================================================

/// Binding mode under which the workflow exposes its webhook.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EndpointBinding {
    /// Production binding of an activated workflow.
    Active,
    /// Preview binding of a workflow under test.
    Test,
}

impl EndpointBinding {
    /// Returns the path segment that selects this binding.
    #[must_use]
    pub const fn path_segment(self) -> &'static str {
        match self {
            Self::Active => "webhook",
            Self::Test => "webhook-test",
        }
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Errors raised by transport construction and liveness probes.
#[derive(Debug, Error)]
pub enum TransportError {
    /// HTTP client could not be constructed.
    #[error("failed to build http client: {0}")]
    ClientBuild(String),
    /// Request did not produce a response.
    #[error("request failed: {0}")]
    Request(String),
}

// ============================================================================
// SECTION: Transport Trait
// ============================================================================

/// Network seam used by scenarios and the liveness probe.
pub trait ChatTransport {
    /// Sends one chat message on the given session.
    fn send_chat(&self, message: &str, session: &SessionId) -> ChatResult;

    /// Issues the liveness probe and returns the HTTP status.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Request`] when no response arrives.
    fn check_liveness(&self) -> Result<u16, TransportError>;
}
