// crates/webhook-chat-e2e/src/transport/webhook.rs
// ============================================================================
// Module: Webhook Transport
// Description: Blocking HTTP client with active/test endpoint fallback.
// Purpose: Deliver chat requests to the first endpoint bound to the workflow.
// Dependencies: reqwest, serde_json
// ============================================================================

//! ## Overview
//! [`WebhookClient`] posts chat requests to an ordered list of
//! [`WebhookEndpoint`] candidates. Each attempt is classified into an
//! [`AttemptOutcome`]: a 404 or a transport fault moves on to the next
//! candidate, any other response ends resolution.
//! Invariants:
//! - Candidates are tried in order: active binding, then test binding.
//! - A non-404 error status on any candidate is returned as-is.
//! - Exhausting the candidates yields [`ChatResult::unreachable`].
//! - Every attempt is bounded by the configured chat timeout.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;
use std::time::Duration;
use std::time::Instant;

use reqwest::StatusCode;
use reqwest::blocking::Client;
use reqwest::header::CONTENT_TYPE;

use crate::session::SessionId;
use crate::telemetry::NoopObserver;
use crate::telemetry::RunEvent;
use crate::telemetry::RunObserver;
use crate::telemetry::duration_millis;
use crate::transport::ChatPayload;
use crate::transport::ChatRequest;
use crate::transport::ChatResult;
use crate::transport::ChatTransport;
use crate::transport::EndpointBinding;
use crate::transport::STATUS_UNREACHABLE;
use crate::transport::TransportError;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default per-attempt timeout for chat calls.
pub const DEFAULT_CHAT_TIMEOUT: Duration = Duration::from_secs(30);

/// Default timeout for the liveness probe.
pub const DEFAULT_LIVENESS_TIMEOUT: Duration = Duration::from_secs(5);

/// Path of the liveness endpoint relative to the base address.
pub const LIVENESS_PATH: &str = "/healthz";

// ============================================================================
// SECTION: Endpoints
// ============================================================================

/// One candidate URL for the chat webhook.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebhookEndpoint {
    /// Binding mode the URL addresses.
    pub binding: EndpointBinding,
    /// Fully qualified chat URL.
    pub url: String,
}

impl WebhookEndpoint {
    /// Builds the chat URL for a binding.
    #[must_use]
    pub fn new(base_url: &str, webhook_id: &str, binding: EndpointBinding) -> Self {
        let base = base_url.trim_end_matches('/');
        Self {
            binding,
            url: format!("{base}/{}/{webhook_id}/chat", binding.path_segment()),
        }
    }
}

/// Returns the candidate endpoints in resolution order.
#[must_use]
pub fn candidate_endpoints(base_url: &str, webhook_id: &str) -> Vec<WebhookEndpoint> {
    [EndpointBinding::Active, EndpointBinding::Test]
        .into_iter()
        .map(|binding| WebhookEndpoint::new(base_url, webhook_id, binding))
        .collect()
}

/// Returns the liveness URL for a base address.
#[must_use]
pub fn liveness_url(base_url: &str) -> String {
    format!("{}{LIVENESS_PATH}", base_url.trim_end_matches('/'))
}

// ============================================================================
// SECTION: Attempt Classification
// ============================================================================

/// Result of a single delivery attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum AttemptOutcome {
    /// Endpoint answered with a non-error status.
    Delivered(ChatResult),
    /// Endpoint answered with an error other than 404; resolution stops.
    Terminal(ChatResult),
    /// Endpoint is not bound in this mode; try the next candidate.
    NotBound(ChatResult),
    /// No response arrived; try the next candidate.
    Fault(String),
}

impl AttemptOutcome {
    /// Classifies a received response by status.
    #[must_use]
    pub fn from_response(status: u16, body: &str) -> Self {
        let code = StatusCode::from_u16(status).ok();
        let is_error = code.is_none_or(|code| code.is_client_error() || code.is_server_error());
        if !is_error {
            return Self::Delivered(ChatResult::new(ChatPayload::from_body(body), status));
        }
        let result = ChatResult::new(ChatPayload::http_error(body.to_string(), status), status);
        if code == Some(StatusCode::NOT_FOUND) {
            Self::NotBound(result)
        } else {
            Self::Terminal(result)
        }
    }
}

/// Folds attempt outcomes into the final result.
///
/// Attempts are pulled lazily so resolution stops at the first delivered or
/// terminal outcome. Running out of candidates is reported as unreachable,
/// whether the last attempt answered 404 or produced no response.
pub fn resolve_attempts<I>(attempts: I) -> ChatResult
where
    I: IntoIterator<Item = AttemptOutcome>,
{
    for outcome in attempts {
        match outcome {
            AttemptOutcome::Delivered(result) | AttemptOutcome::Terminal(result) => return result,
            AttemptOutcome::NotBound(_) | AttemptOutcome::Fault(_) => {}
        }
    }
    ChatResult::unreachable()
}

// ============================================================================
// SECTION: Client
// ============================================================================

/// Timeouts applied by [`WebhookClient`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClientTimeouts {
    /// Bound for each chat delivery attempt.
    pub chat: Duration,
    /// Bound for the liveness probe.
    pub liveness: Duration,
}

impl Default for ClientTimeouts {
    fn default() -> Self {
        Self {
            chat: DEFAULT_CHAT_TIMEOUT,
            liveness: DEFAULT_LIVENESS_TIMEOUT,
        }
    }
}

/// Blocking webhook client with endpoint fallback.
#[derive(Clone)]
pub struct WebhookClient {
    /// Client used for chat calls.
    chat_client: Client,
    /// Client used for the liveness probe.
    liveness_client: Client,
    /// Candidate chat endpoints in resolution order.
    endpoints: Vec<WebhookEndpoint>,
    /// Liveness URL.
    liveness_url: String,
    /// Sink for attempt and liveness events.
    observer: Arc<dyn RunObserver>,
}

impl WebhookClient {
    /// Builds a client for the workflow behind `webhook_id`.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::ClientBuild`] when an HTTP client cannot be
    /// constructed.
    pub fn new(
        base_url: &str,
        webhook_id: &str,
        timeouts: ClientTimeouts,
    ) -> Result<Self, TransportError> {
        let chat_client = build_client(timeouts.chat)?;
        let liveness_client = build_client(timeouts.liveness)?;
        Ok(Self {
            chat_client,
            liveness_client,
            endpoints: candidate_endpoints(base_url, webhook_id),
            liveness_url: liveness_url(base_url),
            observer: Arc::new(NoopObserver),
        })
    }

    /// Attaches a run observer for attempt events.
    #[must_use]
    pub fn with_observer(mut self, observer: Arc<dyn RunObserver>) -> Self {
        self.observer = observer;
        self
    }


    /// Posts one encoded request to an endpoint and classifies the outcome.
    fn attempt(&self, endpoint: &WebhookEndpoint, body: &[u8]) -> AttemptOutcome {
        let started = Instant::now();
        let outcome = self
            .chat_client
            .post(&endpoint.url)
            .header(CONTENT_TYPE, "application/json")
            .body(body.to_vec())
            .send()
            .and_then(|response| {
                let status = response.status().as_u16();
                response.text().map(|text| (status, text))
            })
            .map_or_else(
                |err| AttemptOutcome::Fault(err.to_string()),
                |(status, text)| AttemptOutcome::from_response(status, &text),
            );
        let (status, fault) = match &outcome {
            AttemptOutcome::Delivered(result)
            | AttemptOutcome::Terminal(result)
            | AttemptOutcome::NotBound(result) => (Some(result.status), None),
            AttemptOutcome::Fault(reason) => (None, Some(reason.clone())),
        };
        self.observer.record(&RunEvent::Attempt {
            binding: endpoint.binding,
            url: endpoint.url.clone(),
            status,
            fault,
            elapsed_ms: duration_millis(started.elapsed()),
        });
        outcome
    }
}

impl ChatTransport for WebhookClient {
    fn send_chat(&self, message: &str, session: &SessionId) -> ChatResult {
        let request = ChatRequest::new(message, session);
        let body = match serde_json::to_vec(&request) {
            Ok(body) => body,
            Err(err) => {
                return ChatResult::new(
                    ChatPayload::error_message(&format!("failed to encode chat request: {err}")),
                    STATUS_UNREACHABLE,
                );
            }
        };
        resolve_attempts(self.endpoints.iter().map(|endpoint| self.attempt(endpoint, &body)))
    }

    fn check_liveness(&self) -> Result<u16, TransportError> {
        let outcome = self
            .liveness_client
            .get(&self.liveness_url)
            .send()
            .map(|response| response.status().as_u16())
            .map_err(|err| TransportError::Request(err.to_string()));
        let (status, fault) = match &outcome {
            Ok(status) => (Some(*status), None),
            Err(err) => (None, Some(err.to_string())),
        };
        self.observer.record(&RunEvent::Liveness {
            status,
            fault,
        });
        outcome
    }
}

/// Builds a blocking client bounded by `timeout`.
fn build_client(timeout: Duration) -> Result<Client, TransportError> {
    Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|err| TransportError::ClientBuild(err.to_string()))
}
