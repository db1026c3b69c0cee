// crates/webhook-chat-e2e/src/lib.rs
// ============================================================================
// Module: Webhook Chat E2E Library
// Description: End-to-end harness for chat workflows exposed over a webhook.
// Purpose: Probe, exercise, and judge a conversational webhook from outside.
// Dependencies: reqwest, serde, serde_json, serde_jcs, thiserror, url, uuid
// ============================================================================

//! ## Overview
//! The harness sends chat messages to a workflow webhook, checks coarse
//! structural properties of the replies, and verifies that session-scoped
//! context is retained on one session and absent on a fresh one.
//!
//! The pipeline is leaf-first:
//! - [`transport`]: webhook delivery with active/test endpoint fallback.
//! - [`session`]: main and isolated session identifiers.
//! - [`scenarios`]: ordered chat scenarios and keyword oracles.
//! - [`report`]: append-only outcomes, console rendering, summary.
//! - [`probe`]: liveness pre-flight check.
//! - [`driver`]: run sequencing, pacing, and exit status.
//!
//! The harness never judges whether a reply is semantically correct.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod artifacts;
pub mod config;
pub mod driver;
pub mod probe;
pub mod report;
pub mod scenarios;
pub mod session;
pub mod telemetry;
pub mod transport;


// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use config::ConfigError;
pub use config::HarnessConfig;
pub use driver::DriverError;
pub use driver::RunSettings;
pub use driver::execute;
pub use driver::run_suite;
pub use report::AssertionOutcome;
pub use report::Reporter;
pub use report::RunSummary;
pub use report::Verdict;
pub use scenarios::IsolationPolicy;
pub use scenarios::Scenario;
pub use session::SessionContext;
pub use session::SessionId;
pub use transport::ChatPayload;
pub use transport::ChatResult;
pub use transport::ChatTransport;
pub use transport::webhook::WebhookClient;
