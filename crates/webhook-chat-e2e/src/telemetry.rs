// crates/webhook-chat-e2e/src/telemetry.rs
// ============================================================================
// Module: Run Telemetry
// Description: Structured run events and observer sinks.
// Purpose: Emit machine-readable records of attempts, assertions, and totals.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! Run telemetry is a thin observer interface. The driver, transport, and
//! reporter emit [`RunEvent`] values; [`JsonLinesObserver`] writes them as one
//! JSON object per line and [`NoopObserver`] discards them.
//! Invariants:
//! - Telemetry never changes an assertion verdict or the exit status.
//! - Observer write failures are dropped.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io::Write;
use std::sync::Mutex;
use std::time::Duration;

use serde::Serialize;

use crate::report::Verdict;
use crate::transport::EndpointBinding;

// ============================================================================
// SECTION: Events
// ============================================================================

/// Structured record of something that happened during a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum RunEvent {
    /// Banner printed and run started.
    RunStarted {
        /// Target base address.
        target: String,
        /// Main session banner prefix.
        session_prefix: String,
    },
    /// One delivery attempt against a webhook endpoint.
    Attempt {
        /// Binding mode of the endpoint.
        binding: EndpointBinding,
        /// Endpoint URL.
        url: String,
        /// HTTP status when a response arrived.
        status: Option<u16>,
        /// Transport fault text when no response arrived.
        fault: Option<String>,
        /// Wall-clock duration of the attempt in milliseconds.
        elapsed_ms: u64,
    },
    /// Liveness probe result.
    Liveness {
        /// HTTP status when a response arrived.
        status: Option<u16>,
        /// Transport fault text when no response arrived.
        fault: Option<String>,
    },
    /// Assertion outcome appended to the report.
    Assertion {
        /// Assertion name.
        name: String,
        /// Recorded verdict.
        verdict: Verdict,
    },
    /// Summary computed and run finished.
    RunFinished {
        /// Total recorded assertions.
        total: usize,
        /// Assertions that did not fail.
        passed: usize,
        /// Passing assertions recorded as warnings.
        warned: usize,
    },
}

/// Converts a duration into whole milliseconds, saturating on overflow.
#[must_use]
pub fn duration_millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

// ============================================================================
// SECTION: Observer Trait
// ============================================================================

/// Sink for run events.
pub trait RunObserver: Send + Sync {
    /// Records a run event.
    fn record(&self, event: &RunEvent);
}

/// Observer that discards every event.
pub struct NoopObserver;

impl RunObserver for NoopObserver {
    fn record(&self, _event: &RunEvent) {}
}

// ============================================================================
// SECTION: JSON Lines Observer
// ============================================================================

/// Observer writing each event as a single JSON line.
pub struct JsonLinesObserver<W: Write + Send> {
    /// Output writer for event records.
    writer: Mutex<W>,
}

impl<W: Write + Send> JsonLinesObserver<W> {
    /// Creates an observer over the provided writer.
    pub const fn new(writer: W) -> Self {
        Self {
            writer: Mutex::new(writer),
        }
    }

    /// Consumes the observer and returns the writer.
    pub fn into_inner(self) -> W {
        match self.writer.into_inner() {
            Ok(writer) => writer,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

impl<W: Write + Send> RunObserver for JsonLinesObserver<W> {
    fn record(&self, event: &RunEvent) {
        let Ok(mut guard) = self.writer.lock() else {
            return;
        };
        if serde_json::to_writer(&mut *guard, event).is_ok() {
            let _ = guard.write_all(b"\n");
            let _ = guard.flush();
        }
    }
}
