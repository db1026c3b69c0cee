// crates/webhook-chat-e2e/src/probe.rs
// ============================================================================
// Module: Liveness Probe
// Description: Pre-flight reachability check of the target service.
// Purpose: Record whether the health endpoint answers before chat scenarios.
// Dependencies: none
// ============================================================================

//! ## Overview
//! The liveness probe issues a single GET against the health endpoint and
//! records one outcome. An unreachable service fails the check with the
//! transport fault as detail; the run continues either way.

use std::io::Write;

use crate::report::ReportError;
use crate::report::Reporter;
use crate::transport::ChatTransport;
use crate::transport::STATUS_OK;

/// Section title of the liveness check.
pub const LIVENESS_TITLE: &str = "Test 1: Service Liveness";

/// Assertion name recorded by the liveness check.
pub const LIVENESS_ASSERTION: &str = "Service is running";

/// Runs the liveness check and records its outcome.
///
/// # Errors
///
/// Returns [`ReportError`] when report output cannot be written.
pub fn run_liveness<T: ChatTransport + ?Sized, W: Write>(
    transport: &T,
    reporter: &mut Reporter<W>,
) -> Result<bool, ReportError> {
    reporter.section(LIVENESS_TITLE)?;
    let (passed, detail) = match transport.check_liveness() {
        Ok(status) => (status == STATUS_OK, format!("Status: {status}")),
        Err(err) => (false, err.to_string()),
    };
    reporter.record(LIVENESS_ASSERTION, passed, &detail)?;
    Ok(passed)
}
