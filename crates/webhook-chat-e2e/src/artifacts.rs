// crates/webhook-chat-e2e/src/artifacts.rs
// ============================================================================
// Module: Run Artifacts
// Description: Machine-readable run report and artifact file helpers.
// Purpose: Persist the outcome sequence and summary after a run.
// Dependencies: serde, serde_jcs, thiserror
// ============================================================================

//! ## Overview
//! [`RunReport`] captures the target, session prefix, timing, summary, and
//! every recorded outcome. [`write_report`] stores it as canonical JSON so two
//! identical runs produce byte-identical reports apart from timestamps.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs;
use std::fs::File;
use std::io;
use std::path::Path;
use std::path::PathBuf;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use serde::Serialize;
use thiserror::Error;

use crate::report::AssertionOutcome;
use crate::report::RunSummary;
use crate::telemetry::duration_millis;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Errors raised while writing run artifacts.
#[derive(Debug, Error)]
pub enum ArtifactError {
    /// Artifact file could not be created or written.
    #[error("failed to write {}: {source}", path.display())]
    Io {
        /// Artifact path.
        path: PathBuf,
        /// Underlying I/O failure.
        source: io::Error,
    },
    /// Report could not be serialized.
    #[error("failed to serialize run report: {0}")]
    Serialize(String),
}

// ============================================================================
// SECTION: Report
// ============================================================================

/// Aggregate status of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    /// Every assertion passed.
    Pass,
    /// At least one assertion failed.
    Fail,
}

impl RunStatus {
    /// Derives the status from a summary.
    #[must_use]
    pub const fn from_summary(summary: &RunSummary) -> Self {
        if summary.all_passed() { Self::Pass } else { Self::Fail }
    }
}

/// Serialized record of one harness run.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport<'a> {
    /// Target base address.
    pub target: &'a str,
    /// Main session banner prefix.
    pub session_prefix: &'a str,
    /// Run start, milliseconds since the Unix epoch.
    pub started_at_ms: u64,
    /// Run end, milliseconds since the Unix epoch.
    pub ended_at_ms: u64,
    /// Run duration in milliseconds.
    pub duration_ms: u64,
    /// Aggregate status.
    pub status: RunStatus,
    /// Outcome counts.
    pub summary: RunSummary,
    /// Every recorded outcome in order.
    pub outcomes: &'a [AssertionOutcome],
}

impl<'a> RunReport<'a> {
    /// Builds a report from recorded outcomes.
    #[must_use]
    pub fn new(
        target: &'a str,
        session_prefix: &'a str,
        started_at_ms: u64,
        ended_at_ms: u64,
        outcomes: &'a [AssertionOutcome],
    ) -> Self {
        let summary = RunSummary::from_outcomes(outcomes);
        Self {
            target,
            session_prefix,
            started_at_ms,
            ended_at_ms,
            duration_ms: ended_at_ms.saturating_sub(started_at_ms),
            status: RunStatus::from_summary(&summary),
            summary,
            outcomes,
        }
    }
}

// ============================================================================
// SECTION: Writers
// ============================================================================

/// Returns the current wall-clock time in milliseconds since the Unix epoch.
#[must_use]
pub fn now_millis() -> u64 {
    duration_millis(SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default())
}

/// Creates an artifact file, creating missing parent directories.
///
/// # Errors
///
/// Returns [`ArtifactError::Io`] when the directory or file cannot be created.
pub fn create_artifact_file(path: &Path) -> Result<File, ArtifactError> {
    ensure_parent(path)?;
    File::create(path).map_err(|source| io_error(path, source))
}

/// Writes the report as canonical JSON.
///
/// # Errors
///
/// Returns [`ArtifactError`] when serialization or the write fails.
pub fn write_report(path: &Path, report: &RunReport<'_>) -> Result<(), ArtifactError> {
    let bytes =
        serde_jcs::to_vec(report).map_err(|err| ArtifactError::Serialize(err.to_string()))?;
    ensure_parent(path)?;
    fs::write(path, bytes).map_err(|source| io_error(path, source))
}

/// Creates the parent directory of an artifact path when missing.
fn ensure_parent(path: &Path) -> Result<(), ArtifactError> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).map_err(|source| io_error(parent, source))?;
    }
    Ok(())
}

/// Wraps an I/O failure with the path it concerns.
fn io_error(path: &Path, source: io::Error) -> ArtifactError {
    ArtifactError::Io {
        path: path.to_path_buf(),
        source,
    }
}
