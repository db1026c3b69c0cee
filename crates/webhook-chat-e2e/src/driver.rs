// crates/webhook-chat-e2e/src/driver.rs
// ============================================================================
// Module: Process Driver
// Description: Deterministic probe → scenarios → summary pipeline.
// Purpose: Sequence a full harness run and derive its exit status.
// Dependencies: thiserror
// ============================================================================

//! ## Overview
//! [`run_suite`] prints the banner, runs the liveness probe, runs every chat
//! scenario in order with a pacing delay between consecutive scenarios, and
//! prints the summary. [`execute`] wires configuration, telemetry, the webhook
//! client, and the run report around it.
//! Invariants:
//! - Scenarios run strictly sequentially in [`Scenario::ORDERED`] order.
//! - A failing scenario never stops the run.
//! - The pacing delay is an unconditional sleep and is skipped when zero.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io::Write;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use thiserror::Error;

use crate::artifacts::ArtifactError;
use crate::artifacts::RunReport;
use crate::artifacts::create_artifact_file;
use crate::artifacts::now_millis;
use crate::artifacts::write_report;
use crate::config::HarnessConfig;
use crate::probe::run_liveness;
use crate::report::ReportError;
use crate::report::Reporter;
use crate::report::RunSummary;
use crate::report::Verdict;
use crate::scenarios::IsolationPolicy;
use crate::scenarios::Scenario;
use crate::scenarios::ScenarioRun;
use crate::session::SessionContext;
use crate::telemetry::JsonLinesObserver;
use crate::telemetry::NoopObserver;
use crate::telemetry::RunEvent;
use crate::telemetry::RunObserver;
use crate::transport::ChatTransport;
use crate::transport::TransportError;
use crate::transport::webhook::ClientTimeouts;
use crate::transport::webhook::WebhookClient;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Title printed in the run banner.
pub const BANNER_TITLE: &str = "E2E Test: Webhook Chat Workflow";

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Errors that abort a run before or after the scenarios.
#[derive(Debug, Error)]
pub enum DriverError {
    /// Webhook client could not be built.
    #[error(transparent)]
    Transport(#[from] TransportError),
    /// Report output could not be written.
    #[error(transparent)]
    Report(#[from] ReportError),
    /// Event log or run report could not be written.
    #[error(transparent)]
    Artifact(#[from] ArtifactError),
}

// ============================================================================
// SECTION: Run Settings
// ============================================================================

/// Settings consumed by [`run_suite`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSettings {
    /// Target base address shown in the banner.
    pub target: String,
    /// Pause between consecutive scenarios.
    pub pace: Duration,
    /// Isolation scenario policy.
    pub isolation: IsolationPolicy,
}

impl RunSettings {
    /// Derives run settings from the harness configuration.
    #[must_use]
    pub fn from_config(config: &HarnessConfig) -> Self {
        Self {
            target: config.base_url.clone(),
            pace: config.pace,
            isolation: config.isolation,
        }
    }
}

// ============================================================================
// SECTION: Pipeline
// ============================================================================

/// Runs the liveness probe and every chat scenario, then prints the summary.
///
/// # Errors
///
/// Returns [`ReportError`] when report output cannot be written.
pub fn run_suite<T: ChatTransport + ?Sized, W: Write>(
    settings: &RunSettings,
    transport: &T,
    sessions: &SessionContext,
    reporter: &mut Reporter<W>,
) -> Result<RunSummary, ReportError> {
    reporter.observer().record(&RunEvent::RunStarted {
        target: settings.target.clone(),
        session_prefix: sessions.main().short().to_string(),
    });
    write_banner(reporter, settings, sessions)?;

    run_liveness(transport, reporter)?;
    if !settings.pace.is_zero() {
        reporter.line("")?;
        reporter.note(&format!(
            "(Pausing {} between tests to avoid rate limits)",
            format_pace(settings.pace)
        ))?;
    }

    let mut run = ScenarioRun::new(transport, reporter, sessions, settings.isolation);
    for (index, scenario) in Scenario::ORDERED.into_iter().enumerate() {
        if index > 0 && !settings.pace.is_zero() {
            thread::sleep(settings.pace);
        }
        scenario.run(&mut run)?;
    }

    let summary = reporter.summarize();
    write_summary(reporter, &summary)?;
    reporter.observer().record(&RunEvent::RunFinished {
        total: summary.total,
        passed: summary.passed,
        warned: summary.warned,
    });
    reporter.flush()?;
    Ok(summary)
}

/// Prints the run banner.
fn write_banner<W: Write>(
    reporter: &mut Reporter<W>,
    settings: &RunSettings,
    sessions: &SessionContext,
) -> Result<(), ReportError> {
    reporter.rule()?;
    reporter.note(BANNER_TITLE)?;
    reporter.note(&format!("Target: {}", settings.target))?;
    reporter.note(&format!("Session: {}...", sessions.main().short()))?;
    reporter.rule()
}

/// Prints the summary block.
fn write_summary<W: Write>(
    reporter: &mut Reporter<W>,
    summary: &RunSummary,
) -> Result<(), ReportError> {
    reporter.line("")?;
    reporter.rule()?;
    reporter.note(&format!("Results: {}/{} tests passed", summary.passed, summary.total))?;
    if summary.all_passed() {
        let indicator = reporter.indicator(Verdict::Pass);
        reporter.note(&format!("[{indicator}] All tests passed!"))?;
    } else {
        let indicator = reporter.indicator(Verdict::Fail);
        reporter.note(&format!("[{indicator}] {} test(s) failed", summary.failed()))?;
    }
    if summary.warned > 0 {
        let indicator = reporter.indicator(Verdict::Warn);
        reporter.note(&format!(
            "[{indicator}] {} warning(s) from permissive checks",
            summary.warned
        ))?;
    }
    reporter.rule()
}

/// Formats the pacing delay for the pause notice.
fn format_pace(pace: Duration) -> String {
    if pace.subsec_millis() == 0 {
        format!("{}s", pace.as_secs())
    } else {
        format!("{}ms", pace.as_millis())
    }
}

// ============================================================================
// SECTION: Execution
// ============================================================================

/// Runs the harness against the configured target, writing the console report
/// to `out`.
///
/// # Errors
///
/// Returns [`DriverError`] when the client cannot be built, the console report
/// cannot be written, or the event log or run report cannot be written.
pub fn execute<W: Write>(config: &HarnessConfig, out: W) -> Result<RunSummary, DriverError> {
    let observer: Arc<dyn RunObserver> = match &config.log_path {
        Some(path) => Arc::new(JsonLinesObserver::new(create_artifact_file(path)?)),
        None => Arc::new(NoopObserver),
    };
    let timeouts = ClientTimeouts {
        chat: config.chat_timeout,
        liveness: config.liveness_timeout,
    };
    let client = WebhookClient::new(&config.base_url, &config.webhook_id, timeouts)?
        .with_observer(Arc::clone(&observer));
    let mut reporter = Reporter::new(out).with_color(config.color).with_observer(observer);
    let sessions = SessionContext::new();
    let settings = RunSettings::from_config(config);

    let started_at_ms = now_millis();
    let summary = run_suite(&settings, &client, &sessions, &mut reporter)?;
    if let Some(path) = &config.report_path {
        let report = RunReport::new(
            &settings.target,
            sessions.main().short(),
            started_at_ms,
            now_millis(),
            reporter.outcomes(),
        );
        write_report(path, &report)?;
    }
    Ok(summary)
}
