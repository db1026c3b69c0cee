// crates/webhook-chat-e2e/src/report.rs
// ============================================================================
// Module: Result Aggregator & Reporter
// Description: Ordered assertion outcomes with live console rendering.
// Purpose: Record every check, print it immediately, and summarize the run.
// Dependencies: serde, thiserror
// ============================================================================

//! ## Overview
//! [`Reporter`] owns the run's [`AssertionOutcome`] sequence. Recording an
//! outcome appends it and renders one indicator line (plus an optional detail
//! excerpt) to the operator-facing writer.
//! Invariants:
//! - Outcomes are append-only; no API mutates or removes a recorded outcome.
//! - An outcome is stored before it is rendered, so write failures lose no
//!   results.
//! - Details are truncated to [`DETAIL_MAX_CHARS`] characters.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io;
use std::io::Write;
use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;

use crate::telemetry::NoopObserver;
use crate::telemetry::RunEvent;
use crate::telemetry::RunObserver;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Maximum number of detail characters kept per outcome.
pub const DETAIL_MAX_CHARS: usize = 200;

/// Maximum number of response characters quoted in content assertions.
pub const EXCERPT_MAX_CHARS: usize = 150;

/// Width of the banner and summary rules.
pub const RULE_WIDTH: usize = 60;

// ============================================================================
// SECTION: Outcomes
// ============================================================================

/// Verdict of a single assertion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    /// Assertion held.
    Pass,
    /// Assertion held only through a permissive fallback.
    Warn,
    /// Assertion did not hold.
    Fail,
}

impl Verdict {
    /// Maps a boolean check into a pass/fail verdict.
    #[must_use]
    pub const fn from_passed(passed: bool) -> Self {
        if passed { Self::Pass } else { Self::Fail }
    }

    /// Returns true unless the verdict is a failure.
    #[must_use]
    pub const fn passed(self) -> bool {
        !matches!(self, Self::Fail)
    }

    /// Returns the indicator label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Pass => "PASS",
            Self::Warn => "WARN",
            Self::Fail => "FAIL",
        }
    }

    /// Returns the ANSI color code for the indicator.
    const fn ansi(self) -> &'static str {
        match self {
            Self::Pass => "\u{1b}[92m",
            Self::Warn => "\u{1b}[93m",
            Self::Fail => "\u{1b}[91m",
        }
    }
}

/// One recorded assertion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AssertionOutcome {
    /// Assertion name.
    pub name: String,
    /// Recorded verdict.
    pub verdict: Verdict,
    /// Truncated diagnostic detail; empty when none was given.
    pub detail: String,
}

impl AssertionOutcome {
    /// Returns true unless the outcome is a failure.
    #[must_use]
    pub const fn passed(&self) -> bool {
        self.verdict.passed()
    }
}

/// Counts derived from the outcome sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct RunSummary {
    /// Total recorded assertions.
    pub total: usize,
    /// Assertions that did not fail (warnings included).
    pub passed: usize,
    /// Passing assertions recorded as warnings.
    pub warned: usize,
}

impl RunSummary {
    /// Computes the summary for a sequence of outcomes.
    #[must_use]
    pub fn from_outcomes(outcomes: &[AssertionOutcome]) -> Self {
        let passed = outcomes.iter().filter(|outcome| outcome.passed()).count();
        let warned = outcomes.iter().filter(|outcome| outcome.verdict == Verdict::Warn).count();
        Self {
            total: outcomes.len(),
            passed,
            warned,
        }
    }

    /// Number of failed assertions.
    #[must_use]
    pub const fn failed(&self) -> usize {
        self.total.saturating_sub(self.passed)
    }

    /// Returns true when no assertion failed.
    #[must_use]
    pub const fn all_passed(&self) -> bool {
        self.passed == self.total
    }

    /// Process exit status: 0 when every assertion passed, else 1.
    #[must_use]
    pub const fn exit_status(&self) -> u8 {
        if self.all_passed() { 0 } else { 1 }
    }
}

/// Truncates text to at most `max_chars` characters.
#[must_use]
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    text.char_indices().nth(max_chars).map_or(text, |(idx, _)| &text[.. idx])
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Errors raised while rendering the report.
#[derive(Debug, Error)]
pub enum ReportError {
    /// Report output could not be written.
    #[error("failed to write report output: {0}")]
    Write(#[from] io::Error),
}

// ============================================================================
// SECTION: Reporter
// ============================================================================

/// Append-only outcome log with live rendering.
pub struct Reporter<W: Write> {
    /// Operator-facing output.
    out: W,
    /// Whether indicators are ANSI-colored.
    color: bool,
    /// Recorded outcomes in order.
    outcomes: Vec<AssertionOutcome>,
    /// Sink for assertion events.
    observer: Arc<dyn RunObserver>,
}

impl<W: Write> Reporter<W> {
    /// Creates a reporter writing plain indicators.
    pub fn new(out: W) -> Self {
        Self {
            out,
            color: false,
            outcomes: Vec::new(),
            observer: Arc::new(NoopObserver),
        }
    }

    /// Enables or disables ANSI colors.
    #[must_use]
    pub fn with_color(mut self, color: bool) -> Self {
        self.color = color;
        self
    }

    /// Attaches a run observer for assertion events.
    #[must_use]
    pub fn with_observer(mut self, observer: Arc<dyn RunObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// Records a pass/fail outcome and renders it.
    ///
    /// # Errors
    ///
    /// Returns [`ReportError`] when the line cannot be written; the outcome is
    /// still recorded.
    pub fn record(&mut self, name: &str, passed: bool, detail: &str) -> Result<(), ReportError> {
        self.push(name, Verdict::from_passed(passed), detail)
    }

    /// Records a warning outcome, which counts as passed.
    ///
    /// # Errors
    ///
    /// Returns [`ReportError`] when the line cannot be written.
    pub fn warn(&mut self, name: &str, detail: &str) -> Result<(), ReportError> {
        self.push(name, Verdict::Warn, detail)
    }

    /// Records an outcome with an explicit verdict.
    ///
    /// # Errors
    ///
    /// Returns [`ReportError`] when the line cannot be written.
    pub fn push(&mut self, name: &str, verdict: Verdict, detail: &str) -> Result<(), ReportError> {
        let detail = truncate_chars(detail, DETAIL_MAX_CHARS);
        let outcome = AssertionOutcome {
            name: name.to_string(),
            verdict,
            detail: detail.to_string(),
        };
        self.observer.record(&RunEvent::Assertion {
            name: outcome.name.clone(),
            verdict,
        });
        self.outcomes.push(outcome);
        let indicator = self.indicator(verdict);
        writeln!(self.out, "  [{indicator}] {name}")?;
        if !detail.is_empty() {
            writeln!(self.out, "         {detail}")?;
        }
        Ok(())
    }

    /// Renders a scenario section header.
    ///
    /// # Errors
    ///
    /// Returns [`ReportError`] when the header cannot be written.
    pub fn section(&mut self, title: &str) -> Result<(), ReportError> {
        writeln!(self.out)?;
        writeln!(self.out, "--- {title} ---")?;
        Ok(())
    }

    /// Renders an indented informational line.
    ///
    /// # Errors
    ///
    /// Returns [`ReportError`] when the line cannot be written.
    pub fn note(&mut self, text: &str) -> Result<(), ReportError> {
        writeln!(self.out, "  {text}")?;
        Ok(())
    }

    /// Renders a raw line.
    ///
    /// # Errors
    ///
    /// Returns [`ReportError`] when the line cannot be written.
    pub fn line(&mut self, text: &str) -> Result<(), ReportError> {
        writeln!(self.out, "{text}")?;
        Ok(())
    }

    /// Renders a horizontal rule.
    ///
    /// # Errors
    ///
    /// Returns [`ReportError`] when the rule cannot be written.
    pub fn rule(&mut self) -> Result<(), ReportError> {
        writeln!(self.out, "{}", "=".repeat(RULE_WIDTH))?;
        Ok(())
    }

    /// Returns the indicator text for a verdict, colored when enabled.
    #[must_use]
    pub fn indicator(&self, verdict: Verdict) -> String {
        if self.color {
            format!("{}{}\u{1b}[0m", verdict.ansi(), verdict.label())
        } else {
            verdict.label().to_string()
        }
    }

    /// Returns the recorded outcomes in order.
    #[must_use]
    pub fn outcomes(&self) -> &[AssertionOutcome] {
        &self.outcomes
    }

    /// Computes the run summary from every recorded outcome.
    #[must_use]
    pub fn summarize(&self) -> RunSummary {
        RunSummary::from_outcomes(&self.outcomes)
    }

    /// Returns the attached observer.
    #[must_use]
    pub fn observer(&self) -> &Arc<dyn RunObserver> {
        &self.observer
    }

    /// Flushes the output writer.
    ///
    /// # Errors
    ///
    /// Returns [`ReportError`] when the flush fails.
    pub fn flush(&mut self) -> Result<(), ReportError> {
        self.out.flush()?;
        Ok(())
    }

    /// Consumes the reporter and returns the writer.
    pub fn into_inner(self) -> W {
        self.out
    }
}
