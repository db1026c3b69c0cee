// crates/webhook-chat-e2e/src/scenarios.rs
// ============================================================================
// Module: Scenario Runner
// Description: Ordered chat scenarios and their structural assertions.
// Purpose: Exercise search, follow-up context, and session isolation.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! Each [`Scenario`] sends one chat message through a [`ChatTransport`] and
//! records structural assertions on the reply through the [`Reporter`].
//! Keyword checks are fuzzy oracles: they catch gross regressions (empty
//! replies, unresolved references) and accept false negatives.
//! Invariants:
//! - A non-200 call records a failing "got response" outcome and skips the
//!   content checks that would read an absent reply.
//! - Failures are recorded, never raised; only report write errors propagate.
//! - The isolation scenario always uses a session distinct from the main one.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io::Write;

use serde::Serialize;

use crate::report::EXCERPT_MAX_CHARS;
use crate::report::ReportError;
use crate::report::Reporter;
use crate::report::Verdict;
use crate::report::truncate_chars;
use crate::session::SessionContext;
use crate::session::SessionId;
use crate::transport::ChatResult;
use crate::transport::ChatTransport;

// ============================================================================
// SECTION: Keyword Oracles
// ============================================================================

/// Terms signaling a product listing or a graceful empty/apology reply.
pub const SEARCH_KEYWORDS: &[&str] =
    &["dress", "product", "fashion", "available", "$", "price", "sorry", "search"];

/// Phrases signaling that a referential follow-up was not resolved.
pub const UNRESOLVED_REFERENCE_PHRASES: &[&str] =
    &["which product", "what product", "please specify"];

/// Phrases acknowledging that a fresh session has no earlier exchange.
pub const NO_MEMORY_PHRASES: &[&str] =
    &["don't have", "no previous", "haven't", "first time", "not sure", "sorry", "no prior"];

/// Returns true when `text` contains any keyword, ignoring case.
#[must_use]
pub fn contains_any(text: &str, keywords: &[&str]) -> bool {
    // Typographic apostrophes are folded so "don’t" matches "don't".
    let normalized = text.to_lowercase().replace('\u{2019}', "'");
    keywords.iter().any(|keyword| normalized.contains(keyword))
}

/// Returns the reply excerpt quoted in content assertion details.
#[must_use]
pub fn excerpt(text: &str) -> &str {
    truncate_chars(text, EXCERPT_MAX_CHARS)
}

// ============================================================================
// SECTION: Isolation Policy
// ============================================================================

/// How strictly the new-session scenario judges a reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IsolationPolicy {
    /// A non-empty reply without a no-memory phrase passes with a warning.
    #[default]
    Permissive,
    /// Only an explicit no-memory acknowledgment passes.
    Strict,
}

/// Judges a fresh-session reply under the given policy.
#[must_use]
pub fn isolation_verdict(output: &str, policy: IsolationPolicy) -> Verdict {
    if contains_any(output, NO_MEMORY_PHRASES) {
        return Verdict::Pass;
    }
    match policy {
        IsolationPolicy::Permissive if !output.is_empty() => Verdict::Warn,
        IsolationPolicy::Permissive | IsolationPolicy::Strict => Verdict::Fail,
    }
}

// ============================================================================
// SECTION: Scenario Context
// ============================================================================

/// Borrowed state shared by every scenario in a run.
pub struct ScenarioRun<'a, T: ChatTransport + ?Sized, W: Write> {
    /// Network seam.
    transport: &'a T,
    /// Outcome sink.
    reporter: &'a mut Reporter<W>,
    /// Main and isolated session source.
    sessions: &'a SessionContext,
    /// Isolation scenario policy.
    isolation: IsolationPolicy,
}

impl<'a, T: ChatTransport + ?Sized, W: Write> ScenarioRun<'a, T, W> {
    /// Creates a scenario context.
    pub fn new(
        transport: &'a T,
        reporter: &'a mut Reporter<W>,
        sessions: &'a SessionContext,
        isolation: IsolationPolicy,
    ) -> Self {
        Self {
            transport,
            reporter,
            sessions,
            isolation,
        }
    }

    /// Announces and sends a message on the main session.
    fn send_main(&mut self, message: &str) -> Result<ChatResult, ReportError> {
        self.reporter.note(&format!("Sending: '{message}'"))?;
        Ok(self.transport.send_chat(message, self.sessions.main()))
    }

    /// Announces and sends a message on a session other than the main one.
    fn send_isolated(
        &mut self,
        message: &str,
        session: &SessionId,
    ) -> Result<ChatResult, ReportError> {
        self.reporter
            .note(&format!("Sending: '{message}' (new session: {}...)", session.short()))?;
        Ok(self.transport.send_chat(message, session))
    }
}

// ============================================================================
// SECTION: Scenarios
// ============================================================================

/// Chat scenarios in required execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Scenario {
    /// Browse a product category on the main session.
    ProductSearch,
    /// Refer back to the previous listing on the main session.
    FollowUp,
    /// Run an unrelated search on the main session.
    SecondSearch,
    /// Ask about earlier messages on a fresh session.
    NewSession,
    /// Ask about stock on the main session.
    Availability,
}

impl Scenario {
    /// Every chat scenario in execution order.
    pub const ORDERED: [Self; 5] = [
        Self::ProductSearch,
        Self::FollowUp,
        Self::SecondSearch,
        Self::NewSession,
        Self::Availability,
    ];

    /// Position in the run; the liveness check is number 1.
    #[must_use]
    pub const fn number(self) -> u8 {
        match self {
            Self::ProductSearch => 2,
            Self::FollowUp => 3,
            Self::SecondSearch => 4,
            Self::NewSession => 5,
            Self::Availability => 6,
        }
    }

    /// Section title.
    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Self::ProductSearch => "Product Search",
            Self::FollowUp => "Context Retention (Follow-up)",
            Self::SecondSearch => "Second Search (Same Session)",
            Self::NewSession => "New Session (No Previous Context)",
            Self::Availability => "Availability Query",
        }
    }

    /// Chat message sent by the scenario.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::ProductSearch => "Show me dresses",
            Self::FollowUp => "Tell me more about the first one",
            Self::SecondSearch => "Do you have any jackets?",
            Self::NewSession => "What did I ask about earlier?",
            Self::Availability => "What shirts do you have in stock?",
        }
    }

    /// Runs the scenario, recording its assertions.
    ///
    /// # Errors
    ///
    /// Returns [`ReportError`] when report output cannot be written.
    pub fn run<T: ChatTransport + ?Sized, W: Write>(
        self,
        run: &mut ScenarioRun<'_, T, W>,
    ) -> Result<(), ReportError> {
        run.reporter.section(&format!("Test {}: {}", self.number(), self.title()))?;
        match self {
            Self::ProductSearch => product_search(run),
            Self::FollowUp => follow_up(run),
            Self::SecondSearch => second_search(run),
            Self::NewSession => new_session(run),
            Self::Availability => availability(run),
        }
    }
}

/// Records the "got response" check and returns the reply text on HTTP 200.
///
/// Only the search and follow-up scenarios quote the status as detail.
fn check_response<T: ChatTransport + ?Sized, W: Write>(
    run: &mut ScenarioRun<'_, T, W>,
    name: &str,
    result: &ChatResult,
    show_status: bool,
) -> Result<Option<String>, ReportError> {
    let detail =
        if show_status { format!("Status: {}", result.status) } else { String::new() };
    run.reporter.record(name, result.is_ok(), &detail)?;
    Ok(result.is_ok().then(|| result.output_text().into_owned()))
}

/// Scenario 2: category search with a keyword oracle.
fn product_search<T: ChatTransport + ?Sized, W: Write>(
    run: &mut ScenarioRun<'_, T, W>,
) -> Result<(), ReportError> {
    let result = run.send_main(Scenario::ProductSearch.message())?;
    let Some(output) = check_response(run, "Got response from workflow", &result, true)? else {
        return run.reporter.record(
            "Response contains product info",
            false,
            &format!("Error: {}", result.payload),
        );
    };
    run.reporter.record("Response is not empty", !output.is_empty(), "")?;
    run.reporter.record(
        "Response mentions products or fashion",
        contains_any(&output, SEARCH_KEYWORDS),
        excerpt(&output),
    )
}

/// Scenario 3: referential follow-up with a negative oracle.
fn follow_up<T: ChatTransport + ?Sized, W: Write>(
    run: &mut ScenarioRun<'_, T, W>,
) -> Result<(), ReportError> {
    let result = run.send_main(Scenario::FollowUp.message())?;
    let Some(output) = check_response(run, "Got follow-up response", &result, true)? else {
        return run.reporter.record(
            "Follow-up uses context",
            false,
            &format!("Error: {}", result.payload),
        );
    };
    run.reporter.record("Follow-up response is not empty", !output.is_empty(), "")?;
    run.reporter.record(
        "Response appears contextual (not generic error)",
        !contains_any(&output, UNRESOLVED_REFERENCE_PHRASES),
        excerpt(&output),
    )
}

/// Scenario 4: unrelated search on the shared session.
fn second_search<T: ChatTransport + ?Sized, W: Write>(
    run: &mut ScenarioRun<'_, T, W>,
) -> Result<(), ReportError> {
    let result = run.send_main(Scenario::SecondSearch.message())?;
    let Some(output) = check_response(run, "Got response for second search", &result, false)? else {
        return Ok(());
    };
    run.reporter.record("Second search returns content", !output.is_empty(), excerpt(&output))
}

/// Scenario 5: memory question on a fresh session.
fn new_session<T: ChatTransport + ?Sized, W: Write>(
    run: &mut ScenarioRun<'_, T, W>,
) -> Result<(), ReportError> {
    let session = run.sessions.isolated();
    let result = run.send_isolated(Scenario::NewSession.message(), &session)?;
    let Some(output) = check_response(run, "Got response for new session", &result, false)? else {
        return Ok(());
    };
    let name = "New session has no prior context";
    match isolation_verdict(&output, run.isolation) {
        Verdict::Warn => run.reporter.warn(name, excerpt(&output)),
        verdict => run.reporter.push(name, verdict, excerpt(&output)),
    }
}

/// Scenario 6: stock question on the shared session.
fn availability<T: ChatTransport + ?Sized, W: Write>(
    run: &mut ScenarioRun<'_, T, W>,
) -> Result<(), ReportError> {
    let result = run.send_main(Scenario::Availability.message())?;
    let Some(output) = check_response(run, "Got availability response", &result, false)? else {
        return Ok(());
    };
    run.reporter.record("Response addresses availability", !output.is_empty(), excerpt(&output))
}
