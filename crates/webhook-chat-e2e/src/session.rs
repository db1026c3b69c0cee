// crates/webhook-chat-e2e/src/session.rs
// ============================================================================
// Module: Session Context
// Description: Opaque session identifiers binding chat calls into conversations.
// Purpose: Generate the main run session and isolated fresh sessions.
// Dependencies: uuid
// ============================================================================

//! ## Overview
//! A [`SessionId`] names one logical conversation on the target workflow.
//! [`SessionContext`] holds the main session shared by scenarios that rely on
//! retained context and hands out independent sessions for isolation checks.
//! Invariants:
//! - Identifiers are UUID v4 strings in hyphenated lowercase form.
//! - The main session never changes for the lifetime of a context.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use uuid::Uuid;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Number of leading characters shown when a session is printed in banners.
pub const SESSION_PREFIX_LEN: usize = 8;

// ============================================================================
// SECTION: Session Identifier
// ============================================================================

/// Opaque session identifier sent as `sessionId` on every chat call.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionId(String);

impl SessionId {
    /// Generates a fresh random identifier.
    #[must_use]
    pub fn new_random() -> Self {
        Self(Uuid::new_v4().hyphenated().to_string())
    }

    /// Wraps an existing identifier without validation.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the banner prefix of the identifier.
    #[must_use]
    pub fn short(&self) -> &str {
        self.0
            .char_indices()
            .nth(SESSION_PREFIX_LEN)
            .map_or(self.0.as_str(), |(idx, _)| &self.0[.. idx])
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ============================================================================
// SECTION: Session Context
// ============================================================================

/// Run-scoped session state owned by the process driver.
#[derive(Debug, Clone)]
pub struct SessionContext {
    /// Session shared by every scenario that expects retained context.
    main: SessionId,
}

impl SessionContext {
    /// Creates a context with a freshly generated main session.
    #[must_use]
    pub fn new() -> Self {
        Self::with_main(SessionId::new_random())
    }

    /// Creates a context around a known main session.
    #[must_use]
    pub const fn with_main(main: SessionId) -> Self {
        Self {
            main,
        }
    }

    /// Returns the main session.
    #[must_use]
    pub const fn main(&self) -> &SessionId {
        &self.main
    }

    /// Returns a new session that shares nothing with the main session.
    #[must_use]
    pub fn isolated(&self) -> SessionId {
        loop {
            let candidate = SessionId::new_random();
            if candidate != self.main {
                return candidate;
            }
        }
    }
}

impl Default for SessionContext {
    fn default() -> Self {
        Self::new()
    }
}
