// crates/webhook-chat-e2e/src/config/mod.rs
// ============================================================================
// Module: Harness Configuration
// Description: Centralized configuration for the chat e2e harness.
// Purpose: Provide typed access to target settings and defaults.
// Dependencies: std, url
// ============================================================================

//! ## Overview
//! Harness configuration is read from environment variables and mapped into a
//! small typed structure. Command-line flags overlay it in the binary.

// ============================================================================
// SECTION: Modules
// ============================================================================

mod env;

// ============================================================================
// SECTION: Tests
// ============================================================================


// ============================================================================
// SECTION: Re-exports
// ============================================================================

pub use env::ConfigError;
pub use env::DEFAULT_BASE_URL;
pub use env::DEFAULT_PACE;
pub use env::DEFAULT_WEBHOOK_ID;
pub use env::HarnessConfig;
pub use env::HarnessEnv;
pub use env::parse_base_url;
pub use env::parse_pace_millis;
pub use env::parse_timeout_seconds;
pub use env::parse_webhook_id;
pub use env::read_env_strict;
