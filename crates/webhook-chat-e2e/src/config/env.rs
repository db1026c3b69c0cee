// crates/webhook-chat-e2e/src/config/env.rs
// ============================================================================
// Module: Harness Environment
// Description: Environment-backed configuration for the chat e2e harness.
// Purpose: Centralize env parsing with strict UTF-8 validation.
// Dependencies: thiserror, url
// ============================================================================

//! ## Overview
//! Environment values are parsed with strict UTF-8 enforcement to avoid silent
//! misconfiguration. Invalid UTF-8 and empty values fail closed.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;
use url::Url;

use crate::scenarios::IsolationPolicy;
use crate::transport::webhook::DEFAULT_CHAT_TIMEOUT;
use crate::transport::webhook::DEFAULT_LIVENESS_TIMEOUT;

// ============================================================================
// SECTION: Defaults
// ============================================================================

/// Default target base address.
pub const DEFAULT_BASE_URL: &str = "http://localhost:5678";

/// Default webhook resource identifier of the target workflow.
pub const DEFAULT_WEBHOOK_ID: &str = "f67e2ae9-cf70-4068-97f5-07ca8f0f902b";

/// Default pause between scenarios.
pub const DEFAULT_PACE: Duration = Duration::from_secs(2);

// ============================================================================
// SECTION: Environment Constants
// ============================================================================

/// Environment keys for harness configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HarnessEnv {
    /// Target base address.
    BaseUrl,
    /// Legacy alias for the target base address.
    LegacyBaseUrl,
    /// Webhook resource identifier.
    WebhookId,
    /// Chat timeout in seconds (positive integer).
    TimeoutSeconds,
    /// Liveness timeout in seconds (positive integer).
    LivenessTimeoutSeconds,
    /// Pause between scenarios in milliseconds (zero allowed).
    PaceMillis,
    /// Optional JSON report path.
    ReportPath,
    /// Optional JSON-lines event log path.
    LogPath,
    /// Strict isolation checks (`true`/`false` or `1`/`0`).
    StrictIsolation,
    /// Disables ANSI colors when set to any value.
    NoColor,
}

impl HarnessEnv {
    /// Returns the canonical environment variable name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::BaseUrl => "CHAT_E2E_BASE_URL",
            Self::LegacyBaseUrl => "N8N_BASE",
            Self::WebhookId => "CHAT_E2E_WEBHOOK_ID",
            Self::TimeoutSeconds => "CHAT_E2E_TIMEOUT_SEC",
            Self::LivenessTimeoutSeconds => "CHAT_E2E_LIVENESS_TIMEOUT_SEC",
            Self::PaceMillis => "CHAT_E2E_PACE_MS",
            Self::ReportPath => "CHAT_E2E_REPORT_PATH",
            Self::LogPath => "CHAT_E2E_LOG_PATH",
            Self::StrictIsolation => "CHAT_E2E_STRICT_ISOLATION",
            Self::NoColor => "NO_COLOR",
        }
    }

    /// Returns every key, in documentation order.
    #[must_use]
    pub const fn all() -> [Self; 10] {
        [
            Self::BaseUrl,
            Self::LegacyBaseUrl,
            Self::WebhookId,
            Self::TimeoutSeconds,
            Self::LivenessTimeoutSeconds,
            Self::PaceMillis,
            Self::ReportPath,
            Self::LogPath,
            Self::StrictIsolation,
            Self::NoColor,
        ]
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Configuration errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// Environment value is not valid UTF-8.
    #[error("{0} must be valid UTF-8")]
    InvalidUtf8(String),
    /// Environment value is set but empty.
    #[error("{0} must not be empty")]
    Empty(String),
    /// Value failed validation.
    #[error("{name} {reason}")]
    InvalidValue {
        /// Setting name.
        name: String,
        /// Validation failure.
        reason: String,
    },
    /// Base address is not an absolute http(s) URL.
    #[error("invalid base url {url}: {reason}")]
    InvalidBaseUrl {
        /// Rejected value.
        url: String,
        /// Validation failure.
        reason: String,
    },
    /// Webhook identifier is empty or contains a path separator.
    #[error("invalid webhook id: {0}")]
    InvalidWebhookId(String),
}

// ============================================================================
// SECTION: Config Types
// ============================================================================

/// Typed harness configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HarnessConfig {
    /// Target base address without a trailing slash.
    pub base_url: String,
    /// Webhook resource identifier.
    pub webhook_id: String,
    /// Per-attempt chat timeout.
    pub chat_timeout: Duration,
    /// Liveness probe timeout.
    pub liveness_timeout: Duration,
    /// Pause between scenarios.
    pub pace: Duration,
    /// Optional JSON report path.
    pub report_path: Option<PathBuf>,
    /// Optional JSON-lines event log path.
    pub log_path: Option<PathBuf>,
    /// Isolation scenario policy.
    pub isolation: IsolationPolicy,
    /// Whether console indicators are colored.
    pub color: bool,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            webhook_id: DEFAULT_WEBHOOK_ID.to_string(),
            chat_timeout: DEFAULT_CHAT_TIMEOUT,
            liveness_timeout: DEFAULT_LIVENESS_TIMEOUT,
            pace: DEFAULT_PACE,
            report_path: None,
            log_path: None,
            isolation: IsolationPolicy::Permissive,
            color: true,
        }
    }
}

impl HarnessConfig {
    /// Loads configuration from defaults overlaid with environment variables.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when an environment value is not valid UTF-8,
    /// is empty, or fails validation.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = Self::default();
        let base_url = match read_env_nonempty(HarnessEnv::BaseUrl.as_str())? {
            Some(value) => Some(value),
            None => read_env_nonempty(HarnessEnv::LegacyBaseUrl.as_str())?,
        };
        if let Some(base_url) = base_url {
            config.base_url = parse_base_url(&base_url)?;
        }
        if let Some(webhook_id) = read_env_nonempty(HarnessEnv::WebhookId.as_str())? {
            config.webhook_id = parse_webhook_id(&webhook_id)?;
        }
        if let Some(raw) = read_env_nonempty(HarnessEnv::TimeoutSeconds.as_str())? {
            config.chat_timeout = parse_timeout_seconds(HarnessEnv::TimeoutSeconds.as_str(), &raw)?;
        }
        if let Some(raw) = read_env_nonempty(HarnessEnv::LivenessTimeoutSeconds.as_str())? {
            config.liveness_timeout =
                parse_timeout_seconds(HarnessEnv::LivenessTimeoutSeconds.as_str(), &raw)?;
        }
        if let Some(raw) = read_env_nonempty(HarnessEnv::PaceMillis.as_str())? {
            config.pace = parse_pace_millis(HarnessEnv::PaceMillis.as_str(), &raw)?;
        }
        config.report_path = read_env_nonempty(HarnessEnv::ReportPath.as_str())?.map(PathBuf::from);
        config.log_path = read_env_nonempty(HarnessEnv::LogPath.as_str())?.map(PathBuf::from);
        let strict = parse_bool_env(
            HarnessEnv::StrictIsolation.as_str(),
            read_env_nonempty(HarnessEnv::StrictIsolation.as_str())?,
        )?;
        if strict {
            config.isolation = IsolationPolicy::Strict;
        }
        config.color = read_env_strict(HarnessEnv::NoColor.as_str())?.is_none();
        Ok(config)
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Reads an environment variable and enforces UTF-8 validity.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidUtf8`] when the variable contains invalid UTF-8.
pub fn read_env_strict(name: &str) -> Result<Option<String>, ConfigError> {
    std::env::var_os(name).map_or(Ok(None), |raw| {
        raw.into_string().map(Some).map_err(|_| ConfigError::InvalidUtf8(name.to_string()))
    })
}

/// Reads an environment variable and rejects empty values.
///
/// # Errors
///
/// Returns [`ConfigError::Empty`] when the variable is set but empty or whitespace.
fn read_env_nonempty(name: &str) -> Result<Option<String>, ConfigError> {
    match read_env_strict(name)? {
        Some(value) if value.trim().is_empty() => Err(ConfigError::Empty(name.to_string())),
        Some(value) => Ok(Some(value)),
        None => Ok(None),
    }
}

/// Validates a base address and strips trailing slashes.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidBaseUrl`] when the value is not an absolute
/// `http` or `https` URL with a host.
pub fn parse_base_url(raw: &str) -> Result<String, ConfigError> {
    let trimmed = raw.trim();
    let invalid = |reason: &str| ConfigError::InvalidBaseUrl {
        url: trimmed.to_string(),
        reason: reason.to_string(),
    };
    let url = Url::parse(trimmed).map_err(|err| invalid(&err.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid("scheme must be http or https"));
    }
    if url.host_str().is_none() {
        return Err(invalid("missing host"));
    }
    if url.query().is_some() || url.fragment().is_some() {
        return Err(invalid("query and fragment are not allowed"));
    }
    Ok(trimmed.trim_end_matches('/').to_string())
}

/// Validates a webhook resource identifier.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidWebhookId`] when the value is empty or
/// contains a path separator or whitespace.
pub fn parse_webhook_id(raw: &str) -> Result<String, ConfigError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed.contains(['/', '?', '#']) || trimmed.contains(char::is_whitespace)
    {
        return Err(ConfigError::InvalidWebhookId(raw.to_string()));
    }
    Ok(trimmed.to_string())
}

/// Parses a positive timeout value in seconds.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidValue`] when the value is non-numeric or zero.
pub fn parse_timeout_seconds(name: &str, raw: &str) -> Result<Duration, ConfigError> {
    let secs: u64 = raw.trim().parse().map_err(|_| ConfigError::InvalidValue {
        name: name.to_string(),
        reason: "must be a positive integer number of seconds".to_string(),
    })?;
    if secs == 0 {
        return Err(ConfigError::InvalidValue {
            name: name.to_string(),
            reason: "must be greater than zero".to_string(),
        });
    }
    Ok(Duration::from_secs(secs))
}

/// Parses a non-negative pacing delay in milliseconds.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidValue`] when the value is non-numeric.
pub fn parse_pace_millis(name: &str, raw: &str) -> Result<Duration, ConfigError> {
    raw.trim().parse().map(Duration::from_millis).map_err(|_| ConfigError::InvalidValue {
        name: name.to_string(),
        reason: "must be a non-negative integer number of milliseconds".to_string(),
    })
}

/// Parses a boolean environment variable, defaulting to false when unset.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidValue`] when the value is not a recognized
/// boolean literal.
fn parse_bool_env(name: &str, raw: Option<String>) -> Result<bool, ConfigError> {
    let Some(value) = raw else {
        return Ok(false);
    };
    let trimmed = value.trim();
    if trimmed.eq_ignore_ascii_case("true") || trimmed == "1" {
        return Ok(true);
    }
    if trimmed.eq_ignore_ascii_case("false") || trimmed == "0" {
        return Ok(false);
    }
    Err(ConfigError::InvalidValue {
        name: name.to_string(),
        reason: "must be 1, 0, true, or false".to_string(),
    })
}
