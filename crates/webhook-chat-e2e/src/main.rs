// crates/webhook-chat-e2e/src/main.rs
// ============================================================================
// Module: Chat E2E CLI Entry Point
// Description: Command-line driver for the webhook chat e2e harness.
// Purpose: Resolve configuration, run the suite, and map results to exit codes.
// Dependencies: clap, webhook-chat-e2e
// ============================================================================

//! ## Overview
//! `chat-e2e` loads configuration from the environment, overlays command-line
//! flags, runs every scenario against the target, and exits with `0` when
//! every assertion passed and `1` otherwise. Configuration and output errors
//! are written to stderr and also exit with `1`.

// ============================================================================
// SECTION: Modules
// ============================================================================


// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use clap::Parser;
use webhook_chat_e2e::ConfigError;
use webhook_chat_e2e::HarnessConfig;
use webhook_chat_e2e::IsolationPolicy;
use webhook_chat_e2e::config::parse_base_url;
use webhook_chat_e2e::config::parse_webhook_id;
use webhook_chat_e2e::execute;

// ============================================================================
// SECTION: CLI Types
// ============================================================================

/// Command-line flags; each one overrides its environment counterpart.
#[derive(Debug, Parser)]
#[command(
    name = "chat-e2e",
    version,
    about = "End-to-end checks for a chat workflow exposed over a webhook"
)]
struct Cli {
    /// Target base address (env: `CHAT_E2E_BASE_URL`, legacy `N8N_BASE`).
    #[arg(long, value_name = "URL")]
    base_url: Option<String>,
    /// Webhook resource identifier (env: `CHAT_E2E_WEBHOOK_ID`).
    #[arg(long, value_name = "ID")]
    webhook_id: Option<String>,
    /// Per-attempt chat timeout in seconds (env: `CHAT_E2E_TIMEOUT_SEC`).
    #[arg(long, value_name = "SECONDS", value_parser = clap::value_parser!(u64).range(1..))]
    timeout_secs: Option<u64>,
    /// Pause between scenarios in milliseconds (env: `CHAT_E2E_PACE_MS`).
    #[arg(long, value_name = "MILLIS")]
    pace_ms: Option<u64>,
    /// Write a canonical JSON run report (env: `CHAT_E2E_REPORT_PATH`).
    #[arg(long, value_name = "PATH")]
    report: Option<PathBuf>,
    /// Write JSON-lines run events (env: `CHAT_E2E_LOG_PATH`).
    #[arg(long, value_name = "PATH")]
    log: Option<PathBuf>,
    /// Fail the isolation check unless the reply disclaims prior context.
    #[arg(long)]
    strict_isolation: bool,
    /// Disable ANSI colors (env: `NO_COLOR`).
    #[arg(long)]
    no_color: bool,
}

impl Cli {
    /// Overlays the flags onto an environment-derived configuration.
    fn apply(self, mut config: HarnessConfig) -> Result<HarnessConfig, ConfigError> {
        if let Some(base_url) = self.base_url {
            config.base_url = parse_base_url(&base_url)?;
        }
        if let Some(webhook_id) = self.webhook_id {
            config.webhook_id = parse_webhook_id(&webhook_id)?;
        }
        if let Some(secs) = self.timeout_secs {
            config.chat_timeout = Duration::from_secs(secs);
        }
        if let Some(millis) = self.pace_ms {
            config.pace = Duration::from_millis(millis);
        }
        if self.report.is_some() {
            config.report_path = self.report;
        }
        if self.log.is_some() {
            config.log_path = self.log;
        }
        if self.strict_isolation {
            config.isolation = IsolationPolicy::Strict;
        }
        if self.no_color {
            config.color = false;
        }
        Ok(config)
    }
}

// ============================================================================
// SECTION: Entry Point
// ============================================================================

/// CLI entry point returning an exit code.
fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(message) => emit_error(&message),
    }
}

/// Resolves configuration and runs the suite.
fn run() -> Result<ExitCode, String> {
    let cli = Cli::parse();
    let config = HarnessConfig::load().map_err(|err| err.to_string())?;
    let config = cli.apply(config).map_err(|err| err.to_string())?;
    let summary = execute(&config, std::io::stdout().lock()).map_err(|err| err.to_string())?;
    Ok(ExitCode::from(summary.exit_status()))
}

/// Writes a line to stderr.
fn write_stderr_line(message: &str) -> std::io::Result<()> {
    let mut stderr = std::io::stderr();
    writeln!(&mut stderr, "{message}")
}

/// Emits an error message to stderr and returns a failure exit code.
fn emit_error(message: &str) -> ExitCode {
    let _ = write_stderr_line(message);
    ExitCode::FAILURE
}
