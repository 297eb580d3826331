// src/logging.rs

//! Logging setup for `taskgraph` using `tracing` + `tracing-subscriber`.
//!
//! Priority for determining the filter:
//! 1. `--log-level` CLI flag (if provided)
//! 2. `TASKGRAPH_LOG` environment variable: a plain level ("info", "debug")
//!    or a full filter directive ("taskgraph::dag=trace,info")
//! 3. default to `info`
//!
//! Logs are sent to STDERR so that stdout stays free for task output and
//! `--dry-run` / `--dot` listings.

use anyhow::{anyhow, Result};
use tracing::Level;
use tracing_subscriber::{fmt, EnvFilter};

use crate::cli::LogLevel;

const LOG_ENV: &str = "TASKGRAPH_LOG";

/// Initialise the global logging subscriber.
///
/// Fails if a global subscriber is already installed.
pub fn init_logging(cli_level: Option<LogLevel>) -> Result<()> {
    let filter = match cli_level {
        Some(lvl) => filter_for_level(level_from_log_level(lvl)),
        None => filter_from_env().unwrap_or_else(|| filter_for_level(Level::INFO)),
    };

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|err| anyhow!("failed to initialise logging: {err}"))
}

/// Filter from `TASKGRAPH_LOG`, if it is set and parses.
pub fn filter_from_env() -> Option<EnvFilter> {
    std::env::var(LOG_ENV)
        .ok()
        .and_then(|s| filter_from_env_str(&s))
}

fn filter_for_level(level: Level) -> EnvFilter {
    EnvFilter::default().add_directive(level.into())
}

fn filter_from_env_str(s: &str) -> Option<EnvFilter> {
    match parse_level_str(s) {
        Some(level) => Some(filter_for_level(level)),
        None => EnvFilter::try_new(s.trim()).ok(),
    }
}

fn level_from_log_level(lvl: LogLevel) -> Level {
    match lvl {
        LogLevel::Error => Level::ERROR,
        LogLevel::Warn => Level::WARN,
        LogLevel::Info => Level::INFO,
        LogLevel::Debug => Level::DEBUG,
        LogLevel::Trace => Level::TRACE,
    }
}

fn parse_level_str(s: &str) -> Option<Level> {
    match s.trim().to_lowercase().as_str() {
        "error" => Some(Level::ERROR),
        "warn" | "warning" => Some(Level::WARN),
        "info" => Some(Level::INFO),
        "debug" => Some(Level::DEBUG),
        "trace" => Some(Level::TRACE),
        _ => None,
    }
}
