// src/logging.rs
// =============================================================================
// Sets up the tracing subscriber.
//
// Logs always go to stderr: stdout carries the Markdown or JSON the user asked
// for, and mixing the two would break piping into other tools.
// =============================================================================

use anyhow::{anyhow, Result};
use tracing_subscriber::EnvFilter;

use crate::config::LogLevel;

/// Installs the global subscriber at the given level.
///
/// `RUST_LOG`, when set, wins over `level` so individual modules can be
/// turned up while debugging.
pub fn init(level: LogLevel) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.as_directive()));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow!("Failed to initialize logging: {}", e))
}
