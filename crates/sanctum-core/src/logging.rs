//! Tracing setup.
//!
//! The TUI owns the terminal, so logs go to a daily file under
//! `$SANCTUM_HOME/logs`. `SANCTUM_LOG` overrides the configured level using
//! `EnvFilter` directive syntax.

use std::fs;

use anyhow::{Context, Result};
use tracing::debug;
pub use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use crate::config::{Config, paths};

pub const LOG_ENV_VAR: &str = "SANCTUM_LOG";
const LOG_FILE_PREFIX: &str = "sanctum.log";

/// Builds the filter from `SANCTUM_LOG`, else the configured level, else `info`.
pub fn env_filter(config: &Config) -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV_VAR).unwrap_or_else(|_| level_filter(&config.log_level))
}

fn level_filter(level: &str) -> EnvFilter {
    EnvFilter::try_new(level.trim()).unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Installs the global subscriber. Keep the guard alive until exit so buffered
/// lines are flushed.
///
/// # Errors
/// Returns an error if the log directory cannot be created.
pub fn init(config: &Config) -> Result<WorkerGuard> {
    let dir = paths::logs_dir();
    fs::create_dir_all(&dir)
        .with_context(|| format!("Failed to create log directory {}", dir.display()))?;

    let appender = tracing_appender::rolling::daily(&dir, LOG_FILE_PREFIX);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    if let Err(err) = tracing_subscriber::fmt()
        .with_env_filter(env_filter(config))
        .with_writer(writer)
        .with_ansi(false)
        .try_init()
    {
        debug!("Keeping existing subscriber: {err}");
    }

    Ok(guard)
}
