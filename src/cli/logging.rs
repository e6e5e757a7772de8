//! Logging initialization

use std::path::Path;
use std::sync::Mutex;

use anyhow::{Context, Result};
use tracing_subscriber::EnvFilter;

/// Install the global tracing subscriber
///
/// The filter comes from `level` (the `--log-level` flag), else `RUST_LOG`,
/// else `default_level` from the configuration. Logs go to stderr, or to
/// `log_file` without ANSI codes when one is given.
pub fn init_logging(level: Option<&str>, default_level: &str, log_file: Option<&Path>) -> Result<()> {
    let filter = match level {
        Some(level) => {
            EnvFilter::try_new(level).with_context(|| format!("Invalid log level: {}", level))?
        }
        None => match EnvFilter::try_from_default_env() {
            Ok(filter) => filter,
            Err(_) => EnvFilter::try_new(default_level)
                .with_context(|| format!("Invalid configured log level: {}", default_level))?,
        },
    };

    match log_file {
        Some(path) => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file: {}", path.display()))?;

            tracing_subscriber::fmt()
                .with_writer(Mutex::new(file))
                .with_env_filter(filter)
                .with_ansi(false) // No ANSI codes in log file
                .with_target(true)
                .init();
        }
        None => {
            tracing_subscriber::fmt()
                .with_writer(std::io::stderr)
                .with_env_filter(filter)
                .with_target(false)
                .init();
        }
    }

    Ok(())
}
