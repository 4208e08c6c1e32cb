//! Tracing setup.
//!
//! The TUI owns the terminal, so while it runs logs go to the configured log
//! file or nowhere. One-shot commands log to stderr.

use std::fs::OpenOptions;
use std::sync::Mutex;

use anyhow::{Context, Error, Result};
use tracing_subscriber::{fmt, EnvFilter};

use crate::settings::ViewerSettings;

/// Where log output should go.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogTarget {
    /// Interactive mode: the log file if configured, otherwise discard.
    Tui,
    /// Non-interactive mode: stderr, unless a log file is configured.
    Stderr,
}

pub fn init(settings: &ViewerSettings, target: LogTarget) -> Result<()> {
    let filter =
        EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(&settings.log_level))?;
    let builder = fmt::Subscriber::builder().with_env_filter(filter);

    match (&settings.log_file, target) {
        (Some(path), _) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("failed to open log file {}", path.display()))?;
            builder
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .try_init()
                .map_err(Error::msg)?;
        }
        (None, LogTarget::Stderr) => {
            builder.with_writer(std::io::stderr).try_init().map_err(Error::msg)?;
        }
        (None, LogTarget::Tui) => {}
    }

    Ok(())
}
