//! Viewer settings.
//!
//! Layered, lowest priority first: built-in defaults, an optional TOML
//! settings file, `MWAN_STATUS_*` environment variables. Command-line flags
//! are applied on top by the binary.
//!
//! ```toml
//! status_file = "/var/run/mini-mwan.status"
//! uci_config = "/etc/config/mini-mwan"
//! refresh_secs = 5
//! log_level = "debug"
//! log_file = "/tmp/mwan-status.log"
//! ```

use std::path::{Path, PathBuf};

use anyhow::Result;
use config::{Config, Environment, File, FileFormat};
use serde::Deserialize;

use crate::source::DEFAULT_STATUS_PATH;
use crate::uci::DEFAULT_UCI_PATH;

/// Settings file read when no explicit path is given (optional).
pub const DEFAULT_SETTINGS_PATH: &str = "/etc/mwan-status.toml";

/// Refresh cadence of the status page, in seconds.
pub const DEFAULT_REFRESH_SECS: u64 = 5;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ViewerSettings {
    /// Status file written by the daemon.
    pub status_file: PathBuf,
    /// Service configuration (UCI).
    pub uci_config: PathBuf,
    /// Seconds between status file polls.
    pub refresh_secs: u64,
    /// Default tracing filter when `RUST_LOG` is unset.
    pub log_level: String,
    /// Where to write logs while the TUI owns the terminal.
    #[serde(default)]
    pub log_file: Option<PathBuf>,
}

impl Default for ViewerSettings {
    fn default() -> Self {
        Self {
            status_file: PathBuf::from(DEFAULT_STATUS_PATH),
            uci_config: PathBuf::from(DEFAULT_UCI_PATH),
            refresh_secs: DEFAULT_REFRESH_SECS,
            log_level: "info".to_string(),
            log_file: None,
        }
    }
}

impl ViewerSettings {
    /// Load settings. An explicit `path` must exist; the default settings
    /// file is optional.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let defaults = Self::default();
        let file = match path {
            Some(path) => File::from(path).format(FileFormat::Toml).required(true),
            None => File::with_name(DEFAULT_SETTINGS_PATH)
                .format(FileFormat::Toml)
                .required(false),
        };

        let config = Config::builder()
            .set_default("status_file", defaults.status_file.to_string_lossy().as_ref())?
            .set_default("uci_config", defaults.uci_config.to_string_lossy().as_ref())?
            .set_default("refresh_secs", defaults.refresh_secs)?
            .set_default("log_level", defaults.log_level)?
            .add_source(file)
            .add_source(Environment::with_prefix("MWAN_STATUS"))
            .build()?;

        Ok(config.try_deserialize()?)
    }
}
