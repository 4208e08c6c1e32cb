//! Data source abstraction for receiving status snapshots.
//!
//! The daemon normally publishes its state by rewriting a status file, but
//! an in-process producer can push snapshots through a channel instead.

mod channel;
mod file;
mod snapshot;

pub use channel::ChannelSource;
pub use file::FileSource;
pub use snapshot::{
    InterfaceStatus, Mode, StatusSnapshot, DEFAULT_CHECK_INTERVAL, DEFAULT_STATUS_PATH,
    STALE_AFTER_INTERVALS,
};

use std::fmt::Debug;

/// Something new observed by a [`DataSource`].
#[derive(Debug, Clone, PartialEq)]
pub enum Update {
    /// A fresh snapshot with at least the global block.
    Snapshot(StatusSnapshot),
    /// The status is absent or empty: the service is not running.
    NotRunning,
}

impl Update {
    /// Convert the parser's output into an update. A snapshot without
    /// interfaces counts as not running.
    pub fn from_parsed(parsed: Option<StatusSnapshot>) -> Self {
        match parsed {
            Some(snapshot) if snapshot.is_running() => Update::Snapshot(snapshot),
            _ => Update::NotRunning,
        }
    }
}

/// Trait for receiving status data from various sources.
///
/// # Example
///
/// ```
/// use mini_mwan_status::{DataSource, FileSource, Update};
///
/// let mut source = FileSource::new("/var/run/mini-mwan.status");
/// if let Some(Update::Snapshot(snapshot)) = source.poll() {
///     println!("{} interfaces", snapshot.interfaces.len());
/// }
/// ```
pub trait DataSource: Send + Debug {
    /// Poll for the latest status.
    ///
    /// Returns `Some(update)` if something changed since the last poll,
    /// `None` otherwise. Must not block, and must swallow read failures.
    fn poll(&mut self) -> Option<Update>;

    /// Returns a human-readable description of the source.
    fn description(&self) -> &str;

    /// The error encountered during the last poll, if any.
    fn error(&self) -> Option<&str>;

    /// Forget change tracking so the next poll reports the current state.
    fn reset(&mut self) {}
}
