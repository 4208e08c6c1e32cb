//! Channel-based data source.
//!
//! Receives status snapshots via a tokio watch channel. Useful when the
//! producer lives in the same process (a Rust rewrite of the daemon, a test
//! harness) and there is no need to go through the status file.

use tokio::sync::watch;

use super::{DataSource, StatusSnapshot, Update};

/// A data source that receives snapshots via a channel.
///
/// The producer sends `Some(snapshot)` for fresh data and `None` when the
/// service stops.
///
/// # Example
///
/// ```
/// use mini_mwan_status::ChannelSource;
///
/// let (tx, source) = ChannelSource::create("mini-mwan daemon");
/// ```
#[derive(Debug)]
pub struct ChannelSource {
    receiver: watch::Receiver<Option<StatusSnapshot>>,
    description: String,
    /// Track if we've returned the initial value yet
    initial_returned: bool,
}

impl ChannelSource {
    /// Create a new channel source from the receiving end of a watch channel.
    pub fn new(receiver: watch::Receiver<Option<StatusSnapshot>>, source_description: &str) -> Self {
        let description = format!("channel: {}", source_description);
        Self {
            receiver,
            description,
            initial_returned: false,
        }
    }

    /// Create a channel pair.
    ///
    /// Returns (sender, source); the channel starts out as "not running".
    pub fn create(source_description: &str) -> (watch::Sender<Option<StatusSnapshot>>, Self) {
        let (tx, rx) = watch::channel(None);
        let source = Self::new(rx, source_description);
        (tx, source)
    }
}

impl DataSource for ChannelSource {
    fn poll(&mut self) -> Option<Update> {
        if !self.initial_returned {
            self.initial_returned = true;
            let snapshot = self.receiver.borrow_and_update().clone();
            return Some(Update::from_parsed(snapshot));
        }

        // A closed sender leaves the last value in place
        if self.receiver.has_changed().unwrap_or(false) {
            let snapshot = self.receiver.borrow_and_update().clone();
            Some(Update::from_parsed(snapshot))
        } else {
            None
        }
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn error(&self) -> Option<&str> {
        None
    }

    fn reset(&mut self) {
        self.initial_returned = false;
    }
}
