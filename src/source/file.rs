//! File-based data source.
//!
//! Polls the status file rewritten by the mini-mwan daemon.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use tracing::{debug, warn};

use super::{DataSource, StatusSnapshot, Update};

/// A data source that reads status snapshots from the daemon's status file.
///
/// The source tracks the file's modification time and only returns new data
/// when the file has been rewritten, has appeared, or has disappeared. A
/// missing file reports [`Update::NotRunning`]; any other read failure is
/// recorded in [`DataSource::error`] and otherwise ignored.
#[derive(Debug)]
pub struct FileSource {
    path: PathBuf,
    description: String,
    last_error: Option<String>,
    last_modified: Option<SystemTime>,
    /// Whether the file existed at the last poll (`None` before the first poll).
    present: Option<bool>,
}

impl FileSource {
    /// Create a new file source for the given path.
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref().to_path_buf();
        let description = format!("file: {}", path.display());
        Self {
            path,
            description,
            last_error: None,
            last_modified: None,
            present: None,
        }
    }

    /// Returns the path being monitored.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn missing(&mut self) -> Option<Update> {
        self.last_error = None;
        self.last_modified = None;
        if self.present.replace(false) == Some(false) {
            return None;
        }
        debug!(path = %self.path.display(), "status file absent");
        Some(Update::NotRunning)
    }

    fn failed(&mut self, err: io::Error) -> Option<Update> {
        warn!(path = %self.path.display(), error = %err, "failed to read status file");
        self.last_error = Some(format!("Read error: {}", err));
        None
    }
}

impl DataSource for FileSource {
    fn poll(&mut self) -> Option<Update> {
        let modified = match fs::metadata(&self.path) {
            Ok(meta) => meta.modified().ok(),
            Err(e) if e.kind() == io::ErrorKind::NotFound => return self.missing(),
            Err(e) => return self.failed(e),
        };

        let changed = match (self.present, self.last_modified, modified) {
            (Some(true), Some(last), Some(current)) => current != last,
            _ => true,
        };
        if !changed {
            return None;
        }

        match fs::read_to_string(&self.path) {
            Ok(content) => {
                self.last_error = None;
                self.last_modified = modified;
                self.present = Some(true);
                let update = Update::from_parsed(StatusSnapshot::parse(&content));
                debug!(
                    path = %self.path.display(),
                    running = matches!(update, Update::Snapshot(_)),
                    "status file reloaded"
                );
                Some(update)
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => self.missing(),
            Err(e) => self.failed(e),
        }
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    fn reset(&mut self) {
        self.last_modified = None;
        self.present = None;
    }
}
