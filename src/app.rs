//! Application state and navigation logic.

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use anyhow::Result;
use tracing::{debug, info, warn};

use crate::data::{History, StatusView};
use crate::source::{DataSource, InterfaceStatus, StatusSnapshot, Update};
use crate::uci::{ConfigIssue, MwanConfig};
use crate::ui::Theme;

/// How long a status bar message stays visible.
const STATUS_MESSAGE_TTL: Duration = Duration::from_secs(3);

/// The current view/tab in the TUI.
///
/// Interface detail is shown as an overlay (controlled by
/// `App::show_detail_overlay`) rather than as a separate view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    /// Live status of every monitored interface.
    Interfaces,
    /// Configured interfaces and validation issues.
    Config,
}

impl View {
    /// Cycle to the next view.
    pub fn next(self) -> Self {
        match self {
            View::Interfaces => View::Config,
            View::Config => View::Interfaces,
        }
    }

    /// Cycle to the previous view.
    pub fn prev(self) -> Self {
        // Two views: same as next
        self.next()
    }

    /// Returns the display label for this view.
    pub fn label(&self) -> &'static str {
        match self {
            View::Interfaces => "Interfaces",
            View::Config => "Config",
        }
    }
}

/// Main application state.
pub struct App {
    pub running: bool,
    pub current_view: View,
    pub show_help: bool,
    pub show_detail_overlay: bool,

    // Status source
    source: Box<dyn DataSource>,
    pub snapshot: Option<StatusSnapshot>,
    /// When the last update (snapshot or "not running") arrived.
    pub last_updated: Option<Instant>,
    pub history: History,
    pub load_error: Option<String>,

    // Service configuration
    uci_path: Option<PathBuf>,
    pub config: Option<MwanConfig>,
    pub config_issues: Vec<ConfigIssue>,
    pub config_error: Option<String>,

    // Navigation state
    pub selected_index: usize,
    pub selected_config_index: usize,

    // Search/filter
    pub filter_text: String,
    pub filter_active: bool,

    // UI
    pub theme: Theme,

    // Status message (temporary feedback)
    pub status_message: Option<(String, Instant)>,
}

impl App {
    /// Create a new App reading status from `source` and, if given, the
    /// service configuration from `uci_path`.
    pub fn new(source: Box<dyn DataSource>, uci_path: Option<PathBuf>) -> Self {
        let mut app = Self {
            running: true,
            current_view: View::Interfaces,
            show_help: false,
            show_detail_overlay: false,
            source,
            snapshot: None,
            last_updated: None,
            history: History::new(),
            load_error: None,
            uci_path,
            config: None,
            config_issues: Vec::new(),
            config_error: None,
            selected_index: 0,
            selected_config_index: 0,
            filter_text: String::new(),
            filter_active: false,
            theme: Theme::dark(),
            status_message: None,
        };
        app.reload_config();
        app
    }

    /// Current wall-clock time in epoch seconds.
    pub fn now() -> i64 {
        chrono::Utc::now().timestamp()
    }

    /// Returns a description of the current data source.
    pub fn source_description(&self) -> &str {
        self.source.description()
    }

    /// Set a temporary status message that will be shown for a few seconds.
    pub fn set_status_message(&mut self, message: String) {
        self.status_message = Some((message, Instant::now()));
    }

    /// Get the current status message if it hasn't expired.
    pub fn get_status_message(&self) -> Option<&str> {
        match &self.status_message {
            Some((msg, time)) if time.elapsed() < STATUS_MESSAGE_TTL => Some(msg),
            _ => None,
        }
    }

    /// Whether a snapshot with at least one interface is available.
    pub fn is_running_service(&self) -> bool {
        self.running_snapshot().is_some()
    }

    /// The current snapshot, unless it reports no interfaces.
    pub fn running_snapshot(&self) -> Option<&StatusSnapshot> {
        self.snapshot.as_ref().filter(|s| s.is_running())
    }

    /// Poll the data source for new data.
    ///
    /// Returns true if something changed. Source errors are kept for display
    /// and never interrupt the refresh loop.
    pub fn reload_data(&mut self) -> bool {
        let update = self.source.poll();
        self.load_error = self.source.error().map(str::to_string);

        let Some(update) = update else {
            return false;
        };

        match update {
            Update::Snapshot(snapshot) => {
                debug!(interfaces = snapshot.interfaces.len(), "new status snapshot");
                self.history.record(&snapshot);
                self.snapshot = Some(snapshot);
            }
            Update::NotRunning => {
                if self.snapshot.is_some() {
                    info!("status disappeared, service not running");
                }
                self.history.clear();
                self.snapshot = None;
            }
        }
        self.last_updated = Some(Instant::now());

        // Clamp selection
        let count = self.filtered_interfaces().len();
        if self.selected_index >= count {
            self.selected_index = count.saturating_sub(1);
        }
        true
    }

    /// Re-read the source even if it reports no change.
    pub fn force_reload(&mut self) {
        self.source.reset();
        self.reload_data();
        self.reload_config();
    }

    /// Re-read the service configuration, if a path was given.
    pub fn reload_config(&mut self) {
        let Some(path) = self.uci_path.clone() else {
            return;
        };
        match MwanConfig::load(&path) {
            Ok(config) => {
                self.config_issues = config.validate();
                self.config = Some(config);
                self.config_error = None;
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "failed to load configuration");
                self.config = None;
                self.config_issues.clear();
                self.config_error = Some(format!("{:#}", e));
            }
        }

        let count = self.config.as_ref().map_or(0, |c| c.interfaces.len());
        if self.selected_config_index >= count {
            self.selected_config_index = count.saturating_sub(1);
        }
    }

    /// Build the display model at the given time.
    pub fn status_view(&self, now: i64) -> Option<StatusView> {
        self.running_snapshot().map(|s| StatusView::from_snapshot(s, now))
    }

    /// Interfaces that match the filter, in file order.
    pub fn filtered_interfaces(&self) -> Vec<&InterfaceStatus> {
        self.snapshot
            .iter()
            .flat_map(|s| s.interfaces.iter())
            .filter(|iface| self.matches_filter(&iface.name))
            .collect()
    }

    /// The interface under the cursor in the Interfaces view.
    pub fn selected_interface(&self) -> Option<&InterfaceStatus> {
        self.filtered_interfaces().get(self.selected_index).copied()
    }

    fn list_len(&self) -> usize {
        match self.current_view {
            View::Interfaces => self.filtered_interfaces().len(),
            View::Config => self.config.as_ref().map_or(0, |c| c.interfaces.len()),
        }
    }

    fn selection_mut(&mut self) -> &mut usize {
        match self.current_view {
            View::Interfaces => &mut self.selected_index,
            View::Config => &mut self.selected_config_index,
        }
    }

    /// Switch to the next view.
    pub fn next_view(&mut self) {
        self.current_view = self.current_view.next();
    }

    /// Switch to the previous view.
    pub fn prev_view(&mut self) {
        self.current_view = self.current_view.prev();
    }

    /// Switch to a specific view.
    pub fn set_view(&mut self, view: View) {
        self.current_view = view;
    }

    /// Move selection down by one item.
    pub fn select_next(&mut self) {
        self.select_next_n(1);
    }

    /// Move selection up by one item.
    pub fn select_prev(&mut self) {
        self.select_prev_n(1);
    }

    /// Move selection down by n items.
    pub fn select_next_n(&mut self, n: usize) {
        let max = self.list_len().saturating_sub(1);
        let selected = self.selection_mut();
        *selected = (*selected + n).min(max);
    }

    /// Move selection up by n items.
    pub fn select_prev_n(&mut self, n: usize) {
        let selected = self.selection_mut();
        *selected = selected.saturating_sub(n);
    }

    /// Jump to the first item in the list.
    pub fn select_first(&mut self) {
        *self.selection_mut() = 0;
    }

    /// Jump to the last item in the list.
    pub fn select_last(&mut self) {
        let last = self.list_len().saturating_sub(1);
        *self.selection_mut() = last;
    }

    /// Open the detail overlay for the selected interface.
    pub fn enter_detail(&mut self) {
        if self.current_view == View::Interfaces && self.selected_interface().is_some() {
            self.show_detail_overlay = true;
        }
    }

    /// Navigate back: close the overlay first, then return to Interfaces.
    pub fn go_back(&mut self) {
        if self.show_detail_overlay {
            self.show_detail_overlay = false;
        } else {
            self.current_view = View::Interfaces;
        }
    }

    /// Close the detail overlay if open.
    pub fn close_overlay(&mut self) {
        self.show_detail_overlay = false;
    }

    /// Toggle the help overlay.
    pub fn toggle_help(&mut self) {
        self.show_help = !self.show_help;
    }

    /// Enter filter input mode (starts capturing keystrokes for search).
    pub fn start_filter(&mut self) {
        self.filter_active = true;
    }

    /// Exit filter input mode without clearing the filter text.
    pub fn cancel_filter(&mut self) {
        self.filter_active = false;
    }

    /// Clear the filter text and exit filter mode.
    pub fn clear_filter(&mut self) {
        self.filter_text.clear();
        self.filter_active = false;
    }

    /// Append a character to the filter text.
    pub fn filter_push(&mut self, c: char) {
        self.filter_text.push(c);
        self.selected_index = 0;
    }

    /// Remove the last character from the filter text.
    pub fn filter_pop(&mut self) {
        self.filter_text.pop();
    }

    /// Check if a device name matches the current filter.
    pub fn matches_filter(&self, name: &str) -> bool {
        if self.filter_text.is_empty() {
            return true;
        }
        name.to_lowercase().contains(&self.filter_text.to_lowercase())
    }

    /// Signal the application to quit.
    pub fn quit(&mut self) {
        self.running = false;
    }

    /// Export current state to a JSON file.
    pub fn export_state(&self, path: &Path) -> Result<()> {
        crate::export::write(path, self.running_snapshot(), self.config.as_ref(), Self::now())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::ChannelSource;

    fn app_with_channel() -> (tokio::sync::watch::Sender<Option<StatusSnapshot>>, App) {
        let (tx, source) = ChannelSource::create("test");
        (tx, App::new(Box::new(source), None))
    }

    fn snapshot(raw: &str) -> StatusSnapshot {
        StatusSnapshot::parse(raw).unwrap()
    }

    #[test]
    fn test_reload_tracks_running_state() {
        let (tx, mut app) = app_with_channel();

        assert!(app.reload_data());
        assert!(!app.is_running_service());
        assert!(!app.reload_data());

        tx.send(Some(snapshot("timestamp=10\n[wg0]\n[wg1]"))).unwrap();
        assert!(app.reload_data());
        assert!(app.is_running_service());
        assert_eq!(app.filtered_interfaces().len(), 2);

        tx.send(None).unwrap();
        assert!(app.reload_data());
        assert!(app.snapshot.is_none());
        assert_eq!(app.history.len("wg0"), 0);
    }

    #[test]
    fn test_globals_only_snapshot_is_not_running() {
        let (tx, mut app) = app_with_channel();
        tx.send(StatusSnapshot::parse("mode=failover\ntimestamp=1700000000\ncheck_interval=30\n"))
            .unwrap();
        app.reload_data();

        assert!(!app.is_running_service());
        assert!(app.status_view(1_700_000_010).is_none());
        assert!(app.filtered_interfaces().is_empty());

        // Set directly, bypassing the source
        app.snapshot = StatusSnapshot::parse("mode=failover\n");
        assert!(!app.is_running_service());
        assert!(app.running_snapshot().is_none());
    }

    #[test]
    fn test_selection_is_clamped() {
        let (tx, mut app) = app_with_channel();
        tx.send(Some(snapshot("[wg0]\n[wg1]\n[wg2]"))).unwrap();
        app.reload_data();

        app.select_last();
        assert_eq!(app.selected_index, 2);
        app.select_next_n(10);
        assert_eq!(app.selected_index, 2);

        tx.send(Some(snapshot("[wg0]"))).unwrap();
        app.reload_data();
        assert_eq!(app.selected_index, 0);
        assert_eq!(app.selected_interface().unwrap().name, "wg0");
    }

    #[test]
    fn test_filter_selects_matching_interfaces() {
        let (tx, mut app) = app_with_channel();
        tx.send(Some(snapshot("[wg0]\n[eth1]\n[wg1]"))).unwrap();
        app.reload_data();

        app.start_filter();
        for c in "WG".chars() {
            app.filter_push(c);
        }
        let names: Vec<&str> = app.filtered_interfaces().iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, ["wg0", "wg1"]);

        app.select_next();
        assert_eq!(app.selected_interface().unwrap().name, "wg1");

        app.clear_filter();
        assert_eq!(app.filtered_interfaces().len(), 3);
    }

    #[test]
    fn test_detail_overlay_needs_selection() {
        let (tx, mut app) = app_with_channel();
        app.reload_data();
        app.enter_detail();
        assert!(!app.show_detail_overlay);

        tx.send(Some(snapshot("[wg0]"))).unwrap();
        app.reload_data();
        app.enter_detail();
        assert!(app.show_detail_overlay);

        app.go_back();
        assert!(!app.show_detail_overlay);
    }

    #[test]
    fn test_views_cycle() {
        let (_tx, mut app) = app_with_channel();
        app.next_view();
        assert_eq!(app.current_view, View::Config);
        app.go_back();
        assert_eq!(app.current_view, View::Interfaces);
        assert_eq!(View::Config.label(), "Config");
    }

    #[test]
    fn test_config_is_loaded_and_validated() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        std::io::Write::write_all(
            &mut file,
            b"config interface 'a'\n option device 'wg0'\n option metric '300'\n option ping_target '1.1.1.1'\n",
        )
        .unwrap();

        let (_tx, source) = ChannelSource::create("test");
        let app = App::new(Box::new(source), Some(file.path().to_path_buf()));
        assert_eq!(app.config.as_ref().unwrap().interfaces.len(), 1);
        assert_eq!(app.config_issues.len(), 1);
        assert!(app.config_error.is_none());
    }

    #[test]
    fn test_missing_config_is_reported() {
        let (_tx, source) = ChannelSource::create("test");
        let app = App::new(Box::new(source), Some(PathBuf::from("/nonexistent/mini-mwan")));
        assert!(app.config.is_none());
        assert!(app.config_error.unwrap().contains("failed to read"));
    }
}
