// Library crate: public API items may not be used by the binary
#![allow(unused)]

//! # mini-mwan-status
//!
//! A terminal status viewer and library for the mini-mwan multi-WAN
//! service.
//!
//! The mini-mwan daemon periodically probes its WAN interfaces and rewrites
//! a small `key=value` status file. This crate parses that file, classifies
//! every interface (up, down, degraded, missing, no connectivity) and shows
//! the result in an interactive terminal UI, next to the service's UCI
//! configuration and its validation issues.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        Application                          │
//! │  ┌─────────┐    ┌──────────┐    ┌─────────┐    ┌─────────┐ │
//! │  │  app    │───▶│   data   │───▶│   ui    │───▶│ Terminal│ │
//! │  │ (state) │    │(classify)│    │(render) │    │         │ │
//! │  └────┬────┘    └──────────┘    └─────────┘    └─────────┘ │
//! │       │                                                     │
//! │       ├──────────▶ uci (service configuration)              │
//! │       ▼                                                     │
//! │  ┌─────────┐                                                │
//! │  │ source  │◀── FileSource | ChannelSource                  │
//! │  │ (input) │                                                │
//! │  └─────────┘                                                │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! - **[`app`]**: Application state, view navigation, and user interaction logic
//! - **[`source`]**: The status file format ([`StatusSnapshot`]) and the
//!   [`DataSource`] trait with file polling and channel implementations
//! - **[`data`]**: Classification into [`StatusBadge`]s, display formatting,
//!   the [`StatusView`] presentation model and history for sparklines
//! - **[`uci`]**: Reader and validator for the service configuration
//! - **[`report`]**: Plain-text output for `--once` and `--check-config`
//! - **[`ui`]**: Terminal rendering using ratatui
//!
//! ## Usage
//!
//! ### As a CLI tool
//!
//! ```bash
//! # Live status page
//! mwan-status
//!
//! # Print the status once and exit
//! mwan-status --once --status-file /tmp/mini-mwan.status
//!
//! # Validate the service configuration
//! mwan-status --check-config --uci-config /etc/config/mini-mwan
//! ```
//!
//! ### Parsing a status file
//!
//! ```
//! use mini_mwan_status::{StatusBadge, StatusSnapshot, StatusView};
//!
//! let raw = "mode=failover\ntimestamp=1700000000\n[wg0]\ndoes_exist=1\nis_up=1\nlatency=12.5\n";
//! let snapshot = StatusSnapshot::parse(raw).unwrap();
//! assert_eq!(StatusBadge::classify(&snapshot.interfaces[0]), StatusBadge::Up);
//!
//! let view = StatusView::from_snapshot(&snapshot, 1_700_000_010);
//! assert_eq!(view.rows[0].latency, "12.50 ms");
//! ```
//!
//! ### As a library with file source
//!
//! ```
//! use mini_mwan_status::{App, FileSource};
//!
//! let source = Box::new(FileSource::new("/var/run/mini-mwan.status"));
//! let app = App::new(source, None);
//! ```
//!
//! ### Feeding snapshots from another task
//!
//! ```
//! use mini_mwan_status::{App, ChannelSource, StatusSnapshot};
//!
//! # tokio_test::block_on(async {
//! let (tx, source) = ChannelSource::create("in-process");
//! let producer = tokio::spawn(async move {
//!     let _ = tx.send(StatusSnapshot::parse("timestamp=1700000000\n[wg0]\n"));
//! });
//! producer.await.unwrap();
//!
//! let mut app = App::new(Box::new(source), None);
//! app.reload_data();
//! assert!(app.is_running_service());
//! # });
//! ```

pub mod app;
pub mod data;
pub mod events;
pub mod export;
pub mod logging;
pub mod report;
pub mod settings;
pub mod source;
pub mod uci;
pub mod ui;

// Re-export main types for convenience
pub use app::{App, View};
pub use data::{HealthStatus, History, InterfaceRow, RowEmphasis, StatusBadge, StatusView};
pub use settings::ViewerSettings;
pub use source::{
    ChannelSource, DataSource, FileSource, InterfaceStatus, Mode, StatusSnapshot, Update,
};
pub use uci::{ConfigIssue, MwanConfig};
