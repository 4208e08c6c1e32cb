//! Derivations over status snapshots.
//!
//! This module turns a parsed [`StatusSnapshot`](crate::source::StatusSnapshot)
//! into everything the status page shows.
//!
//! ## Submodules
//!
//! - [`classify`]: status badge and row emphasis rules
//! - [`format`]: durations, timestamps, byte counts and latency
//! - [`history`]: samples kept across reads for sparklines and rates
//! - [`view`]: the presentation model ([`StatusView`], [`InterfaceRow`])
//!
//! ## Data Flow
//!
//! ```text
//! status file text
//!        │
//!        ▼
//! StatusSnapshot::parse()
//!        │
//!        ├──▶ StatusView::from_snapshot(now) ──▶ InterfaceRow (badge, emphasis, cells)
//!        │
//!        └──▶ History::record() (for sparklines and rates)
//! ```

pub mod classify;
pub mod format;
pub mod history;
pub mod view;

pub use classify::{HealthStatus, RowEmphasis, StatusBadge};
pub use history::History;
pub use view::{GlobalInfo, InterfaceRow, StatusView};
