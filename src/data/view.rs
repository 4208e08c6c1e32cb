//! Presentation model for the status page.
//!
//! [`StatusView`] turns a [`StatusSnapshot`] into display strings, one
//! [`InterfaceRow`] per interface with columns in a fixed order.

use serde::Serialize;

use super::classify::{HealthStatus, RowEmphasis, StatusBadge};
use super::format::{
    format_bytes, format_duration, format_latency, format_timestamp, parse_epoch,
};
use crate::source::{InterfaceStatus, StatusSnapshot};

/// Column titles of the interface table, in display order.
pub const COLUMNS: [&str; 8] = [
    "Device",
    "Status",
    "Since",
    "Latency",
    "Traffic (RX/TX)",
    "Ping Target",
    "Gateway",
    "Last Check",
];

/// Notice shown when there is no status to display.
pub const NOT_RUNNING_NOTICE: &str =
    "No status information available. Make sure the Mini-MWAN service is running.";

/// Hint shown under [`NOT_RUNNING_NOTICE`].
pub const NOT_RUNNING_HINT: &str = "Check with: /etc/init.d/mini-mwan status";

/// The service information block.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GlobalInfo {
    pub mode: String,
    pub check_interval: String,
    /// When the daemon last checked its WAN interfaces.
    pub last_check: String,
    pub stale: bool,
}

impl GlobalInfo {
    pub fn from_snapshot(snapshot: &StatusSnapshot, now: i64) -> Self {
        Self {
            mode: snapshot.mode.label().to_string(),
            check_interval: format!("{} seconds", snapshot.check_interval),
            last_check: format_timestamp(snapshot.timestamp),
            stale: snapshot.is_stale(now),
        }
    }
}

/// One row of the interface table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InterfaceRow {
    pub device: String,
    pub badge: StatusBadge,
    pub emphasis: RowEmphasis,
    pub since: String,
    pub latency: String,
    pub traffic: String,
    pub ping_target: String,
    pub gateway: String,
    pub last_check: String,
}

impl InterfaceRow {
    pub fn from_status(iface: &InterfaceStatus, now: i64) -> Self {
        Self {
            device: iface.name.clone(),
            badge: StatusBadge::classify(iface),
            emphasis: RowEmphasis::of(iface),
            since: format_timestamp(parse_epoch(&iface.status_since)),
            latency: format_latency(iface.latency),
            traffic: format!(
                "{} / {}",
                format_bytes(iface.rx_bytes),
                format_bytes(iface.tx_bytes)
            ),
            ping_target: dash_if_empty(&iface.ping_target),
            gateway: dash_if_empty(&iface.gateway),
            last_check: format_duration(now, parse_epoch(&iface.last_check)),
        }
    }

    /// Cells in [`COLUMNS`] order.
    pub fn cells(&self) -> [String; 8] {
        [
            self.device.clone(),
            self.badge.to_string(),
            self.since.clone(),
            self.latency.clone(),
            self.traffic.clone(),
            self.ping_target.clone(),
            self.gateway.clone(),
            self.last_check.clone(),
        ]
    }
}

fn dash_if_empty(value: &str) -> String {
    if value.is_empty() {
        "-".to_string()
    } else {
        value.to_string()
    }
}

/// Complete display model for one snapshot at a given time.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusView {
    pub global: GlobalInfo,
    pub rows: Vec<InterfaceRow>,
}

impl StatusView {
    /// Build the view. Relative columns are computed against `now`.
    pub fn from_snapshot(snapshot: &StatusSnapshot, now: i64) -> Self {
        Self {
            global: GlobalInfo::from_snapshot(snapshot, now),
            rows: snapshot
                .interfaces
                .iter()
                .map(|iface| InterfaceRow::from_status(iface, now))
                .collect(),
        }
    }

    /// Number of rows at each health level: (healthy, warning, critical).
    pub fn health_counts(&self) -> (usize, usize, usize) {
        self.rows.iter().fold((0, 0, 0), |(ok, warn, crit), row| match row.badge.health() {
            HealthStatus::Healthy => (ok + 1, warn, crit),
            HealthStatus::Warning => (ok, warn + 1, crit),
            HealthStatus::Critical => (ok, warn, crit + 1),
        })
    }

    /// Text shown instead of the view when there is no snapshot.
    pub fn not_running_notice() -> String {
        format!("{}\n{}\n", NOT_RUNNING_NOTICE, NOT_RUNNING_HINT)
    }

    /// Render the view as plain text for non-interactive output.
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        out.push_str("Service Information\n");
        out.push_str(&format!("  Mode:           {}\n", self.global.mode));
        out.push_str(&format!("  Check Interval: {}\n", self.global.check_interval));
        out.push_str(&format!(
            "  Last status check of WAN interfaces: {}{}\n",
            self.global.last_check,
            if self.global.stale { " (stale)" } else { "" }
        ));
        out.push('\n');

        let table: Vec<[String; 8]> = self.rows.iter().map(InterfaceRow::cells).collect();
        let mut widths = COLUMNS.map(|c| c.chars().count());
        for cells in &table {
            for (width, cell) in widths.iter_mut().zip(cells.iter()) {
                *width = (*width).max(cell.chars().count());
            }
        }

        let header = COLUMNS.map(str::to_string);
        for cells in std::iter::once(&header).chain(table.iter()) {
            let line: Vec<String> = cells
                .iter()
                .zip(widths.iter())
                .map(|(cell, width)| pad(cell, *width))
                .collect();
            out.push_str(line.join("  ").trim_end());
            out.push('\n');
        }
        out
    }
}

/// Left-align `cell` to `width` characters (not bytes: badges carry glyphs).
fn pad(cell: &str, width: usize) -> String {
    let len = cell.chars().count();
    format!("{}{}", cell, " ".repeat(width.saturating_sub(len)))
}

#[cfg(test)]
mod tests {
    use super::*;

    const NOW: i64 = 1_700_000_100;

    fn snapshot() -> StatusSnapshot {
        StatusSnapshot::parse(
            "mode=multiuplink
timestamp=1700000000
check_interval=60
[wg0]
does_exist=1
is_up=1
latency=15.3
rx_bytes=1048576
tx_bytes=2048
ping_target=1.1.1.1
gateway=10.0.0.1
status_since=1699990000
last_check=1700000000
[wg1]
does_exist=0
degraded=1
degraded_reason=no_gateway
",
        )
        .unwrap()
    }

    #[test]
    fn test_global_info() {
        let view = StatusView::from_snapshot(&snapshot(), NOW);
        assert_eq!(view.global.mode, "Multi-Uplink (Load Balancing)");
        assert_eq!(view.global.check_interval, "60 seconds");
        assert_ne!(view.global.last_check, "Never");
        assert!(!view.global.stale);
    }

    #[test]
    fn test_rows_follow_file_order() {
        let view = StatusView::from_snapshot(&snapshot(), NOW);
        let devices: Vec<&str> = view.rows.iter().map(|r| r.device.as_str()).collect();
        assert_eq!(devices, ["wg0", "wg1"]);
    }

    #[test]
    fn test_row_columns() {
        let view = StatusView::from_snapshot(&snapshot(), NOW);
        let wg0 = &view.rows[0];
        assert_eq!(wg0.badge, StatusBadge::Up);
        assert_eq!(wg0.emphasis, RowEmphasis::Normal);
        assert_eq!(wg0.latency, "15.30 ms");
        assert_eq!(wg0.traffic, "1.00 MB / 2.00 KB");
        assert_eq!(wg0.ping_target, "1.1.1.1");
        assert_eq!(wg0.gateway, "10.0.0.1");
        assert_eq!(wg0.last_check, "1 minutes");

        let wg1 = &view.rows[1];
        assert_eq!(wg1.badge.label(), "Degraded (No Gateway)");
        assert_eq!(wg1.emphasis, RowEmphasis::NotFound);
        assert_eq!(wg1.since, "Never");
        assert_eq!(wg1.latency, "-");
        assert_eq!(wg1.traffic, "None / None");
        assert_eq!(wg1.gateway, "-");
        assert_eq!(wg1.last_check, "Unknown");
    }

    #[test]
    fn test_row_survives_extreme_epochs() {
        let snapshot = StatusSnapshot::parse(
            "[wg0]\nlast_check=-9223372036854775808\nstatus_since=9223372036854775807\n",
        )
        .unwrap();
        let row = InterfaceRow::from_status(&snapshot.interfaces[0], NOW);
        assert!(row.last_check.ends_with(" days"));
        assert!(!row.since.is_empty());
    }

    #[test]
    fn test_health_counts() {
        let view = StatusView::from_snapshot(&snapshot(), NOW);
        assert_eq!(view.health_counts(), (1, 1, 0));
    }

    #[test]
    fn test_to_text_has_header_and_rows() {
        let text = StatusView::from_snapshot(&snapshot(), NOW).to_text();
        assert!(text.contains("Mode:           Multi-Uplink (Load Balancing)"));
        let lines: Vec<&str> = text.lines().collect();
        let header = lines.iter().position(|l| l.starts_with("Device")).unwrap();
        assert!(lines[header].contains("Traffic (RX/TX)"));
        assert!(lines[header + 1].starts_with("wg0"));
        assert!(lines[header + 2].contains("Degraded (No Gateway)"));
    }

    #[test]
    fn test_stale_marker_in_text() {
        let text = StatusView::from_snapshot(&snapshot(), NOW + 3_600).to_text();
        assert!(text.contains("(stale)"));
    }

    #[test]
    fn test_not_running_notice() {
        let notice = StatusView::not_running_notice();
        assert!(notice.starts_with("No status information available."));
        assert!(notice.contains("/etc/init.d/mini-mwan status"));
    }
}
