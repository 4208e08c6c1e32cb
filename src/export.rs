//! JSON export of the current status.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;

use crate::data::StatusView;
use crate::source::StatusSnapshot;
use crate::uci::{ConfigIssue, MwanConfig};

/// Counts by status class.
#[derive(Debug, Serialize)]
struct Summary {
    total_interfaces: usize,
    healthy: usize,
    warning: usize,
    critical: usize,
    stale: bool,
}

#[derive(Debug, Serialize)]
struct Export<'a> {
    generated_at: i64,
    running: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<Summary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    snapshot: Option<&'a StatusSnapshot>,
    #[serde(skip_serializing_if = "Option::is_none")]
    view: Option<StatusView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    config: Option<&'a MwanConfig>,
    config_issues: Vec<ConfigIssue>,
}

/// Build the export document as pretty JSON.
pub fn to_json(
    snapshot: Option<&StatusSnapshot>,
    config: Option<&MwanConfig>,
    now: i64,
) -> Result<String> {
    let snapshot = snapshot.filter(|s| s.is_running());
    let view = snapshot.map(|s| StatusView::from_snapshot(s, now));
    let summary = view.as_ref().map(|v| {
        let (healthy, warning, critical) = v.health_counts();
        Summary {
            total_interfaces: v.rows.len(),
            healthy,
            warning,
            critical,
            stale: v.global.stale,
        }
    });

    let export = Export {
        generated_at: now,
        running: snapshot.is_some(),
        summary,
        snapshot,
        view,
        config,
        config_issues: config.map(MwanConfig::validate).unwrap_or_default(),
    };

    Ok(serde_json::to_string_pretty(&export)?)
}

/// Write the export document to `path`.
pub fn write(
    path: &Path,
    snapshot: Option<&StatusSnapshot>,
    config: Option<&MwanConfig>,
    now: i64,
) -> Result<()> {
    let json = to_json(snapshot, config, now)?;
    fs::write(path, json).with_context(|| format!("failed to write {}", path.display()))
}
