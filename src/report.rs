//! Plain-text reports for the non-interactive modes.
//!
//! `--once` prints the status page and `--check-config` prints the
//! validation result. Both build their output here so the binary only
//! has to print it and pick an exit status.

use std::path::Path;

use anyhow::Result;

use crate::data::StatusView;
use crate::source::StatusSnapshot;
use crate::uci::MwanConfig;

/// The status page as text, or the not-running notice.
pub fn status_text(snapshot: Option<&StatusSnapshot>, now: i64) -> String {
    match snapshot.filter(|s| s.is_running()) {
        Some(snapshot) => StatusView::from_snapshot(snapshot, now).to_text(),
        None => StatusView::not_running_notice(),
    }
}

/// Read the status file and render it. A missing file is not an error.
pub fn status_text_from_file(path: &Path, now: i64) -> Result<String> {
    let snapshot = StatusSnapshot::load(path)?;
    Ok(status_text(snapshot.as_ref(), now))
}

/// Outcome of validating the service configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigReport {
    pub text: String,
    pub issues: usize,
}

impl ConfigReport {
    pub fn is_ok(&self) -> bool {
        self.issues == 0
    }
}

/// Validate the configuration at `path`.
///
/// Read and syntax errors are returned as errors; validation findings
/// end up in the report.
pub fn check_config(path: &Path) -> Result<ConfigReport> {
    let config = MwanConfig::load(path)?;
    Ok(config_report(&config, path))
}

fn config_report(config: &MwanConfig, path: &Path) -> ConfigReport {
    let issues = config.validate();

    if issues.is_empty() {
        return ConfigReport {
            text: format!(
                "{}: {} interfaces, no issues found\n",
                path.display(),
                config.interfaces.len()
            ),
            issues: 0,
        };
    }

    let mut text = String::new();
    for issue in &issues {
        text.push_str(&format!("{}\n", issue));
    }
    text.push_str(&format!("{}: {} issues found\n", path.display(), issues.len()));

    ConfigReport {
        text,
        issues: issues.len(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::{NamedTempFile, TempDir};

    const NOW: i64 = 1_700_000_010;

    const STATUS: &str = "mode=failover
timestamp=1700000000
check_interval=30
[wg0]
does_exist=1
is_up=1
latency=15.3
";

    const VALID_CONFIG: &str = "
config settings 'settings'
	option enabled '1'
	option mode 'failover'

config interface 'wan_a'
	option device 'wg0'
	option metric '10'
	option ping_target '1.1.1.1'

config interface 'wan_b'
	option device 'wg1'
	option metric '20'
	option ping_target '8.8.8.8'
";

    fn write_temp(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_status_text_running() {
        let file = write_temp(STATUS);
        let text = status_text_from_file(file.path(), NOW).unwrap();

        assert!(text.contains("wg0"));
        assert!(text.contains("15.30 ms"));
        assert!(!text.contains("No status information available."));
    }

    #[test]
    fn test_status_text_missing_file() {
        let dir = TempDir::new().unwrap();
        let text = status_text_from_file(&dir.path().join("mini-mwan.status"), NOW).unwrap();
        assert_eq!(text, StatusView::not_running_notice());
    }

    #[test]
    fn test_status_text_globals_only() {
        let snapshot =
            StatusSnapshot::parse("mode=failover\ntimestamp=1700000000\ncheck_interval=30\n");
        assert_eq!(status_text(snapshot.as_ref(), NOW), StatusView::not_running_notice());
        assert_eq!(status_text(None, NOW), StatusView::not_running_notice());
    }

    #[test]
    fn test_check_config_valid() {
        let file = write_temp(VALID_CONFIG);
        let report = check_config(file.path()).unwrap();

        assert!(report.is_ok());
        assert!(report.text.ends_with("2 interfaces, no issues found\n"));
    }

    #[test]
    fn test_check_config_with_issues() {
        let file = write_temp(
            "
config settings 'settings'
	option enabled '1'
	option mode 'roundrobin'

config interface 'wan_a'
	option device 'wg0'
	option ping_target '1.1.1.1'
",
        );
        let report = check_config(file.path()).unwrap();

        assert!(!report.is_ok());
        assert_eq!(report.issues, 2);
        assert_eq!(report.text.lines().count(), report.issues + 1);
        assert!(report
            .text
            .ends_with(&format!("{} issues found\n", report.issues)));
    }

    #[test]
    fn test_check_config_missing_file() {
        let dir = TempDir::new().unwrap();
        assert!(check_config(&dir.path().join("mini-mwan")).is_err());
    }
}
