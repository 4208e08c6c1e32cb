//! Display formatting for status fields.
//!
//! All functions here are pure; callers pass in "now" explicitly.

use chrono::{Local, TimeZone};

/// Byte units for [`format_bytes`], in 1024 steps.
const BYTE_UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];

/// Seconds per bucket for [`format_elapsed`], coarsest last.
const ELAPSED_BUCKETS: &[(i64, i64, &str)] = &[
    (60, 1, "seconds"),
    (3_600, 60, "minutes"),
    (86_400, 3_600, "hours"),
];

/// Parse an epoch-seconds field written as text. Empty or garbage gives 0.
pub fn parse_epoch(value: &str) -> i64 {
    value.trim().parse().unwrap_or(0)
}

/// Format an elapsed number of seconds in the coarsest fitting unit.
pub fn format_elapsed(secs: i64) -> String {
    let secs = secs.max(0);
    for &(limit, unit, label) in ELAPSED_BUCKETS {
        if secs < limit {
            return format!("{} {}", secs / unit, label);
        }
    }
    format!("{} days", secs / 86_400)
}

/// Time elapsed from `event` to `now`, both epoch seconds.
///
/// A zero `event` means "never recorded" and yields `"Unknown"`.
pub fn format_duration(now: i64, event: i64) -> String {
    if event == 0 {
        return "Unknown".to_string();
    }
    format_elapsed(now.saturating_sub(event))
}

/// Format an epoch timestamp as local wall-clock time, `"Never"` when zero.
pub fn format_timestamp(epoch: i64) -> String {
    if epoch == 0 {
        return "Never".to_string();
    }
    match Local.timestamp_opt(epoch, 0).single() {
        Some(time) => time.format("%Y-%m-%d %H:%M:%S").to_string(),
        None => epoch.to_string(),
    }
}

/// Format a byte counter with binary prefixes, `"None"` when zero.
pub fn format_bytes(bytes: u64) -> String {
    if bytes == 0 {
        return "None".to_string();
    }

    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < BYTE_UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    format!("{:.2} {}", value, BYTE_UNITS[unit])
}

/// Format a probe latency in milliseconds, `"-"` when no probe succeeded.
pub fn format_latency(ms: f64) -> String {
    if ms == 0.0 || ms.is_nan() {
        "-".to_string()
    } else {
        format!("{:.2} ms", ms)
    }
}

/// Format a transfer rate in bytes per second.
pub fn format_rate(bytes_per_sec: f64) -> String {
    if bytes_per_sec <= 0.0 {
        return "-".to_string();
    }
    format!("{}/s", format_bytes(bytes_per_sec.round() as u64))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_elapsed_boundaries() {
        assert_eq!(format_elapsed(0), "0 seconds");
        assert_eq!(format_elapsed(59), "59 seconds");
        assert_eq!(format_elapsed(60), "1 minutes");
        assert_eq!(format_elapsed(3_599), "59 minutes");
        assert_eq!(format_elapsed(3_600), "1 hours");
        assert_eq!(format_elapsed(86_399), "23 hours");
        assert_eq!(format_elapsed(86_400), "1 days");
        assert_eq!(format_elapsed(3 * 86_400 + 5), "3 days");
    }

    #[test]
    fn test_format_elapsed_clamps_clock_skew() {
        assert_eq!(format_elapsed(-15), "0 seconds");
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(1_700_000_120, 1_700_000_000), "2 minutes");
        assert_eq!(format_duration(1_700_000_000, 0), "Unknown");
    }

    #[test]
    fn test_format_duration_extreme_epochs() {
        assert_eq!(format_duration(1_700_000_000, i64::MIN), format_elapsed(i64::MAX));
        assert_eq!(format_duration(1_700_000_000, i64::MAX), "0 seconds");
    }

    #[test]
    fn test_parse_epoch() {
        assert_eq!(parse_epoch("1700000000"), 1_700_000_000);
        assert_eq!(parse_epoch(""), 0);
        assert_eq!(parse_epoch("later"), 0);
    }

    #[test]
    fn test_format_timestamp() {
        assert_eq!(format_timestamp(0), "Never");
        // Same calendar month in every time zone
        assert!(format_timestamp(1_700_000_000).starts_with("2023-11-1"));
    }

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(0), "None");
        assert_eq!(format_bytes(512), "512.00 B");
        assert_eq!(format_bytes(1024), "1.00 KB");
        assert_eq!(format_bytes(1536), "1.50 KB");
        assert_eq!(format_bytes(1_048_576), "1.00 MB");
        assert_eq!(format_bytes(1024u64.pow(3)), "1.00 GB");
    }

    #[test]
    fn test_format_bytes_caps_at_terabytes() {
        assert_eq!(format_bytes(1024u64.pow(4)), "1.00 TB");
        assert_eq!(format_bytes(2048 * 1024u64.pow(4)), "2048.00 TB");
    }

    #[test]
    fn test_format_latency() {
        assert_eq!(format_latency(0.0), "-");
        assert_eq!(format_latency(12.5), "12.50 ms");
        assert_eq!(format_latency(f64::NAN), "-");
    }

    #[test]
    fn test_format_rate() {
        assert_eq!(format_rate(0.0), "-");
        assert_eq!(format_rate(2048.0), "2.00 KB/s");
    }
}
