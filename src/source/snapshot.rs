//! Status file snapshot types and the line parser.
//!
//! The mini-mwan daemon rewrites `/var/run/mini-mwan.status` after every
//! check cycle. The file is plain text:
//!
//! ```text
//! mode=failover
//! timestamp=1700000000
//! check_interval=30
//! [wg0]
//! does_exist=1
//! is_up=1
//! latency=15.3
//! ```
//!
//! Lines before the first `[device]` header are global fields, lines after a
//! header belong to that interface. Parsing never fails: malformed lines are
//! skipped and missing keys keep their zero defaults.

use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::io;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Serialize, Serializer};

/// Default location of the status file written by the daemon.
pub const DEFAULT_STATUS_PATH: &str = "/var/run/mini-mwan.status";

/// Check interval assumed when the file does not carry one.
pub const DEFAULT_CHECK_INTERVAL: u64 = 30;

/// Operating mode of the service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    /// Only the lowest-metric healthy interface carries traffic.
    Failover,
    /// Traffic is spread across healthy interfaces by weight.
    MultiUplink,
    /// Anything else, kept verbatim (empty when the key is absent).
    Unknown(String),
}

impl Default for Mode {
    fn default() -> Self {
        Mode::Unknown(String::new())
    }
}

impl Mode {
    /// Interpret a raw `mode=` value.
    pub fn from_value(value: &str) -> Self {
        match value {
            "failover" => Mode::Failover,
            "multiuplink" => Mode::MultiUplink,
            other => Mode::Unknown(other.to_string()),
        }
    }

    /// Human readable label, as shown in the service block.
    pub fn label(&self) -> &str {
        match self {
            Mode::Failover => "Failover (Primary/Backup)",
            Mode::MultiUplink => "Multi-Uplink (Load Balancing)",
            Mode::Unknown(raw) if raw.is_empty() => "Unknown",
            Mode::Unknown(raw) => raw,
        }
    }
}

impl Serialize for Mode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Failover => f.write_str("failover"),
            Mode::MultiUplink => f.write_str("multiuplink"),
            Mode::Unknown(raw) => f.write_str(raw),
        }
    }
}

/// State of one monitored WAN device, as of the last check cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Default)]
pub struct InterfaceStatus {
    /// Device name from the section header; unique within a snapshot.
    pub name: String,
    /// Whether the kernel network device is present.
    pub does_exist: bool,
    /// Link/administrative state.
    pub is_up: bool,
    /// 1 when usable but flagged as impaired by policy.
    pub degraded: i64,
    /// Cause of degradation (`no_gateway`, `ipv6_detected`, ...).
    pub degraded_reason: String,
    /// Epoch seconds (as written) when the current status began.
    pub status_since: String,
    /// Epoch seconds (as written) of the most recent probe.
    pub last_check: String,
    /// Round-trip latency in milliseconds, 0 when the probe failed.
    pub latency: f64,
    pub gateway: String,
    pub ping_target: String,
    pub rx_bytes: u64,
    pub tx_bytes: u64,
    /// Keys this version does not know about, stored verbatim.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub extra: BTreeMap<String, String>,
}

impl InterfaceStatus {
    /// Create an empty record for the given device.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Whether the interface carries the degraded flag.
    pub fn is_degraded(&self) -> bool {
        self.degraded == 1
    }

    /// Apply one `key=value` pair; the last occurrence of a key wins.
    fn set(&mut self, key: &str, value: &str) {
        match key {
            "does_exist" => self.does_exist = value == "1",
            "is_up" => self.is_up = value == "1",
            "degraded" => set_parsed(&mut self.degraded, value),
            "latency" => set_parsed(&mut self.latency, value),
            "rx_bytes" => set_parsed(&mut self.rx_bytes, value),
            "tx_bytes" => set_parsed(&mut self.tx_bytes, value),
            "degraded_reason" => self.degraded_reason = value.to_string(),
            "status_since" => self.status_since = value.to_string(),
            "last_check" => self.last_check = value.to_string(),
            "gateway" => self.gateway = value.to_string(),
            "ping_target" => self.ping_target = value.to_string(),
            _ => {
                self.extra.insert(key.to_string(), value.to_string());
            }
        }
    }
}

/// One parsed read of the status file.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusSnapshot {
    pub mode: Mode,
    /// Epoch seconds at which the daemon wrote the snapshot.
    pub timestamp: i64,
    /// Seconds between check cycles.
    pub check_interval: u64,
    /// Interfaces in the order their headers appear in the file.
    pub interfaces: Vec<InterfaceStatus>,
    /// Unrecognised global keys, stored verbatim.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub extra: BTreeMap<String, String>,
}

impl Default for StatusSnapshot {
    fn default() -> Self {
        Self {
            mode: Mode::default(),
            timestamp: 0,
            check_interval: DEFAULT_CHECK_INTERVAL,
            interfaces: Vec::new(),
            extra: BTreeMap::new(),
        }
    }
}

/// Multiple of the check interval after which a snapshot counts as stale.
pub const STALE_AFTER_INTERVALS: u64 = 3;

impl StatusSnapshot {
    /// Parse the text content of a status file.
    ///
    /// Returns `None` for empty (or whitespace-only) input, which means the
    /// service is not running. Never fails on malformed content.
    pub fn parse(raw: &str) -> Option<Self> {
        if raw.trim().is_empty() {
            return None;
        }

        let parser = raw
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .fold(Parser::default(), Parser::feed);

        Some(parser.snapshot)
    }

    /// Read and parse a status file.
    ///
    /// A missing file is the same as an empty one and yields `Ok(None)`.
    /// Other I/O errors are returned to the caller.
    pub fn load(path: &Path) -> Result<Option<Self>> {
        match fs::read_to_string(path) {
            Ok(content) => Ok(Self::parse(&content)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => {
                Err(e).with_context(|| format!("failed to read status file {}", path.display()))
            }
        }
    }

    /// Whether the daemon reported any interface. A file holding only the
    /// global block means the service is not running.
    pub fn is_running(&self) -> bool {
        !self.interfaces.is_empty()
    }

    /// Look up an interface by device name.
    pub fn interface(&self, name: &str) -> Option<&InterfaceStatus> {
        self.interfaces.iter().find(|iface| iface.name == name)
    }

    /// Seconds since the daemon wrote this snapshot, clamped at zero.
    pub fn age(&self, now: i64) -> u64 {
        now.saturating_sub(self.timestamp).max(0) as u64
    }

    /// Whether the daemon appears to have stopped updating the file.
    pub fn is_stale(&self, now: i64) -> bool {
        if self.timestamp == 0 {
            return true;
        }
        let interval = self.check_interval.max(1);
        self.age(now) > interval.saturating_mul(STALE_AFTER_INTERVALS)
    }

    fn set_global(&mut self, key: &str, value: &str) {
        match key {
            "mode" => self.mode = Mode::from_value(value),
            "timestamp" => set_parsed(&mut self.timestamp, value),
            "check_interval" => set_parsed(&mut self.check_interval, value),
            _ => {
                self.extra.insert(key.to_string(), value.to_string());
            }
        }
    }
}

/// Overwrite `field` when `value` parses, keep the old value otherwise.
fn set_parsed<T: std::str::FromStr>(field: &mut T, value: &str) {
    if let Ok(parsed) = value.parse() {
        *field = parsed;
    }
}

/// Where subsequent `key=value` lines are applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum ParseState {
    /// Before the first section header.
    #[default]
    Global,
    /// Inside the section of `interfaces[index]`. Never reverts to `Global`.
    Section(usize),
}

/// A single classified input line.
#[derive(Debug, PartialEq, Eq)]
enum Line<'a> {
    Header(&'a str),
    Field(&'a str, &'a str),
    Malformed,
}

impl<'a> Line<'a> {
    fn classify(line: &'a str) -> Self {
        if let Some(name) = line.strip_prefix('[').and_then(|rest| rest.strip_suffix(']')) {
            if !name.is_empty() && !name.contains(']') {
                return Line::Header(name);
            }
        }

        // Exactly one '=' and a non-empty key
        let mut parts = line.split('=');
        match (parts.next(), parts.next(), parts.next()) {
            (Some(key), Some(value), None) if !key.trim().is_empty() => {
                Line::Field(key.trim(), value.trim())
            }
            _ => Line::Malformed,
        }
    }
}

#[derive(Debug, Default)]
struct Parser {
    state: ParseState,
    snapshot: StatusSnapshot,
}

impl Parser {
    fn feed(mut self, line: &str) -> Self {
        match Line::classify(line) {
            Line::Header(name) => {
                let index = match self.snapshot.interfaces.iter().position(|i| i.name == name) {
                    Some(index) => index,
                    None => {
                        self.snapshot.interfaces.push(InterfaceStatus::new(name));
                        self.snapshot.interfaces.len() - 1
                    }
                };
                self.state = ParseState::Section(index);
            }
            Line::Field(key, value) => match self.state {
                ParseState::Global => self.snapshot.set_global(key, value),
                ParseState::Section(index) => self.snapshot.interfaces[index].set(key, value),
            },
            Line::Malformed => {}
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "mode=failover
timestamp=1700000000
check_interval=30
[wg0]
does_exist=1
is_up=1
degraded=0
latency=15.3
rx_bytes=1048576
tx_bytes=2048
";

    #[test]
    fn test_parse_empty_is_none() {
        assert!(StatusSnapshot::parse("").is_none());
        assert!(StatusSnapshot::parse("  \n\n  ").is_none());
    }

    #[test]
    fn test_parse_globals_and_interface() {
        let snapshot = StatusSnapshot::parse(SAMPLE).unwrap();
        assert_eq!(snapshot.mode, Mode::Failover);
        assert_eq!(snapshot.timestamp, 1_700_000_000);
        assert_eq!(snapshot.check_interval, 30);
        assert_eq!(snapshot.interfaces.len(), 1);

        let wg0 = &snapshot.interfaces[0];
        assert_eq!(wg0.name, "wg0");
        assert!(wg0.does_exist);
        assert!(wg0.is_up);
        assert_eq!(wg0.degraded, 0);
        assert_eq!(wg0.latency, 15.3);
        assert_eq!(wg0.rx_bytes, 1_048_576);
        assert_eq!(wg0.tx_bytes, 2048);
    }

    #[test]
    fn test_parse_is_deterministic() {
        assert_eq!(StatusSnapshot::parse(SAMPLE), StatusSnapshot::parse(SAMPLE));
    }

    #[test]
    fn test_interfaces_keep_file_order() {
        let raw = "[wg2]\nis_up=1\n[eth1]\nis_up=0\n[wg0]\n";
        let snapshot = StatusSnapshot::parse(raw).unwrap();
        let names: Vec<&str> = snapshot.interfaces.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, ["wg2", "eth1", "wg0"]);
    }

    #[test]
    fn test_missing_globals_keep_defaults() {
        let snapshot = StatusSnapshot::parse("[wg0]\nis_up=1").unwrap();
        assert_eq!(snapshot.mode, Mode::Unknown(String::new()));
        assert_eq!(snapshot.timestamp, 0);
        assert_eq!(snapshot.check_interval, DEFAULT_CHECK_INTERVAL);

        let wg0 = &snapshot.interfaces[0];
        assert!(!wg0.does_exist);
        assert_eq!(wg0.latency, 0.0);
        assert_eq!(wg0.gateway, "");
    }

    #[test]
    fn test_duplicate_key_last_wins() {
        let snapshot = StatusSnapshot::parse("[wg0]\nlatency=1.0\nlatency=2.0").unwrap();
        assert_eq!(snapshot.interfaces[0].latency, 2.0);
    }

    #[test]
    fn test_malformed_lines_are_skipped() {
        let raw = "[wg0]\nis_up=1\nnotkeyvalue\ngateway=10.0.0.1\n=orphan\na=b=c\n[]\n";
        let snapshot = StatusSnapshot::parse(raw).unwrap();
        assert_eq!(snapshot.interfaces.len(), 1);

        let wg0 = &snapshot.interfaces[0];
        assert!(wg0.is_up);
        assert_eq!(wg0.gateway, "10.0.0.1");
        assert!(wg0.extra.is_empty());
    }

    #[test]
    fn test_boolean_fields_require_literal_one() {
        let snapshot = StatusSnapshot::parse("[wg0]\ndoes_exist=true\nis_up=1").unwrap();
        assert!(!snapshot.interfaces[0].does_exist);
        assert!(snapshot.interfaces[0].is_up);
    }

    #[test]
    fn test_unparseable_number_keeps_default() {
        let snapshot = StatusSnapshot::parse("check_interval=soon\n[wg0]\nlatency=abc").unwrap();
        assert_eq!(snapshot.check_interval, DEFAULT_CHECK_INTERVAL);
        assert_eq!(snapshot.interfaces[0].latency, 0.0);
    }

    #[test]
    fn test_unknown_keys_pass_through() {
        let raw = "version=2\n[wg0]\nmtu=1420\nstatus_since=1699999000";
        let snapshot = StatusSnapshot::parse(raw).unwrap();
        assert_eq!(snapshot.extra.get("version").map(String::as_str), Some("2"));

        let wg0 = &snapshot.interfaces[0];
        assert_eq!(wg0.extra.get("mtu").map(String::as_str), Some("1420"));
        assert_eq!(wg0.status_since, "1699999000");
    }

    #[test]
    fn test_whitespace_is_trimmed() {
        let snapshot = StatusSnapshot::parse("  mode = multiuplink \n  [ wg0 ]  \n gateway = 10.1.1.1 ")
            .unwrap();
        assert_eq!(snapshot.mode, Mode::MultiUplink);
        assert_eq!(snapshot.interfaces[0].name, " wg0 ");
        assert_eq!(snapshot.interfaces[0].gateway, "10.1.1.1");
    }

    #[test]
    fn test_repeated_header_reopens_record() {
        let snapshot = StatusSnapshot::parse("[wg0]\nis_up=1\n[wg1]\n[wg0]\nlatency=3.5").unwrap();
        assert_eq!(snapshot.interfaces.len(), 2);
        let wg0 = snapshot.interface("wg0").unwrap();
        assert!(wg0.is_up);
        assert_eq!(wg0.latency, 3.5);
    }

    #[test]
    fn test_global_keys_after_header_belong_to_section() {
        let snapshot = StatusSnapshot::parse("[wg0]\ntimestamp=5").unwrap();
        assert_eq!(snapshot.timestamp, 0);
        assert_eq!(snapshot.interfaces[0].extra.get("timestamp").map(String::as_str), Some("5"));
    }

    #[test]
    fn test_unknown_mode_is_kept_verbatim() {
        let snapshot = StatusSnapshot::parse("mode=roundrobin").unwrap();
        assert_eq!(snapshot.mode, Mode::Unknown("roundrobin".to_string()));
        assert_eq!(snapshot.mode.label(), "roundrobin");
    }

    #[test]
    fn test_globals_only_is_not_running() {
        let snapshot = StatusSnapshot::parse("mode=failover\ntimestamp=1700000000\n").unwrap();
        assert!(!snapshot.is_running());
        assert!(StatusSnapshot::parse("[wg0]").unwrap().is_running());
    }

    #[test]
    fn test_staleness() {
        let snapshot = StatusSnapshot::parse(SAMPLE).unwrap();
        assert!(!snapshot.is_stale(1_700_000_090));
        assert!(snapshot.is_stale(1_700_000_091));
        assert_eq!(snapshot.age(1_699_999_000), 0);

        let undated = StatusSnapshot::parse("[wg0]").unwrap();
        assert!(undated.is_stale(1_700_000_000));
    }

    #[test]
    fn test_load_missing_file_is_none() {
        let loaded = StatusSnapshot::load(Path::new("/nonexistent/mini-mwan.status")).unwrap();
        assert!(loaded.is_none());
    }
}
