//! Reader and validator for the service configuration, `/etc/config/mini-mwan`.
//!
//! The file uses OpenWrt's UCI syntax:
//!
//! ```text
//! config settings 'settings'
//!     option enabled '1'
//!     option mode 'failover'
//!     option check_interval '30'
//!
//! config interface 'wan_a'
//!     option device 'wg0'
//!     option metric '10'
//!     option ping_target '1.1.1.1'
//! ```
//!
//! The viewer never writes this file. Validation mirrors the constraints the
//! configuration editor enforces, so problems can be reported from a shell.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::fs;
use std::net::IpAddr;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;
use thiserror::Error;
use tracing::debug;

use crate::source::Mode;

/// Default location of the service configuration.
pub const DEFAULT_UCI_PATH: &str = "/etc/config/mini-mwan";

/// Syntax errors in a UCI file.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum UciError {
    #[error("line {line}: unterminated quote")]
    UnterminatedQuote { line: usize },

    #[error("line {line}: '{keyword}' outside of a config section")]
    OutsideSection { line: usize, keyword: String },

    #[error("line {line}: '{keyword}' is missing an argument")]
    MissingArgument { line: usize, keyword: String },

    #[error("line {line}: unknown statement '{keyword}'")]
    UnknownStatement { line: usize, keyword: String },
}

/// A semantic problem with an otherwise well-formed configuration.
#[derive(Debug, Error, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "issue", rename_all = "snake_case")]
pub enum ConfigIssue {
    #[error("{section}: {option} must be between {min} and {max}, got {value}")]
    OutOfRange {
        section: String,
        option: &'static str,
        value: u64,
        min: u64,
        max: u64,
    },

    #[error("{section}: {option} is not a number: '{value}'")]
    NotANumber {
        section: String,
        option: &'static str,
        value: String,
    },

    #[error("{section}: unknown mode '{value}'")]
    UnknownMode { section: String, value: String },

    #[error("{section}: device is required")]
    MissingDevice { section: String },

    #[error("{section}: ping_target is required")]
    MissingPingTarget { section: String },

    #[error("{section}: ping_target '{value}' is not an IP address")]
    InvalidPingTarget { section: String, value: String },

    #[error("Duplicate device \"{device}\" found. Each interface must use a unique device.")]
    DuplicateDevice { device: String },

    #[error("{section}: Ping target \"{target}\" is already used by another interface")]
    DuplicatePingTarget { section: String, target: String },

    #[error("At least two WAN interfaces must be configured when the service is enabled ({count} found)")]
    TooFewInterfaces { count: usize },
}

/// One `config <kind> ['<name>']` block.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct UciSection {
    pub kind: String,
    /// Named sections carry an identifier; anonymous ones get `@kind[n]`.
    pub name: String,
    pub options: BTreeMap<String, String>,
    pub lists: BTreeMap<String, Vec<String>>,
}

impl UciSection {
    pub fn get(&self, option: &str) -> Option<&str> {
        self.options.get(option).map(String::as_str)
    }
}

/// Parse UCI text into its sections, in file order.
pub fn parse_sections(text: &str) -> Result<Vec<UciSection>, UciError> {
    let mut sections: Vec<UciSection> = Vec::new();
    let mut anonymous: HashMap<String, usize> = HashMap::new();

    for (index, raw) in text.lines().enumerate() {
        let line = index + 1;
        let words = tokenize(raw).ok_or(UciError::UnterminatedQuote { line })?;
        let Some((keyword, args)) = words.split_first() else {
            continue;
        };

        let missing = || UciError::MissingArgument {
            line,
            keyword: keyword.clone(),
        };

        match keyword.as_str() {
            "package" => {}
            "config" => {
                let kind = args.first().ok_or_else(missing)?.clone();
                let name = match args.get(1) {
                    Some(name) => name.clone(),
                    None => {
                        let n = anonymous.entry(kind.clone()).or_default();
                        *n += 1;
                        format!("@{}[{}]", kind, *n - 1)
                    }
                };
                sections.push(UciSection {
                    kind,
                    name,
                    ..UciSection::default()
                });
            }
            "option" | "list" => {
                let section = sections.last_mut().ok_or_else(|| UciError::OutsideSection {
                    line,
                    keyword: keyword.clone(),
                })?;
                let key = args.first().ok_or_else(missing)?.clone();
                let value = args.get(1).ok_or_else(missing)?.clone();
                if keyword == "option" {
                    section.options.insert(key, value);
                } else {
                    section.lists.entry(key).or_default().push(value);
                }
            }
            other => {
                return Err(UciError::UnknownStatement {
                    line,
                    keyword: other.to_string(),
                })
            }
        }
    }

    Ok(sections)
}

/// Split a line into words, honouring quotes and `#` comments.
///
/// Returns None on an unterminated quote.
fn tokenize(line: &str) -> Option<Vec<String>> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut in_word = false;
    let mut quote: Option<char> = None;
    let mut chars = line.chars();

    while let Some(c) = chars.next() {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some('"'), '\\') => {
                if let Some(escaped) = chars.next() {
                    current.push(escaped);
                }
            }
            (Some(_), c) => current.push(c),
            (None, '\'' | '"') => {
                quote = Some(c);
                in_word = true;
            }
            (None, '#') => break,
            (None, c) if c.is_whitespace() => {
                if in_word {
                    words.push(std::mem::take(&mut current));
                    in_word = false;
                }
            }
            (None, c) => {
                current.push(c);
                in_word = true;
            }
        }
    }

    if quote.is_some() {
        return None;
    }
    if in_word {
        words.push(current);
    }
    Some(words)
}

/// The `settings` section.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Settings {
    pub enabled: bool,
    pub mode: Mode,
    pub check_interval: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            enabled: false,
            mode: Mode::Failover,
            check_interval: 30,
        }
    }
}

/// One `interface` section.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InterfaceConfig {
    /// UCI section identifier.
    pub section: String,
    pub enabled: bool,
    pub device: String,
    /// Route metric, lower wins (failover mode).
    pub metric: u64,
    /// Traffic share (multi-uplink mode).
    pub weight: u64,
    pub ping_target: String,
    pub ping_count: u64,
    /// Seconds.
    pub ping_timeout: u64,
}

impl InterfaceConfig {
    fn new(section: &str) -> Self {
        Self {
            section: section.to_string(),
            enabled: true,
            device: String::new(),
            metric: 10,
            weight: 3,
            ping_target: String::new(),
            ping_count: 3,
            ping_timeout: 2,
        }
    }
}

/// Allowed ranges of numeric options, checked by [`MwanConfig::validate`].
const CHECK_INTERVAL_RANGE: (u64, u64) = (10, 3600);
const METRIC_RANGE: (u64, u64) = (1, 255);
const WEIGHT_RANGE: (u64, u64) = (1, 10);
const PING_COUNT_RANGE: (u64, u64) = (1, 10);
const PING_TIMEOUT_RANGE: (u64, u64) = (1, 10);

/// Typed view of the service configuration.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct MwanConfig {
    pub settings: Settings,
    pub interfaces: Vec<InterfaceConfig>,
    /// Values that could not be interpreted while reading.
    #[serde(skip)]
    read_issues: Vec<ConfigIssue>,
}

impl MwanConfig {
    /// Parse the text of a UCI configuration file.
    pub fn parse(text: &str) -> Result<Self, UciError> {
        let sections = parse_sections(text)?;
        Ok(Self::from_sections(&sections))
    }

    /// Read and parse the configuration file at `path`.
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let config = Self::parse(&text).with_context(|| format!("in {}", path.display()))?;
        debug!(
            path = %path.display(),
            interfaces = config.interfaces.len(),
            "loaded service configuration"
        );
        Ok(config)
    }

    /// Build the typed configuration from raw sections. Unknown section
    /// kinds are ignored.
    pub fn from_sections(sections: &[UciSection]) -> Self {
        let mut config = MwanConfig::default();

        for section in sections {
            match section.kind.as_str() {
                "settings" => config.read_settings(section),
                "interface" => {
                    let iface = config.read_interface(section);
                    config.interfaces.push(iface);
                }
                _ => {}
            }
        }

        config
    }

    fn read_settings(&mut self, section: &UciSection) {
        let settings = &mut self.settings;
        if let Some(value) = section.get("enabled") {
            settings.enabled = value == "1";
        }
        if let Some(value) = section.get("mode") {
            settings.mode = Mode::from_value(value);
        }
        let mut check_interval = settings.check_interval;
        self.read_number(section, "check_interval", &mut check_interval);
        self.settings.check_interval = check_interval;
    }

    fn read_interface(&mut self, section: &UciSection) -> InterfaceConfig {
        let mut iface = InterfaceConfig::new(&section.name);
        if let Some(value) = section.get("enabled") {
            iface.enabled = value == "1";
        }
        if let Some(value) = section.get("device") {
            iface.device = value.to_string();
        }
        if let Some(value) = section.get("ping_target") {
            iface.ping_target = value.to_string();
        }
        self.read_number(section, "metric", &mut iface.metric);
        self.read_number(section, "weight", &mut iface.weight);
        self.read_number(section, "ping_count", &mut iface.ping_count);
        self.read_number(section, "ping_timeout", &mut iface.ping_timeout);
        iface
    }

    fn read_number(&mut self, section: &UciSection, option: &'static str, field: &mut u64) {
        let Some(value) = section.get(option) else {
            return;
        };
        match value.parse() {
            Ok(parsed) => *field = parsed,
            Err(_) => self.read_issues.push(ConfigIssue::NotANumber {
                section: section.name.clone(),
                option,
                value: value.to_string(),
            }),
        }
    }

    /// Find the configured interface for a device.
    pub fn interface_for_device(&self, device: &str) -> Option<&InterfaceConfig> {
        self.interfaces.iter().find(|iface| iface.device == device)
    }

    /// Check every constraint; an empty result means the configuration is
    /// valid.
    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = self.read_issues.clone();

        let settings_section = "settings".to_string();
        if let Mode::Unknown(value) = &self.settings.mode {
            issues.push(ConfigIssue::UnknownMode {
                section: settings_section.clone(),
                value: value.clone(),
            });
        }
        check_range(
            &mut issues,
            &settings_section,
            "check_interval",
            self.settings.check_interval,
            CHECK_INTERVAL_RANGE,
        );

        let mut seen_devices: HashSet<&str> = HashSet::new();
        let mut seen_targets: HashSet<&str> = HashSet::new();

        for iface in &self.interfaces {
            let section = &iface.section;

            if iface.device.is_empty() {
                issues.push(ConfigIssue::MissingDevice {
                    section: section.clone(),
                });
            } else if !seen_devices.insert(&iface.device) {
                issues.push(ConfigIssue::DuplicateDevice {
                    device: iface.device.clone(),
                });
            }

            if iface.ping_target.is_empty() {
                issues.push(ConfigIssue::MissingPingTarget {
                    section: section.clone(),
                });
            } else if iface.ping_target.parse::<IpAddr>().is_err() {
                issues.push(ConfigIssue::InvalidPingTarget {
                    section: section.clone(),
                    value: iface.ping_target.clone(),
                });
            } else if !seen_targets.insert(&iface.ping_target) {
                issues.push(ConfigIssue::DuplicatePingTarget {
                    section: section.clone(),
                    target: iface.ping_target.clone(),
                });
            }

            check_range(&mut issues, section, "metric", iface.metric, METRIC_RANGE);
            check_range(&mut issues, section, "weight", iface.weight, WEIGHT_RANGE);
            check_range(&mut issues, section, "ping_count", iface.ping_count, PING_COUNT_RANGE);
            check_range(
                &mut issues,
                section,
                "ping_timeout",
                iface.ping_timeout,
                PING_TIMEOUT_RANGE,
            );
        }

        let enabled = self.interfaces.iter().filter(|iface| iface.enabled).count();
        if self.settings.enabled && enabled < 2 {
            issues.push(ConfigIssue::TooFewInterfaces { count: enabled });
        }

        issues
    }
}

fn check_range(
    issues: &mut Vec<ConfigIssue>,
    section: &str,
    option: &'static str,
    value: u64,
    (min, max): (u64, u64),
) {
    if !(min..=max).contains(&value) {
        issues.push(ConfigIssue::OutOfRange {
            section: section.to_string(),
            option,
            value,
            min,
            max,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
config settings 'settings'
	option enabled '1'
	option mode 'multiuplink'
	option check_interval '15'

config interface 'wan_a'
	option enabled '1'
	option device 'wg0'
	option metric '10'
	option weight '5'
	option ping_target '1.1.1.1'

# backup tunnel
config interface 'wan_b'
	option device "wg1"
	option metric 20
	option ping_target '8.8.8.8'
	option ping_count '4'
	option ping_timeout '3'
"#;

    #[test]
    fn test_tokenize() {
        assert_eq!(
            tokenize("  option device 'wg 0' # comment").unwrap(),
            vec!["option", "device", "wg 0"]
        );
        assert_eq!(tokenize(r#"option name "a\"b""#).unwrap(), vec!["option", "name", "a\"b"]);
        assert_eq!(tokenize("option empty ''").unwrap(), vec!["option", "empty", ""]);
        assert!(tokenize("option device 'wg0").is_none());
    }

    #[test]
    fn test_parse_sample() {
        let config = MwanConfig::parse(SAMPLE).unwrap();
        assert!(config.settings.enabled);
        assert_eq!(config.settings.mode, Mode::MultiUplink);
        assert_eq!(config.settings.check_interval, 15);
        assert_eq!(config.interfaces.len(), 2);

        let wan_b = &config.interfaces[1];
        assert_eq!(wan_b.section, "wan_b");
        assert!(wan_b.enabled);
        assert_eq!(wan_b.device, "wg1");
        assert_eq!(wan_b.metric, 20);
        assert_eq!(wan_b.weight, 3);
        assert_eq!(wan_b.ping_count, 4);
        assert_eq!(wan_b.ping_timeout, 3);

        assert!(config.validate().is_empty());
        assert_eq!(config.interface_for_device("wg0").unwrap().section, "wan_a");
    }

    #[test]
    fn test_anonymous_sections() {
        let sections = parse_sections("config interface\nconfig interface\n").unwrap();
        assert_eq!(sections[0].name, "@interface[0]");
        assert_eq!(sections[1].name, "@interface[1]");
    }

    #[test]
    fn test_lists_are_collected() {
        let sections =
            parse_sections("config interface 'a'\n list dns '1.1.1.1'\n list dns '9.9.9.9'\n")
                .unwrap();
        assert_eq!(sections[0].lists["dns"], vec!["1.1.1.1", "9.9.9.9"]);
    }

    #[test]
    fn test_syntax_errors() {
        assert_eq!(
            parse_sections("option device 'wg0'"),
            Err(UciError::OutsideSection {
                line: 1,
                keyword: "option".to_string()
            })
        );
        assert_eq!(
            parse_sections("config interface 'a'\noption device"),
            Err(UciError::MissingArgument {
                line: 2,
                keyword: "option".to_string()
            })
        );
        assert!(matches!(
            parse_sections("config interface 'a'\nfrobnicate x"),
            Err(UciError::UnknownStatement { line: 2, .. })
        ));
    }

    #[test]
    fn test_duplicate_device_and_target() {
        let config = MwanConfig::parse(
            "config interface 'a'\n option device 'wg0'\n option ping_target '1.1.1.1'\n\
             config interface 'b'\n option device 'wg0'\n option ping_target '1.1.1.1'\n",
        )
        .unwrap();
        let issues = config.validate();
        assert!(issues.contains(&ConfigIssue::DuplicateDevice {
            device: "wg0".to_string()
        }));
        assert!(issues.contains(&ConfigIssue::DuplicatePingTarget {
            section: "b".to_string(),
            target: "1.1.1.1".to_string()
        }));
        assert_eq!(
            issues[0].to_string(),
            "Duplicate device \"wg0\" found. Each interface must use a unique device."
        );
    }

    #[test]
    fn test_range_and_format_checks() {
        let config = MwanConfig::parse(
            "config settings\n option check_interval '5'\n option mode 'random'\n\
             config interface 'a'\n option device 'wg0'\n option ping_target 'one.one'\n\
             option metric '0'\n option weight 'heavy'\n option ping_timeout '11'\n",
        )
        .unwrap();
        let issues = config.validate();

        assert!(issues.contains(&ConfigIssue::NotANumber {
            section: "a".to_string(),
            option: "weight",
            value: "heavy".to_string()
        }));
        assert!(issues.contains(&ConfigIssue::UnknownMode {
            section: "settings".to_string(),
            value: "random".to_string()
        }));
        assert!(issues.contains(&ConfigIssue::OutOfRange {
            section: "settings".to_string(),
            option: "check_interval",
            value: 5,
            min: 10,
            max: 3600
        }));
        assert!(issues.contains(&ConfigIssue::InvalidPingTarget {
            section: "a".to_string(),
            value: "one.one".to_string()
        }));
        assert!(issues
            .iter()
            .any(|i| matches!(i, ConfigIssue::OutOfRange { option: "metric", .. })));
        assert!(issues
            .iter()
            .any(|i| matches!(i, ConfigIssue::OutOfRange { option: "ping_timeout", .. })));
    }

    #[test]
    fn test_missing_fields() {
        let config = MwanConfig::parse("config interface 'a'\n").unwrap();
        let issues = config.validate();
        assert!(issues.contains(&ConfigIssue::MissingDevice {
            section: "a".to_string()
        }));
        assert!(issues.contains(&ConfigIssue::MissingPingTarget {
            section: "a".to_string()
        }));
    }

    #[test]
    fn test_enabled_service_needs_two_interfaces() {
        let config = MwanConfig::parse(
            "config settings\n option enabled '1'\n\
             config interface 'a'\n option device 'wg0'\n option ping_target '1.1.1.1'\n\
             config interface 'b'\n option enabled '0'\n option device 'wg1'\n option ping_target '8.8.8.8'\n",
        )
        .unwrap();
        assert_eq!(config.validate(), vec![ConfigIssue::TooFewInterfaces { count: 1 }]);
    }

    #[test]
    fn test_ipv6_ping_target_is_accepted() {
        let config = MwanConfig::parse(
            "config interface 'a'\n option device 'wg0'\n option ping_target '2606:4700::1111'\n",
        )
        .unwrap();
        assert!(config.validate().is_empty());
    }
}
