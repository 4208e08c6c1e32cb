//! Interface status classification.
//!
//! Classification is driven by ordered rule tables: the first rule whose
//! predicate matches decides the badge. New status classes or degraded
//! reasons are added by extending the tables.

use std::fmt;

use serde::Serialize;

use crate::source::InterfaceStatus;

/// Display text for known `degraded_reason` values. Unknown reasons are shown
/// verbatim.
pub const DEGRADED_REASONS: &[(&str, &str)] = &[
    ("no_gateway", "No Gateway"),
    ("ipv6_detected", "IPv6 Detected"),
];

/// Health level used for colouring and for header counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HealthStatus {
    Healthy,
    Warning,
    Critical,
}

impl HealthStatus {
    /// Returns a short symbol for display.
    pub fn symbol(&self) -> &'static str {
        match self {
            HealthStatus::Healthy => "OK",
            HealthStatus::Warning => "WARN",
            HealthStatus::Critical => "CRIT",
        }
    }
}

/// Status shown for one interface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "reason", rename_all = "snake_case")]
pub enum StatusBadge {
    /// Usable but flagged by policy; carries the reason text.
    Degraded(String),
    NotFound,
    Down,
    Up,
    /// Device exists and is up, but the last probe failed.
    NoConnectivity,
}

impl StatusBadge {
    /// Classify an interface. The first matching rule of [`BADGE_RULES`] wins.
    pub fn classify(iface: &InterfaceStatus) -> Self {
        BADGE_RULES
            .iter()
            .find(|rule| (rule.matches)(iface))
            .map(|rule| (rule.badge)(iface))
            .unwrap_or(StatusBadge::NoConnectivity)
    }

    /// Full label, e.g. `"Degraded (No Gateway)"`.
    pub fn label(&self) -> String {
        match self {
            StatusBadge::Degraded(reason) => format!("Degraded ({})", reason),
            StatusBadge::NotFound => "Interface Not Found".to_string(),
            StatusBadge::Down => "Interface Down".to_string(),
            StatusBadge::Up => "UP".to_string(),
            StatusBadge::NoConnectivity => "No Connectivity".to_string(),
        }
    }

    /// Leading glyph for the badge.
    pub fn symbol(&self) -> &'static str {
        match self {
            StatusBadge::Degraded(_) | StatusBadge::NoConnectivity => "⚠",
            StatusBadge::NotFound => "✖",
            StatusBadge::Down => "↓",
            StatusBadge::Up => "●",
        }
    }

    pub fn health(&self) -> HealthStatus {
        match self {
            StatusBadge::Up => HealthStatus::Healthy,
            StatusBadge::Degraded(_) | StatusBadge::NoConnectivity => HealthStatus::Warning,
            StatusBadge::NotFound | StatusBadge::Down => HealthStatus::Critical,
        }
    }
}

impl fmt::Display for StatusBadge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.symbol(), self.label())
    }
}

/// One entry of the classification chain.
pub struct BadgeRule {
    pub matches: fn(&InterfaceStatus) -> bool,
    pub badge: fn(&InterfaceStatus) -> StatusBadge,
}

/// Classification chain in priority order. An interface matching none of
/// these has no connectivity.
pub const BADGE_RULES: &[BadgeRule] = &[
    BadgeRule {
        matches: InterfaceStatus::is_degraded,
        badge: |iface| StatusBadge::Degraded(reason_text(&iface.degraded_reason)),
    },
    BadgeRule {
        matches: |iface| !iface.does_exist,
        badge: |_| StatusBadge::NotFound,
    },
    BadgeRule {
        matches: |iface| !iface.is_up,
        badge: |_| StatusBadge::Down,
    },
    BadgeRule {
        matches: |iface| iface.latency > 0.0,
        badge: |_| StatusBadge::Up,
    },
];

/// Display text for a `degraded_reason` value.
pub fn reason_text(reason: &str) -> String {
    if reason.is_empty() {
        return "unknown".to_string();
    }
    DEGRADED_REASONS
        .iter()
        .find(|(key, _)| *key == reason)
        .map(|(_, text)| text.to_string())
        .unwrap_or_else(|| reason.to_string())
}

/// Row highlighting for the interface table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RowEmphasis {
    #[default]
    Normal,
    NotFound,
    Degraded,
}

impl RowEmphasis {
    /// A missing device outranks the degraded flag.
    pub fn of(iface: &InterfaceStatus) -> Self {
        if !iface.does_exist {
            RowEmphasis::NotFound
        } else if iface.is_degraded() {
            RowEmphasis::Degraded
        } else {
            RowEmphasis::Normal
        }
    }
}
