//! Historical tracking across status reads, for sparklines and rates.
//!
//! Snapshots themselves are transient; this is the only state kept between
//! reads, and it is purely for display.

use std::collections::{HashMap, VecDeque};

use crate::source::StatusSnapshot;

/// Maximum number of samples kept per interface.
const MAX_HISTORY_SIZE: usize = 60;

/// One observation of an interface's counters.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Sample {
    /// Snapshot timestamp (epoch seconds).
    at: i64,
    latency: f64,
    rx_bytes: u64,
    tx_bytes: u64,
}

/// Tracks per-interface latency and traffic counters over time.
#[derive(Debug, Clone, Default)]
pub struct History {
    samples: HashMap<String, VecDeque<Sample>>,
}

impl History {
    /// Create a new empty history.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a snapshot. Repeated snapshots with the same timestamp are
    /// recorded once.
    pub fn record(&mut self, snapshot: &StatusSnapshot) {
        for iface in &snapshot.interfaces {
            let samples = self.samples.entry(iface.name.clone()).or_default();
            if samples.back().is_some_and(|s| s.at == snapshot.timestamp) {
                continue;
            }
            samples.push_back(Sample {
                at: snapshot.timestamp,
                latency: iface.latency,
                rx_bytes: iface.rx_bytes,
                tx_bytes: iface.tx_bytes,
            });
            if samples.len() > MAX_HISTORY_SIZE {
                samples.pop_front();
            }
        }

        // Interfaces removed from the configuration
        self.samples.retain(|name, _| snapshot.interface(name).is_some());
    }

    /// Forget everything (used when the service stops).
    pub fn clear(&mut self) {
        self.samples.clear();
    }

    /// Number of samples held for an interface.
    pub fn len(&self, name: &str) -> usize {
        self.samples.get(name).map_or(0, VecDeque::len)
    }

    /// Latency sparkline normalized to 0-7 for 8 bar levels.
    ///
    /// Failed probes (latency 0) map to level 0. Returns an empty Vec with
    /// fewer than two samples.
    pub fn latency_sparkline(&self, name: &str) -> Vec<u8> {
        let Some(samples) = self.samples.get(name) else {
            return Vec::new();
        };
        if samples.len() < 2 {
            return Vec::new();
        }

        let max = samples.iter().map(|s| s.latency).fold(0.0_f64, f64::max);
        if max <= 0.0 {
            return vec![0; samples.len()];
        }

        samples
            .iter()
            .map(|s| {
                let normalized = (s.latency.max(0.0) / max * 7.0) as u8;
                normalized.min(7)
            })
            .collect()
    }

    /// Receive and transmit rates (bytes per second) between the last two
    /// samples.
    ///
    /// Returns None without enough history, when no time elapsed, or when a
    /// counter went backwards (device recreated).
    pub fn traffic_rate(&self, name: &str) -> Option<(f64, f64)> {
        let samples = self.samples.get(name)?;
        if samples.len() < 2 {
            return None;
        }

        let current = samples.back()?;
        let previous = samples.get(samples.len() - 2)?;
        let elapsed = current.at.saturating_sub(previous.at) as f64;
        if elapsed <= 0.0 {
            return None;
        }

        let rx = current.rx_bytes.checked_sub(previous.rx_bytes)?;
        let tx = current.tx_bytes.checked_sub(previous.tx_bytes)?;
        Some((rx as f64 / elapsed, tx as f64 / elapsed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(ts: i64, latency: f64, rx: u64, tx: u64) -> StatusSnapshot {
        StatusSnapshot::parse(&format!(
            "timestamp={}\n[wg0]\nlatency={}\nrx_bytes={}\ntx_bytes={}\n",
            ts, latency, rx, tx
        ))
        .unwrap()
    }

    #[test]
    fn test_record_dedupes_timestamps() {
        let mut history = History::new();
        history.record(&snapshot(100, 10.0, 0, 0));
        history.record(&snapshot(100, 10.0, 0, 0));
        assert_eq!(history.len("wg0"), 1);

        history.record(&snapshot(130, 12.0, 0, 0));
        assert_eq!(history.len("wg0"), 2);
    }

    #[test]
    fn test_history_is_bounded() {
        let mut history = History::new();
        for i in 0..100 {
            history.record(&snapshot(i, 1.0, 0, 0));
        }
        assert_eq!(history.len("wg0"), MAX_HISTORY_SIZE);
    }

    #[test]
    fn test_traffic_rate() {
        let mut history = History::new();
        history.record(&snapshot(100, 10.0, 1_000, 500));
        assert!(history.traffic_rate("wg0").is_none());

        history.record(&snapshot(110, 10.0, 11_000, 1_500));
        assert_eq!(history.traffic_rate("wg0"), Some((1_000.0, 100.0)));
    }

    #[test]
    fn test_traffic_rate_extreme_timestamps() {
        let mut history = History::new();
        history.record(&snapshot(i64::MIN, 10.0, 0, 0));
        history.record(&snapshot(i64::MAX, 10.0, 1_000, 1_000));
        let (rx, tx) = history.traffic_rate("wg0").unwrap();
        assert!(rx > 0.0 && tx > 0.0);

        history.record(&snapshot(i64::MIN, 10.0, 2_000, 2_000));
        assert!(history.traffic_rate("wg0").is_none());
    }

    #[test]
    fn test_traffic_rate_counter_reset() {
        let mut history = History::new();
        history.record(&snapshot(100, 10.0, 5_000, 500));
        history.record(&snapshot(110, 10.0, 100, 600));
        assert!(history.traffic_rate("wg0").is_none());
    }

    #[test]
    fn test_latency_sparkline() {
        let mut history = History::new();
        history.record(&snapshot(1, 0.0, 0, 0));
        assert!(history.latency_sparkline("wg0").is_empty());

        history.record(&snapshot(2, 7.0, 0, 0));
        history.record(&snapshot(3, 14.0, 0, 0));
        assert_eq!(history.latency_sparkline("wg0"), vec![0, 3, 7]);
    }

    #[test]
    fn test_removed_interfaces_are_dropped() {
        let mut history = History::new();
        history.record(&snapshot(1, 1.0, 0, 0));
        history.record(&StatusSnapshot::parse("timestamp=2\n[wg1]\n").unwrap());
        assert_eq!(history.len("wg0"), 0);
        assert_eq!(history.len("wg1"), 1);
    }
}
