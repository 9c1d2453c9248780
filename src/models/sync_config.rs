use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::constants::{
    DEFAULT_LOOKBACK_DAYS, DEFAULT_MAX_SEGMENT_SIZE_MB, DEFAULT_TICKER_PAUSE_SECS,
};

/// Bar granularity requested from the provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Interval {
    /// One-minute bars
    Minute,
    /// One-hour bars
    Hourly,
    /// Daily bars
    Daily,
}

impl Interval {
    /// Convert to the provider's interval parameter ("1m", "1h", "1d")
    pub fn to_provider_format(&self) -> &'static str {
        match self {
            Interval::Minute => "1m",
            Interval::Hourly => "1h",
            Interval::Daily => "1d",
        }
    }

    /// Spacing between consecutive bars at this granularity.
    ///
    /// The fetch window for a resumed ticker starts one step past the last
    /// stored timestamp.
    pub fn step(&self) -> chrono::Duration {
        match self {
            Interval::Minute => chrono::Duration::minutes(1),
            Interval::Hourly => chrono::Duration::hours(1),
            Interval::Daily => chrono::Duration::days(1),
        }
    }
}

/// Configuration for one sync run, passed into the orchestrator.
///
/// Everything the storage and fetch layers need is explicit here so tests
/// can run with small thresholds instead of the production constants.
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Root of the storage tree (`<base_dir>/<group>/<ticker>/data_<n>.csv`)
    pub base_dir: PathBuf,

    /// Size cap for a single segment file, in bytes
    pub max_segment_bytes: u64,

    /// Historical window fetched when a ticker has no stored data
    pub lookback_days: i64,

    /// Bar granularity (fixed per run)
    pub interval: Interval,

    /// Pause between tickers (rate-limit courtesy)
    pub ticker_pause: Duration,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            base_dir: crate::utils::get_data_dir(),
            max_segment_bytes: DEFAULT_MAX_SEGMENT_SIZE_MB * 1024 * 1024,
            lookback_days: DEFAULT_LOOKBACK_DAYS,
            interval: Interval::Minute,
            ticker_pause: Duration::from_secs(DEFAULT_TICKER_PAUSE_SECS),
        }
    }
}

impl SyncConfig {
    /// Lookback window as a chrono duration.
    pub fn lookback(&self) -> chrono::Duration {
        chrono::Duration::days(self.lookback_days)
    }
}

/// Statistics for one sync run
#[derive(Debug, Default)]
pub struct SyncStats {
    pub updated: usize,
    pub up_to_date: usize,
    pub empty: usize,
    pub failed: usize,
    pub rows_written: usize,
}

impl SyncStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn total_processed(&self) -> usize {
        self.updated + self.up_to_date + self.empty + self.failed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interval_to_provider_format() {
        assert_eq!(Interval::Minute.to_provider_format(), "1m");
        assert_eq!(Interval::Hourly.to_provider_format(), "1h");
        assert_eq!(Interval::Daily.to_provider_format(), "1d");
    }

    #[test]
    fn test_interval_step() {
        assert_eq!(Interval::Minute.step(), chrono::Duration::minutes(1));
        assert_eq!(Interval::Daily.step(), chrono::Duration::days(1));
    }

    #[test]
    fn test_sync_config_default() {
        let config = SyncConfig::default();
        assert_eq!(config.max_segment_bytes, 50 * 1024 * 1024);
        assert_eq!(config.lookback_days, 7);
        assert_eq!(config.interval, Interval::Minute);
        assert_eq!(config.ticker_pause, Duration::from_secs(2));
    }

    #[test]
    fn test_sync_stats_total() {
        let stats = SyncStats {
            updated: 2,
            up_to_date: 1,
            empty: 1,
            failed: 1,
            rows_written: 120,
        };
        assert_eq!(stats.total_processed(), 5);
    }
}
