use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use std::path::PathBuf;

use crate::constants::{NAIVE_TIME_FORMAT, SEGMENT_TIME_FORMAT};

/// Get base data directory from environment variable or use default
pub fn get_data_dir() -> PathBuf {
    std::env::var("BARSYNC_DATA_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("data"))
}

/// Get watchlist file path from environment variable or use default
pub fn get_watchlist_path() -> PathBuf {
    std::env::var("BARSYNC_TICKERS")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("tickers.txt"))
}

/// Format a UTC instant in the on-disk segment format.
pub fn format_timestamp(time: &DateTime<Utc>) -> String {
    time.format(SEGMENT_TIME_FORMAT).to_string()
}

/// Strict parse of the on-disk timestamp format. The offset must be present.
pub fn parse_timestamp_strict(s: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    DateTime::parse_from_str(s.trim(), SEGMENT_TIME_FORMAT).map(|t| t.with_timezone(&Utc))
}

/// Lenient per-row parse used when the strict format fails.
///
/// Accepts the strict format, RFC 3339, and naive timestamps (localized as
/// UTC). Anything else is coerced to `None` and discarded by the caller.
pub fn parse_timestamp_lenient(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();

    if let Ok(t) = DateTime::parse_from_str(s, SEGMENT_TIME_FORMAT) {
        return Some(t.with_timezone(&Utc));
    }

    if let Ok(t) = DateTime::parse_from_rfc3339(s) {
        return Some(t.with_timezone(&Utc));
    }

    // Naive timestamps are assumed already UTC, not local time
    if let Ok(naive) = NaiveDateTime::parse_from_str(s, NAIVE_TIME_FORMAT) {
        return Some(Utc.from_utc_datetime(&naive));
    }

    None
}
