//! Timestamp Resolver
//!
//! Derives a ticker's resumption point by scanning only the highest-ordinal
//! segment. Earlier segments are append-only and strictly older, so reading
//! them again would be wasted work. Every failure mode degrades to `None`
//! (treated as "no prior data"), trading a re-fetch of the lookback window
//! for never hard-failing a run on a damaged file.

use chrono::{DateTime, Utc};
use std::path::Path;
use tracing::{debug, warn};

use crate::error::Result;
use crate::services::segment_writer::list_segments;
use crate::utils::{parse_timestamp_lenient, parse_timestamp_strict};

/// Latest timestamp already persisted for a ticker, or `None` when the
/// directory has no segments, the last segment is empty, or no row parses.
pub fn latest_timestamp(ticker_dir: &Path) -> Option<DateTime<Utc>> {
    let segments = match list_segments(ticker_dir) {
        Ok(segments) => segments,
        Err(e) => {
            warn!(dir = %ticker_dir.display(), error = %e, "Could not list segments, treating as no prior data");
            return None;
        }
    };

    let Some((ordinal, last_segment)) = segments.last() else {
        return None;
    };

    match read_latest_from_segment(last_segment) {
        Ok(latest) => {
            debug!(dir = %ticker_dir.display(), ordinal, latest = ?latest, "Resolved resumption point");
            latest
        }
        Err(e) => {
            warn!(segment = %last_segment.display(), error = %e, "Could not read last segment, treating as no prior data");
            None
        }
    }
}

/// Maximum timestamp in one segment file.
///
/// First pass uses the strict on-disk format for the whole column. If any
/// row fails, the column is re-parsed leniently per row, discarding rows
/// that cannot be coerced instead of failing the read.
fn read_latest_from_segment(path: &Path) -> Result<Option<DateTime<Utc>>> {
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_path(path)?;

    let mut raw_times = Vec::new();
    for record in reader.records() {
        let record = record?;
        if let Some(field) = record.get(0) {
            raw_times.push(field.to_string());
        }
    }

    if raw_times.is_empty() {
        return Ok(None);
    }

    let mut latest: Option<DateTime<Utc>> = None;
    let mut strict_ok = true;
    for raw in &raw_times {
        match parse_timestamp_strict(raw) {
            Ok(t) => {
                if latest.map_or(true, |cur| t > cur) {
                    latest = Some(t);
                }
            }
            Err(_) => {
                strict_ok = false;
                break;
            }
        }
    }
    if strict_ok {
        return Ok(latest);
    }

    debug!(segment = %path.display(), "Strict timestamp parse failed, falling back to lenient per-row parse");

    let mut latest: Option<DateTime<Utc>> = None;
    let mut dropped = 0usize;
    for raw in &raw_times {
        match parse_timestamp_lenient(raw) {
            Some(t) => {
                if latest.map_or(true, |cur| t > cur) {
                    latest = Some(t);
                }
            }
            None => dropped += 1,
        }
    }

    if dropped > 0 {
        warn!(segment = %path.display(), dropped, "Discarded rows with unparseable timestamps");
    }

    Ok(latest)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::fs;
    use tempfile::TempDir;

    fn write_segment(dir: &Path, ordinal: u64, rows: &[&str]) {
        let mut content = String::from("time,open,high,low,close,volume\n");
        for row in rows {
            content.push_str(row);
            content.push('\n');
        }
        fs::write(dir.join(format!("data_{}.csv", ordinal)), content).unwrap();
    }

    #[test]
    fn test_empty_directory_yields_none() {
        let tmp = TempDir::new().unwrap();
        assert_eq!(latest_timestamp(tmp.path()), None);
    }

    #[test]
    fn test_missing_directory_yields_none() {
        let tmp = TempDir::new().unwrap();
        assert_eq!(latest_timestamp(&tmp.path().join("nope")), None);
    }

    #[test]
    fn test_header_only_segment_yields_none() {
        let tmp = TempDir::new().unwrap();
        write_segment(tmp.path(), 0, &[]);
        assert_eq!(latest_timestamp(tmp.path()), None);
    }

    #[test]
    fn test_latest_from_single_segment() {
        let tmp = TempDir::new().unwrap();
        write_segment(
            tmp.path(),
            0,
            &[
                "2024-03-15 13:45:00+0000,10,11,9,10.5,100",
                "2024-03-15 13:47:00+0000,10,11,9,10.5,100",
                "2024-03-15 13:46:00+0000,10,11,9,10.5,100",
            ],
        );

        let expected = Utc.with_ymd_and_hms(2024, 3, 15, 13, 47, 0).unwrap();
        assert_eq!(latest_timestamp(tmp.path()), Some(expected));
    }

    #[test]
    fn test_only_last_segment_is_scanned() {
        let tmp = TempDir::new().unwrap();
        // Earlier segment holds a later timestamp than the last one; the
        // resolver trusts ordinal order and must not look at it.
        write_segment(tmp.path(), 0, &["2024-03-20 10:00:00+0000,1,1,1,1,1"]);
        write_segment(tmp.path(), 1, &["2024-03-15 10:00:00+0000,1,1,1,1,1"]);

        let expected = Utc.with_ymd_and_hms(2024, 3, 15, 10, 0, 0).unwrap();
        assert_eq!(latest_timestamp(tmp.path()), Some(expected));
    }

    #[test]
    fn test_numeric_ordinal_order_picks_last_segment() {
        let tmp = TempDir::new().unwrap();
        for ordinal in 0..=10 {
            write_segment(tmp.path(), ordinal, &["2024-03-15 10:00:00+0000,1,1,1,1,1"]);
        }
        write_segment(tmp.path(), 10, &["2024-03-16 10:00:00+0000,1,1,1,1,1"]);

        // data_10 sorts after data_9 numerically even though it sorts
        // before data_2 lexicographically.
        let expected = Utc.with_ymd_and_hms(2024, 3, 16, 10, 0, 0).unwrap();
        assert_eq!(latest_timestamp(tmp.path()), Some(expected));
    }

    #[test]
    fn test_lenient_fallback_skips_corrupt_trailing_row() {
        let tmp = TempDir::new().unwrap();
        write_segment(
            tmp.path(),
            0,
            &[
                "2024-03-15 13:45:00+0000,10,11,9,10.5,100",
                "2024-03-15 13:46:00+0000,10,11,9,10.5,100",
                "garbage-from-a-crash,10,11",
            ],
        );

        let expected = Utc.with_ymd_and_hms(2024, 3, 15, 13, 46, 0).unwrap();
        assert_eq!(latest_timestamp(tmp.path()), Some(expected));
    }

    #[test]
    fn test_lenient_fallback_accepts_naive_rows_as_utc() {
        let tmp = TempDir::new().unwrap();
        write_segment(
            tmp.path(),
            0,
            &[
                "2024-03-15 13:45:00,10,11,9,10.5,100",
                "2024-03-15 13:50:00,10,11,9,10.5,100",
            ],
        );

        let expected = Utc.with_ymd_and_hms(2024, 3, 15, 13, 50, 0).unwrap();
        assert_eq!(latest_timestamp(tmp.path()), Some(expected));
    }

    #[test]
    fn test_fully_unparseable_segment_yields_none() {
        let tmp = TempDir::new().unwrap();
        write_segment(tmp.path(), 0, &["not,a,real,row,at,all", "nope,1,2,3,4,5"]);
        assert_eq!(latest_timestamp(tmp.path()), None);
    }
}
