//! Storage Format Constants
//!
//! Defines the on-disk segment layout shared by the segment writer and the
//! timestamp resolver. The timestamp format here is the round-trip contract:
//! whatever the writer emits, the resolver's strict parser must accept.

/// Timestamp format used in the first column of every segment row.
///
/// The offset is always printed (`2024-01-02 13:45:00+0000`) and is always
/// `+0000` because all stored instants are UTC.
pub const SEGMENT_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S%z";

/// Naive timestamp format accepted by the lenient fallback parser.
///
/// Rows without an offset are assumed to already be UTC, not local time.
pub const NAIVE_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Segment filenames are `data_<ordinal>.csv`, ordinal starting at 0.
pub const SEGMENT_FILE_PREFIX: &str = "data_";

/// Rough byte cost of one serialized row (timestamp + OHLCV).
///
/// Rollover and split decisions use this estimate instead of serializing
/// rows just to measure them, so the segment cap is approximate.
pub const ESTIMATED_BYTES_PER_ROW: u64 = 150;

/// Fill fraction targeted when splitting an oversized batch, leaving slack
/// for the estimate being rough.
pub const SEGMENT_SPLIT_FILL: f64 = 0.90;

/// Default cap for a single segment file.
pub const DEFAULT_MAX_SEGMENT_SIZE_MB: u64 = 50;

/// Default historical window fetched for a ticker with no stored data.
pub const DEFAULT_LOOKBACK_DAYS: i64 = 7;

/// Default pause between tickers (rate-limit courtesy to the provider).
pub const DEFAULT_TICKER_PAUSE_SECS: u64 = 2;
