use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::utils::format_timestamp;

/// One minute bar of market data.
///
/// Serialized to CSV as `time,open,high,low,close,volume` with the timestamp
/// pinned to the segment format so written rows parse back to the identical
/// UTC instant.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Bar {
    #[serde(serialize_with = "serialize_time_with_offset")]
    pub time: DateTime<Utc>,

    pub open: f64,

    pub high: f64,

    pub low: f64,

    pub close: f64,

    pub volume: u64,
}

fn serialize_time_with_offset<S>(time: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.serialize_str(&format_timestamp(time))
}

impl Bar {
    /// Create a new bar
    pub fn new(
        time: DateTime<Utc>,
        open: f64,
        high: f64,
        low: f64,
        close: f64,
        volume: u64,
    ) -> Self {
        Self {
            time,
            open,
            high,
            low,
            close,
            volume,
        }
    }
}
