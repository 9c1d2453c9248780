//! Segment Writer
//!
//! Owns the size-capped multi-file storage layout for one ticker directory.
//! New rows always land in the highest-ordinal segment; when the cap would
//! be exceeded the writer rolls over to the next available ordinal, and a
//! batch too large for any single segment is split across several.
//!
//! Sizes are estimated at a fixed per-row cost rather than serialized to
//! measure, so the cap is approximate: a segment may overshoot by up to one
//! batch's estimation error, which the design accepts.

use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::constants::{ESTIMATED_BYTES_PER_ROW, SEGMENT_FILE_PREFIX, SEGMENT_SPLIT_FILL};
use crate::error::{Error, Result};
use crate::models::Bar;

pub struct SegmentWriter {
    max_segment_bytes: u64,
}

impl SegmentWriter {
    pub fn new(max_segment_bytes: u64) -> Self {
        Self { max_segment_bytes }
    }

    /// Append a reconciled, timestamp-sorted batch to a ticker directory.
    ///
    /// Prior rows are never rewritten or reordered; each loop iteration
    /// issues at most one append operation.
    pub fn append(&self, ticker_dir: &Path, bars: &[Bar]) -> Result<()> {
        if bars.is_empty() {
            return Ok(());
        }

        let mut target = self.initial_target(ticker_dir)?;
        let mut remaining = bars;

        loop {
            let current_size = fs::metadata(&target).map(|m| m.len()).unwrap_or(0);
            let write_header = current_size == 0;
            let estimated = remaining.len() as u64 * ESTIMATED_BYTES_PER_ROW;

            // Rollover: a non-empty target that would overflow gets closed
            // out and the batch re-evaluated against a fresh segment.
            if current_size > 0 && current_size + estimated > self.max_segment_bytes {
                debug!(
                    segment = %target.display(),
                    current_size,
                    estimated,
                    "Segment would exceed cap, rolling over"
                );
                target = next_available_segment(ticker_dir);
                continue;
            }

            // Split: the batch alone overflows even an empty segment. Fill
            // this one to ~90% of the cap and carry the rest forward.
            if current_size == 0 && estimated > self.max_segment_bytes && remaining.len() > 1 {
                let chunk_rows = ((self.max_segment_bytes as f64 / ESTIMATED_BYTES_PER_ROW as f64)
                    * SEGMENT_SPLIT_FILL) as usize;
                let chunk_rows = chunk_rows.max(1);

                let (chunk, rest) = remaining.split_at(chunk_rows);
                append_chunk(&target, chunk, write_header)?;
                info!(
                    rows = chunk.len(),
                    segment = %target.display(),
                    "Wrote chunk of oversized batch"
                );

                remaining = rest;
                target = next_available_segment(ticker_dir);
                continue;
            }

            append_chunk(&target, remaining, write_header)?;
            info!(
                rows = remaining.len(),
                header = write_header,
                segment = %target.display(),
                "Appended rows"
            );
            return Ok(());
        }
    }

    /// Highest-ordinal segment, unless it is already at the cap (or none
    /// exists), in which case the next available ordinal.
    fn initial_target(&self, ticker_dir: &Path) -> Result<PathBuf> {
        let segments = list_segments(ticker_dir)?;

        match segments.last() {
            Some((_, path)) => {
                let size = fs::metadata(path).map(|m| m.len()).unwrap_or(0);
                if size >= self.max_segment_bytes {
                    debug!(segment = %path.display(), size, "Last segment full, starting a new one");
                    Ok(next_available_segment(ticker_dir))
                } else {
                    Ok(path.clone())
                }
            }
            None => Ok(next_available_segment(ticker_dir)),
        }
    }
}

/// Enumerate `data_<n>.csv` segments in numeric ordinal order.
///
/// A missing directory is just an empty ticker, not an error.
pub fn list_segments(ticker_dir: &Path) -> Result<Vec<(u64, PathBuf)>> {
    let mut segments = Vec::new();

    let entries = match fs::read_dir(ticker_dir) {
        Ok(entries) => entries,
        Err(_) => return Ok(segments),
    };

    for entry in entries {
        let entry =
            entry.map_err(|e| Error::Io(format!("Failed to read directory entry: {}", e)))?;
        let path = entry.path();
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if let Some(ordinal) = parse_segment_ordinal(name) {
            segments.push((ordinal, path));
        }
    }

    segments.sort_by_key(|(ordinal, _)| *ordinal);
    Ok(segments)
}

/// Path of the segment with the given ordinal.
pub fn segment_path(ticker_dir: &Path, ordinal: u64) -> PathBuf {
    ticker_dir.join(format!("{}{}.csv", SEGMENT_FILE_PREFIX, ordinal))
}

/// `data_12.csv` -> `Some(12)`, anything else -> `None`.
fn parse_segment_ordinal(name: &str) -> Option<u64> {
    name.strip_prefix(SEGMENT_FILE_PREFIX)?
        .strip_suffix(".csv")?
        .parse()
        .ok()
}

/// First-available-slot scan for the next segment filename.
fn next_available_segment(ticker_dir: &Path) -> PathBuf {
    let mut ordinal = 0;
    loop {
        let path = segment_path(ticker_dir, ordinal);
        if !path.exists() {
            return path;
        }
        ordinal += 1;
    }
}

/// One append operation. The header is written only when the target is new
/// or empty; appended batches never touch prior rows.
fn append_chunk(path: &Path, bars: &[Bar], write_header: bool) -> Result<()> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| Error::Io(format!("Failed to open {}: {}", path.display(), e)))?;

    let mut writer = csv::WriterBuilder::new()
        .has_headers(write_header)
        .from_writer(file);

    for bar in bars {
        writer
            .serialize(bar)
            .map_err(|e| Error::Io(format!("Failed to write row to {}: {}", path.display(), e)))?;
    }

    writer
        .flush()
        .map_err(|e| Error::Io(format!("Failed to flush {}: {}", path.display(), e)))?;

    Ok(())
}
