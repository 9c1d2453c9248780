//! Sequential sync driver: resolver -> fetch -> reconcile -> segment writer
//! for every (group, ticker) pair in the watchlist. Tickers are processed
//! independently; one ticker's failure never aborts the run.

use std::fs;
use std::thread;
use chrono::Utc;
use tracing::{debug, error, info};

use crate::error::{Error, Result};
use crate::models::{SyncConfig, SyncStats, Watchlist};
use crate::services::fetcher::{BarSource, FetchOutcome};
use crate::services::reconciler::reconcile;
use crate::services::resolver;
use crate::services::segment_writer::SegmentWriter;

/// Per-ticker result of one incremental update pass.
#[derive(Debug, PartialEq, Eq)]
pub enum TickerOutcome {
    /// Stored data already reaches the current time; no fetch was issued.
    UpToDate,
    /// Fetch succeeded but nothing new survived reconciliation.
    NoNewRows,
    /// New rows were appended.
    Updated { rows: usize },
}

pub struct DataSync<S: BarSource> {
    config: SyncConfig,
    source: S,
    writer: SegmentWriter,
    stats: SyncStats,
}

impl<S: BarSource> DataSync<S> {
    pub fn new(config: SyncConfig, source: S) -> Self {
        let writer = SegmentWriter::new(config.max_segment_bytes);
        Self {
            config,
            source,
            writer,
            stats: SyncStats::new(),
        }
    }

    /// Process every configured ticker once, pausing between requests.
    pub fn run(&mut self, watchlist: &Watchlist) -> &SyncStats {
        for group in &watchlist.groups {
            info!(
                group = group.label.as_str(),
                tickers = group.tickers.len(),
                "Processing group"
            );

            for ticker in &group.tickers {
                match self.sync_ticker(&group.label, ticker) {
                    Ok(TickerOutcome::Updated { rows }) => {
                        self.stats.updated += 1;
                        self.stats.rows_written += rows;
                        info!(
                            group = group.label.as_str(),
                            ticker = ticker.as_str(),
                            rows,
                            "Ticker updated"
                        );
                    }
                    Ok(TickerOutcome::UpToDate) => {
                        self.stats.up_to_date += 1;
                        info!(ticker = ticker.as_str(), "Already up to date");
                    }
                    Ok(TickerOutcome::NoNewRows) => {
                        self.stats.empty += 1;
                        info!(ticker = ticker.as_str(), "No new rows");
                    }
                    Err(e) => {
                        self.stats.failed += 1;
                        error!(ticker = ticker.as_str(), error = %e, "Ticker update failed");
                    }
                }

                thread::sleep(self.config.ticker_pause);
            }
        }

        &self.stats
    }

    /// One resolver -> fetch -> reconcile -> write pass for a single ticker.
    pub fn sync_ticker(&self, group: &str, ticker: &str) -> Result<TickerOutcome> {
        let ticker_dir = self.config.base_dir.join(group).join(ticker);
        fs::create_dir_all(&ticker_dir)
            .map_err(|e| Error::Io(format!("Failed to create {}: {}", ticker_dir.display(), e)))?;

        let resume_point = resolver::latest_timestamp(&ticker_dir);

        let end = Utc::now();
        let start = match resume_point {
            Some(last) => {
                debug!(ticker = ticker, last = %last, "Resuming from stored timestamp");
                last + self.config.interval.step()
            }
            None => {
                debug!(
                    ticker = ticker,
                    lookback_days = self.config.lookback_days,
                    "No stored data, fetching full lookback"
                );
                end - self.config.lookback()
            }
        };

        // Already current: skip the fetch entirely
        if start >= end {
            return Ok(TickerOutcome::UpToDate);
        }

        let bars = match self.source.fetch(ticker, start, end, self.config.interval) {
            FetchOutcome::Bars(bars) => bars,
            FetchOutcome::Empty => return Ok(TickerOutcome::NoNewRows),
            FetchOutcome::Failed(reason) => return Err(Error::Network(reason)),
        };

        let fresh = reconcile(bars, resume_point);
        if fresh.is_empty() {
            return Ok(TickerOutcome::NoNewRows);
        }

        self.writer.append(&ticker_dir, &fresh)?;
        Ok(TickerOutcome::Updated { rows: fresh.len() })
    }

    pub fn stats(&self) -> &SyncStats {
        &self.stats
    }
}
