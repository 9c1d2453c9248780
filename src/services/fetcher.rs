//! Fetch Adapter
//!
//! Wraps the external provider behind a trait seam so the orchestrator can
//! be driven by a mock in tests, and folds every provider-side failure into
//! a tagged outcome so per-ticker continuation is a plain branch.

use chrono::{DateTime, Utc};

use crate::error::Result;
use crate::models::{Bar, Interval};
use crate::services::yahoo::YahooClient;

/// Outcome of one provider fetch.
#[derive(Debug, Clone)]
pub enum FetchOutcome {
    /// New rows covering the requested window.
    Bars(Vec<Bar>),
    /// The provider had nothing for the window.
    Empty,
    /// Provider-side failure (network, invalid symbol, rate limit).
    /// Aborts this ticker only, never the run.
    Failed(String),
}

/// Source of bars for a ticker over a half-open UTC window.
pub trait BarSource {
    fn fetch(
        &self,
        symbol: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        interval: Interval,
    ) -> FetchOutcome;
}

/// Production source backed by the Yahoo chart API.
pub struct ProviderSource {
    client: YahooClient,
}

impl ProviderSource {
    pub fn new() -> Result<Self> {
        Ok(Self {
            client: YahooClient::new()?,
        })
    }

    pub fn with_client(client: YahooClient) -> Self {
        Self { client }
    }
}

impl BarSource for ProviderSource {
    fn fetch(
        &self,
        symbol: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        interval: Interval,
    ) -> FetchOutcome {
        match self.client.fetch_bars(symbol, start, end, interval) {
            Ok(bars) if bars.is_empty() => FetchOutcome::Empty,
            Ok(bars) => FetchOutcome::Bars(bars),
            Err(e) => FetchOutcome::Failed(e.to_string()),
        }
    }
}
