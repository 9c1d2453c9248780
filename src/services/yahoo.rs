//! Client for the Yahoo Finance chart API.

use chrono::{DateTime, Utc};
use reqwest::blocking::Client;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

use crate::error::{Error, Result};
use crate::models::{Bar, Interval};

const DEFAULT_BASE_URL: &str = "https://query1.finance.yahoo.com";

/// The chart endpoint rejects requests without a browser-looking agent.
const USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0 Safari/537.36";

pub struct YahooClient {
    base_url: String,
    client: Client,
}

impl YahooClient {
    /// Create a client against the production endpoint.
    pub fn new() -> Result<Self> {
        Self::with_base_url(DEFAULT_BASE_URL.to_string())
    }

    /// Create a client against a custom endpoint (mock servers in tests).
    pub fn with_base_url(base_url: String) -> Result<Self> {
        let base_url = base_url.trim().trim_end_matches('/').to_string();

        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            return Err(Error::Config(format!(
                "Invalid base_url: must start with http:// or https://, got: '{}'",
                base_url
            )));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| Error::Network(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { base_url, client })
    }

    /// Fetch bars for `symbol` over the half-open window `[start, end)`.
    ///
    /// An empty vector means the provider had no trades in the window; all
    /// transport and payload problems surface as errors.
    pub fn fetch_bars(
        &self,
        symbol: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        interval: Interval,
    ) -> Result<Vec<Bar>> {
        let url = format!(
            "{}/v8/finance/chart/{}?period1={}&period2={}&interval={}",
            self.base_url,
            symbol,
            start.timestamp(),
            end.timestamp(),
            interval.to_provider_format()
        );

        debug!(symbol = symbol, url = %url, "Requesting chart data");

        let response = self
            .client
            .get(&url)
            .send()
            .map_err(|e| Error::Network(format!("Request failed for {}: {}", symbol, e)))?;

        if !response.status().is_success() {
            return Err(Error::Network(format!(
                "Provider returned {} for {}",
                response.status(),
                symbol
            )));
        }

        let payload: Value = response
            .json()
            .map_err(|e| Error::Parse(format!("Invalid JSON for {}: {}", symbol, e)))?;

        parse_chart_payload(&payload, symbol)
    }
}

/// Decode a chart payload into bars.
///
/// Timestamps are epoch seconds (inherently UTC). Entries whose OHLC values
/// are null are gaps in trading and are skipped; a null volume becomes 0.
fn parse_chart_payload(payload: &Value, symbol: &str) -> Result<Vec<Bar>> {
    if let Some(err) = payload.pointer("/chart/error") {
        if !err.is_null() {
            return Err(Error::Network(format!(
                "Provider error for {}: {}",
                symbol, err
            )));
        }
    }

    let result = payload
        .pointer("/chart/result/0")
        .ok_or_else(|| Error::Parse(format!("Missing chart result for {}", symbol)))?;

    // No timestamp array means no trades in the requested window
    let Some(timestamps) = result.get("timestamp").and_then(Value::as_array) else {
        return Ok(Vec::new());
    };

    let quote = result
        .pointer("/indicators/quote/0")
        .ok_or_else(|| Error::Parse(format!("Missing quote data for {}", symbol)))?;

    let series = |field: &str| -> Vec<Value> {
        quote
            .get(field)
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default()
    };

    let opens = series("open");
    let highs = series("high");
    let lows = series("low");
    let closes = series("close");
    let volumes = series("volume");

    let mut bars = Vec::with_capacity(timestamps.len());
    for (i, ts) in timestamps.iter().enumerate() {
        let Some(secs) = ts.as_i64() else {
            continue;
        };
        let Some(time) = DateTime::from_timestamp(secs, 0) else {
            continue;
        };

        let (Some(open), Some(high), Some(low), Some(close)) = (
            value_at(&opens, i),
            value_at(&highs, i),
            value_at(&lows, i),
            value_at(&closes, i),
        ) else {
            continue;
        };

        let volume = volumes.get(i).and_then(Value::as_u64).unwrap_or(0);

        bars.push(Bar::new(time, open, high, low, close, volume));
    }

    Ok(bars)
}

fn value_at(series: &[Value], idx: usize) -> Option<f64> {
    series.get(idx).and_then(Value::as_f64)
}
