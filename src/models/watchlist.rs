use std::fs;
use std::path::Path;
use tracing::warn;

use crate::error::{Error, Result};

/// One configured group of ticker symbols.
#[derive(Debug, Clone, PartialEq)]
pub struct WatchGroup {
    pub label: String,
    pub tickers: Vec<String>,
}

/// Ticker groups parsed from the line-oriented watchlist file, in file order.
///
/// The format is `group_label: SYM1, SYM2, ...` per line. Blank lines and
/// lines starting with `#` are ignored; malformed lines are skipped with a
/// warning rather than failing the load.
#[derive(Debug, Clone, Default)]
pub struct Watchlist {
    pub groups: Vec<WatchGroup>,
}

impl Watchlist {
    /// Load the watchlist from a file. A missing or unreadable file is fatal.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("Failed to read watchlist {}: {}", path.display(), e))
        })?;
        Ok(Self::parse(&content))
    }

    /// Parse watchlist content, skipping malformed lines.
    pub fn parse(content: &str) -> Self {
        let mut groups = Vec::new();

        for line in content.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let Some((label, tickers_str)) = line.split_once(':') else {
                warn!(line = line, "Skipping malformed watchlist line");
                continue;
            };

            let label = label.trim();
            let tickers: Vec<String> = tickers_str
                .split(',')
                .map(|t| t.trim().to_string())
                .filter(|t| !t.is_empty())
                .collect();

            if label.is_empty() || tickers.is_empty() {
                warn!(line = line, "Skipping malformed watchlist line");
                continue;
            }

            groups.push(WatchGroup {
                label: label.to_string(),
                tickers,
            });
        }

        Self { groups }
    }

    /// Total number of ticker entries across all groups.
    pub fn ticker_count(&self) -> usize {
        self.groups.iter().map(|g| g.tickers.len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_groups_in_file_order() {
        let content = "tech: AAPL, MSFT\netf: SPY\n";
        let watchlist = Watchlist::parse(content);

        assert_eq!(watchlist.groups.len(), 2);
        assert_eq!(watchlist.groups[0].label, "tech");
        assert_eq!(watchlist.groups[0].tickers, vec!["AAPL", "MSFT"]);
        assert_eq!(watchlist.groups[1].label, "etf");
        assert_eq!(watchlist.groups[1].tickers, vec!["SPY"]);
        assert_eq!(watchlist.ticker_count(), 3);
    }

    #[test]
    fn test_parse_ignores_comments_and_blank_lines() {
        let content = "# watchlist\n\ntech: AAPL\n   \n# trailing comment\n";
        let watchlist = Watchlist::parse(content);

        assert_eq!(watchlist.groups.len(), 1);
        assert_eq!(watchlist.groups[0].tickers, vec!["AAPL"]);
    }

    #[test]
    fn test_parse_skips_malformed_lines() {
        let content = "no separator here\ntech: AAPL\n: MSFT\nempty:\n";
        let watchlist = Watchlist::parse(content);

        assert_eq!(watchlist.groups.len(), 1);
        assert_eq!(watchlist.groups[0].label, "tech");
    }

    #[test]
    fn test_parse_drops_empty_ticker_entries() {
        let content = "tech: AAPL,, MSFT ,\n";
        let watchlist = Watchlist::parse(content);

        assert_eq!(watchlist.groups[0].tickers, vec!["AAPL", "MSFT"]);
    }

    #[test]
    fn test_from_file_missing_is_fatal() {
        let result = Watchlist::from_file("definitely/not/a/real/watchlist.txt");
        assert!(matches!(result, Err(Error::Config(_))));
    }
}
