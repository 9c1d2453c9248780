use std::fs;
use std::process;
use tracing::{error, info, warn};

use barsync::models::{SyncConfig, Watchlist};
use barsync::services::{DataSync, ProviderSource};
use barsync::utils::get_watchlist_path;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let watchlist_path = get_watchlist_path();
    let watchlist = match Watchlist::from_file(&watchlist_path) {
        Ok(watchlist) => watchlist,
        Err(e) => {
            error!(path = %watchlist_path.display(), error = %e, "Cannot load watchlist");
            process::exit(1);
        }
    };

    if watchlist.groups.is_empty() {
        warn!(path = %watchlist_path.display(), "Watchlist has no usable entries, nothing to do");
        return;
    }

    let config = SyncConfig::default();
    if let Err(e) = fs::create_dir_all(&config.base_dir) {
        error!(dir = %config.base_dir.display(), error = %e, "Cannot create base data directory");
        process::exit(1);
    }

    let source = match ProviderSource::new() {
        Ok(source) => source,
        Err(e) => {
            error!(error = %e, "Cannot create provider client");
            process::exit(1);
        }
    };

    info!(
        groups = watchlist.groups.len(),
        tickers = watchlist.ticker_count(),
        base_dir = %config.base_dir.display(),
        "Starting incremental bar sync"
    );

    let mut sync = DataSync::new(config, source);
    let stats = sync.run(&watchlist);

    // Per-ticker failures are reported above; the run itself still completed
    info!(
        updated = stats.updated,
        up_to_date = stats.up_to_date,
        empty = stats.empty,
        failed = stats.failed,
        rows = stats.rows_written,
        "Sync complete"
    );
}
