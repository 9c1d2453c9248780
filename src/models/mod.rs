mod bar;
mod sync_config;
mod watchlist;

pub use bar::Bar;
pub use sync_config::{Interval, SyncConfig, SyncStats};
pub use watchlist::{WatchGroup, Watchlist};
