pub mod data_sync;
pub mod fetcher;
pub mod reconciler;
pub mod resolver;
pub mod segment_writer;
pub mod yahoo;

pub use data_sync::{DataSync, TickerOutcome};
pub use fetcher::{BarSource, FetchOutcome, ProviderSource};
pub use reconciler::reconcile;
pub use resolver::latest_timestamp;
pub use segment_writer::SegmentWriter;
pub use yahoo::YahooClient;
