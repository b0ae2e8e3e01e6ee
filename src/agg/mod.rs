//! Feed aggregation: fetching, ingestion and the periodic loop.

pub mod fetcher;
pub mod ingest;
pub mod updater;

pub use fetcher::{FeedFetcher, FetchError, RawFeed, RawItem};
pub use ingest::{ingest_one_cycle, store_items, IngestError, IngestReport, SkippedItem};
pub use updater::Aggregator;
