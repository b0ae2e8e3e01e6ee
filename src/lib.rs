//! gator - a command-line RSS feed aggregator.
//!
//! Users register and log in, subscribe to feeds, follow each other's
//! feeds and browse ingested posts. The `agg` command runs a polling
//! loop that repeatedly fetches the stalest feed and stores its items,
//! deduplicating by (feed, url).

pub mod agg;
pub mod commands;
pub mod config;
pub mod datetime;
pub mod db;
pub mod error;
pub mod logging;

pub use config::Config;
pub use db::Database;
pub use error::{GatorError, Result};
