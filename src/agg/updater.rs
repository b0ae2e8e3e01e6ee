//! Periodic aggregation loop.
//!
//! Fires one cycle immediately, then one per tick. Cycles never overlap;
//! if a cycle outruns the period the next tick is simply late. Ctrl-C
//! stops the loop between cycles.

use std::time::Duration;

use tokio::time::{interval, MissedTickBehavior};
use tracing::{error, info};

use crate::agg::fetcher::FeedFetcher;
use crate::agg::ingest::{ingest_one_cycle, IngestError};
use crate::{Database, Result};

/// Drives the fetch-and-store loop at a fixed period.
pub struct Aggregator<'a> {
    db: &'a Database,
    fetcher: FeedFetcher,
    period: Duration,
}

impl<'a> Aggregator<'a> {
    pub fn new(db: &'a Database, period: Duration) -> Result<Self> {
        Ok(Self {
            db,
            fetcher: FeedFetcher::new()?,
            period,
        })
    }

    /// Run until interrupted.
    pub async fn run(&self) -> Result<()> {
        info!(
            period = %humantime::format_duration(self.period),
            "collecting feeds"
        );

        let mut timer = interval(self.period);
        timer.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = timer.tick() => self.run_cycle().await,
                _ = tokio::signal::ctrl_c() => {
                    info!("interrupted, stopping aggregation");
                    return Ok(());
                }
            }
        }
    }

    async fn run_cycle(&self) {
        match ingest_one_cycle(self.db, &self.fetcher).await {
            Ok(report) => {
                info!(
                    feed = %report.feed_name,
                    url = %report.feed_url,
                    seen = report.items_seen,
                    inserted = report.items_inserted,
                    already_seen = report.items_already_seen,
                    skipped = report.skipped.len(),
                    "feed collected"
                );
            }
            Err(IngestError::NoFeeds) => {
                info!("no feeds to fetch yet");
            }
            Err(e) => {
                // One bad cycle never stops the loop.
                error!(error = %e, "aggregation cycle failed");
            }
        }
    }
}
