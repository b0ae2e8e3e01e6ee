//! One fetch-and-store cycle of the aggregation pipeline.
//!
//! Each cycle picks the stalest feed, marks it fetched, downloads it and
//! stores whatever items it can. A bad publish date skips that one item;
//! already-seen items are counted, not errors.

use chrono::Utc;
use thiserror::Error;
use tracing::{debug, warn};

use crate::agg::fetcher::{FeedFetcher, FetchError, RawFeed};
use crate::datetime::{parse_flexible, DateFormatError};
use crate::db::{Feed, FeedRepository, NewPost, PostRepository};
use crate::{Database, GatorError};

/// Why a cycle could not complete.
#[derive(Error, Debug)]
pub enum IngestError {
    /// No feeds are registered. Reportable, not fatal.
    #[error("no feeds to fetch")]
    NoFeeds,

    /// The feed could not be downloaded or decoded.
    #[error("fetching {url}")]
    Fetch {
        url: String,
        #[source]
        source: FetchError,
    },

    /// The store rejected something other than a duplicate.
    #[error(transparent)]
    Store(#[from] GatorError),
}

/// An item left out of a cycle, with the date error that caused it.
#[derive(Debug)]
pub struct SkippedItem {
    pub title: String,
    pub reason: DateFormatError,
}

/// What one cycle did.
#[derive(Debug)]
pub struct IngestReport {
    pub feed_name: String,
    pub feed_url: String,
    pub items_seen: usize,
    pub items_inserted: usize,
    pub items_already_seen: usize,
    pub skipped: Vec<SkippedItem>,
}

/// Run one cycle: pick the stalest feed, fetch it, store its items.
pub async fn ingest_one_cycle(
    db: &Database,
    fetcher: &FeedFetcher,
) -> Result<IngestReport, IngestError> {
    let feeds = FeedRepository::new(db.pool());

    let feed = feeds.next_to_fetch().await?.ok_or(IngestError::NoFeeds)?;

    // Mark before fetching so a slow or dead feed does not win the next
    // tick too.
    feeds.mark_fetched(&feed.id, Utc::now()).await?;

    let raw = fetcher
        .fetch(&feed.url)
        .await
        .map_err(|source| IngestError::Fetch {
            url: feed.url.clone(),
            source,
        })?;

    store_items(db, &feed, &raw).await
}

/// Store the items of a fetched document against `feed`.
pub async fn store_items(
    db: &Database,
    feed: &Feed,
    raw: &RawFeed,
) -> Result<IngestReport, IngestError> {
    let posts = PostRepository::new(db.pool());

    let mut report = IngestReport {
        feed_name: feed.name.clone(),
        feed_url: feed.url.clone(),
        items_seen: raw.items.len(),
        items_inserted: 0,
        items_already_seen: 0,
        skipped: Vec::new(),
    };

    for item in &raw.items {
        let published_at = match parse_flexible(&item.pub_date) {
            Ok(dt) => dt,
            Err(reason) => {
                warn!(
                    feed = %feed.name,
                    item = %item.title,
                    %reason,
                    "skipping item with unparseable publish date"
                );
                report.skipped.push(SkippedItem {
                    title: item.title.clone(),
                    reason,
                });
                continue;
            }
        };

        let new_post = NewPost {
            feed_id: feed.id.clone(),
            title: item.title.clone(),
            url: item.link.clone(),
            description: item.description.clone(),
            published_at,
        };

        match posts.create(&new_post).await {
            Ok(_) => report.items_inserted += 1,
            Err(GatorError::Duplicate(_)) => {
                debug!(feed = %feed.name, url = %item.link, "item already stored");
                report.items_already_seen += 1;
            }
            Err(e) => return Err(IngestError::Store(e)),
        }
    }

    Ok(report)
}
