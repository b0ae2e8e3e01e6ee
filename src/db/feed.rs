//! Feed repository for gator.
//!
//! Besides plain CRUD this holds the two scheduling operations of the
//! ingestion pipeline: `next_to_fetch` (stalest feed first, never-fetched
//! feeds before all others) and `mark_fetched`.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::datetime::{format_timestamp, parse_timestamp};
use crate::db::DbPool;
use crate::{GatorError, Result};

/// A subscribed feed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Feed {
    pub id: String,
    pub name: String,
    pub url: String,
    /// Owning user.
    pub user_id: String,
    /// When the feed was last picked up by the ingestor; `None` means never.
    pub last_fetched_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A feed joined with its owner's name, for listing.
#[derive(Debug, Clone)]
pub struct FeedWithOwner {
    pub feed: Feed,
    pub owner_name: String,
}

#[derive(Debug, Clone, sqlx::FromRow)]
struct FeedRow {
    id: String,
    name: String,
    url: String,
    user_id: String,
    last_fetched_at: Option<String>,
    created_at: String,
    updated_at: String,
}

impl From<FeedRow> for Feed {
    fn from(row: FeedRow) -> Self {
        Feed {
            id: row.id,
            name: row.name,
            url: row.url,
            user_id: row.user_id,
            last_fetched_at: row.last_fetched_at.and_then(|s| parse_timestamp(&s)),
            created_at: parse_timestamp(&row.created_at).unwrap_or_else(Utc::now),
            updated_at: parse_timestamp(&row.updated_at).unwrap_or_else(Utc::now),
        }
    }
}

#[derive(Debug, Clone, sqlx::FromRow)]
struct FeedWithOwnerRow {
    id: String,
    name: String,
    url: String,
    user_id: String,
    last_fetched_at: Option<String>,
    created_at: String,
    updated_at: String,
    owner_name: String,
}

impl From<FeedWithOwnerRow> for FeedWithOwner {
    fn from(row: FeedWithOwnerRow) -> Self {
        let feed = Feed {
            id: row.id,
            name: row.name,
            url: row.url,
            user_id: row.user_id,
            last_fetched_at: row.last_fetched_at.and_then(|s| parse_timestamp(&s)),
            created_at: parse_timestamp(&row.created_at).unwrap_or_else(Utc::now),
            updated_at: parse_timestamp(&row.updated_at).unwrap_or_else(Utc::now),
        };
        FeedWithOwner {
            feed,
            owner_name: row.owner_name,
        }
    }
}

/// Repository for feed operations.
pub struct FeedRepository<'a> {
    pool: &'a DbPool,
}

impl<'a> FeedRepository<'a> {
    /// Create a new repository instance.
    pub fn new(pool: &'a DbPool) -> Self {
        Self { pool }
    }

    /// Create a feed. An already-subscribed URL surfaces as
    /// `GatorError::Duplicate`.
    pub async fn create(&self, name: &str, url: &str, user_id: &str) -> Result<Feed> {
        let id = Uuid::new_v4().to_string();
        let now = format_timestamp(&Utc::now());

        sqlx::query(
            "INSERT INTO feeds (id, created_at, updated_at, name, url, user_id)
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(&id)
        .bind(&now)
        .bind(&now)
        .bind(name)
        .bind(url)
        .bind(user_id)
        .execute(self.pool)
        .await?;

        self.get_by_id(&id)
            .await?
            .ok_or_else(|| GatorError::NotFound("feed".to_string()))
    }

    /// Get a feed by ID.
    pub async fn get_by_id(&self, id: &str) -> Result<Option<Feed>> {
        let row = sqlx::query_as::<_, FeedRow>(
            "SELECT id, name, url, user_id, last_fetched_at, created_at, updated_at
             FROM feeds WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Feed::from))
    }

    /// Get a feed by URL.
    pub async fn get_by_url(&self, url: &str) -> Result<Option<Feed>> {
        let row = sqlx::query_as::<_, FeedRow>(
            "SELECT id, name, url, user_id, last_fetched_at, created_at, updated_at
             FROM feeds WHERE url = $1",
        )
        .bind(url)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Feed::from))
    }

    /// List every feed with its owner's name, in subscription order.
    pub async fn list_with_owners(&self) -> Result<Vec<FeedWithOwner>> {
        let rows = sqlx::query_as::<_, FeedWithOwnerRow>(
            "SELECT f.id, f.name, f.url, f.user_id, f.last_fetched_at,
                    f.created_at, f.updated_at, u.name AS owner_name
             FROM feeds f
             JOIN users u ON u.id = f.user_id
             ORDER BY f.created_at ASC, f.id ASC",
        )
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(FeedWithOwner::from).collect())
    }

    /// Select the feed due for the next fetch: oldest `last_fetched_at`
    /// first, with never-fetched feeds ahead of all others.
    pub async fn next_to_fetch(&self) -> Result<Option<Feed>> {
        let row = sqlx::query_as::<_, FeedRow>(
            "SELECT id, name, url, user_id, last_fetched_at, created_at, updated_at
             FROM feeds
             ORDER BY last_fetched_at IS NOT NULL, last_fetched_at ASC, id ASC
             LIMIT 1",
        )
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Feed::from))
    }

    /// Record that a feed was picked up for fetching at `fetched_at`.
    pub async fn mark_fetched(&self, id: &str, fetched_at: DateTime<Utc>) -> Result<()> {
        let stamp = format_timestamp(&fetched_at);

        let result =
            sqlx::query("UPDATE feeds SET last_fetched_at = $1, updated_at = $1 WHERE id = $2")
                .bind(&stamp)
                .bind(id)
                .execute(self.pool)
                .await?;

        if result.rows_affected() == 0 {
            return Err(GatorError::NotFound("feed".to_string()));
        }
        Ok(())
    }
}
