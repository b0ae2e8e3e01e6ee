//! Feed-follow repository for gator.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::datetime::{format_timestamp, parse_timestamp};
use crate::db::DbPool;
use crate::{GatorError, Result};

/// A user's subscription to a feed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedFollow {
    pub id: String,
    pub user_id: String,
    pub feed_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A followed feed as listed for a user.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct FollowedFeed {
    pub feed_name: String,
    pub feed_url: String,
}

#[derive(Debug, Clone, sqlx::FromRow)]
struct FeedFollowRow {
    id: String,
    user_id: String,
    feed_id: String,
    created_at: String,
    updated_at: String,
}

impl From<FeedFollowRow> for FeedFollow {
    fn from(row: FeedFollowRow) -> Self {
        FeedFollow {
            id: row.id,
            user_id: row.user_id,
            feed_id: row.feed_id,
            created_at: parse_timestamp(&row.created_at).unwrap_or_else(Utc::now),
            updated_at: parse_timestamp(&row.updated_at).unwrap_or_else(Utc::now),
        }
    }
}

/// Repository for feed-follow operations.
pub struct FollowRepository<'a> {
    pool: &'a DbPool,
}

impl<'a> FollowRepository<'a> {
    /// Create a new repository instance.
    pub fn new(pool: &'a DbPool) -> Self {
        Self { pool }
    }

    /// Follow a feed. Following one twice surfaces as
    /// `GatorError::Duplicate`.
    pub async fn create(&self, user_id: &str, feed_id: &str) -> Result<FeedFollow> {
        let id = Uuid::new_v4().to_string();
        let now = format_timestamp(&Utc::now());

        sqlx::query(
            "INSERT INTO feed_follows (id, created_at, updated_at, user_id, feed_id)
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(&id)
        .bind(&now)
        .bind(&now)
        .bind(user_id)
        .bind(feed_id)
        .execute(self.pool)
        .await?;

        let row = sqlx::query_as::<_, FeedFollowRow>(
            "SELECT id, user_id, feed_id, created_at, updated_at FROM feed_follows WHERE id = $1",
        )
        .bind(&id)
        .fetch_optional(self.pool)
        .await?;

        row.map(FeedFollow::from)
            .ok_or_else(|| GatorError::NotFound("feed follow".to_string()))
    }

    /// Remove a user's follow of a feed. Returns false if there was none.
    pub async fn delete(&self, user_id: &str, feed_id: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM feed_follows WHERE user_id = $1 AND feed_id = $2")
            .bind(user_id)
            .bind(feed_id)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// List the feeds a user follows, oldest follow first.
    pub async fn list_for_user(&self, user_id: &str) -> Result<Vec<FollowedFeed>> {
        let rows = sqlx::query_as::<_, FollowedFeed>(
            "SELECT f.name AS feed_name, f.url AS feed_url
             FROM feed_follows ff
             JOIN feeds f ON f.id = ff.feed_id
             WHERE ff.user_id = $1
             ORDER BY ff.created_at ASC, ff.id ASC",
        )
        .bind(user_id)
        .fetch_all(self.pool)
        .await?;

        Ok(rows)
    }
}
