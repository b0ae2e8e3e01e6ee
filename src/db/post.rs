//! Post repository for gator.
//!
//! Posts carry a UNIQUE(feed_id, url) constraint; `create` surfaces a
//! violation as `GatorError::Duplicate` so the ingestor can treat
//! re-ingestion of an already-seen item as a no-op.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::datetime::{format_timestamp, parse_timestamp};
use crate::db::DbPool;
use crate::{GatorError, Result};

/// One ingested article.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Post {
    pub id: String,
    pub feed_id: String,
    pub title: String,
    pub url: String,
    pub description: String,
    /// When the feed says the item was published.
    pub published_at: DateTime<Utc>,
    /// When gator ingested the item.
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A post to be inserted.
#[derive(Debug, Clone)]
pub struct NewPost {
    pub feed_id: String,
    pub title: String,
    pub url: String,
    pub description: String,
    pub published_at: DateTime<Utc>,
}

#[derive(Debug, Clone, sqlx::FromRow)]
struct PostRow {
    id: String,
    feed_id: String,
    title: String,
    url: String,
    description: String,
    published_at: String,
    created_at: String,
    updated_at: String,
}

impl From<PostRow> for Post {
    fn from(row: PostRow) -> Self {
        Post {
            id: row.id,
            feed_id: row.feed_id,
            title: row.title,
            url: row.url,
            description: row.description,
            published_at: parse_timestamp(&row.published_at).unwrap_or_else(Utc::now),
            created_at: parse_timestamp(&row.created_at).unwrap_or_else(Utc::now),
            updated_at: parse_timestamp(&row.updated_at).unwrap_or_else(Utc::now),
        }
    }
}

/// Repository for post operations.
pub struct PostRepository<'a> {
    pool: &'a DbPool,
}

impl<'a> PostRepository<'a> {
    /// Create a new repository instance.
    pub fn new(pool: &'a DbPool) -> Self {
        Self { pool }
    }

    /// Insert a post with a fresh identity and the current ingestion
    /// timestamp. An already-ingested (feed, url) pair surfaces as
    /// `GatorError::Duplicate`.
    pub async fn create(&self, post: &NewPost) -> Result<Post> {
        let id = Uuid::new_v4().to_string();
        let now = format_timestamp(&Utc::now());

        sqlx::query(
            "INSERT INTO posts (id, created_at, updated_at, title, url, description,
                                published_at, feed_id)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
        )
        .bind(&id)
        .bind(&now)
        .bind(&now)
        .bind(&post.title)
        .bind(&post.url)
        .bind(&post.description)
        .bind(format_timestamp(&post.published_at))
        .bind(&post.feed_id)
        .execute(self.pool)
        .await?;

        self.get_by_id(&id)
            .await?
            .ok_or_else(|| GatorError::NotFound("post".to_string()))
    }

    /// Get a post by ID.
    pub async fn get_by_id(&self, id: &str) -> Result<Option<Post>> {
        let row = sqlx::query_as::<_, PostRow>(
            "SELECT id, feed_id, title, url, description, published_at, created_at, updated_at
             FROM posts WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Post::from))
    }

    /// Most recent posts from feeds the user follows, newest published
    /// first.
    pub async fn list_for_user(&self, user_id: &str, limit: i64) -> Result<Vec<Post>> {
        let rows = sqlx::query_as::<_, PostRow>(
            "SELECT p.id, p.feed_id, p.title, p.url, p.description, p.published_at,
                    p.created_at, p.updated_at
             FROM posts p
             JOIN feed_follows ff ON ff.feed_id = p.feed_id
             WHERE ff.user_id = $1
             ORDER BY p.published_at DESC, p.id ASC
             LIMIT $2",
        )
        .bind(user_id)
        .bind(limit)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Post::from).collect())
    }

    /// Count posts for a feed.
    pub async fn count_by_feed(&self, feed_id: &str) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM posts WHERE feed_id = $1")
            .bind(feed_id)
            .fetch_one(self.pool)
            .await?;

        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{FeedRepository, FollowRepository, UserRepository};
    use crate::Database;
    use chrono::TimeZone;

    async fn setup_db() -> Database {
        Database::open_in_memory().await.unwrap()
    }

    async fn create_user_and_feed(db: &Database, url: &str) -> (String, String) {
        let users = UserRepository::new(db.pool());
        let user = match users.get_by_name("testuser").await.unwrap() {
            Some(user) => user,
            None => users.create("testuser").await.unwrap(),
        };
        let feed = FeedRepository::new(db.pool())
            .create("Example", url, &user.id)
            .await
            .unwrap();
        (user.id, feed.id)
    }

    fn sample_post(feed_id: &str, url: &str) -> NewPost {
        NewPost {
            feed_id: feed_id.to_string(),
            title: "First Article".to_string(),
            url: url.to_string(),
            description: "A description".to_string(),
            published_at: Utc.with_ymd_and_hms(2024, 1, 15, 10, 30, 0).unwrap(),
        }
    }

    #[tokio::test]
    async fn test_create_post() {
        let db = setup_db().await;
        let (_, feed_id) = create_user_and_feed(&db, "https://example.com/feed.xml").await;
        let repo = PostRepository::new(db.pool());

        let post = repo
            .create(&sample_post(&feed_id, "https://example.com/1"))
            .await
            .unwrap();

        assert_eq!(post.title, "First Article");
        assert_eq!(post.feed_id, feed_id);
        assert_eq!(
            post.published_at,
            Utc.with_ymd_and_hms(2024, 1, 15, 10, 30, 0).unwrap()
        );
    }

    #[tokio::test]
    async fn test_duplicate_post_rejected() {
        let db = setup_db().await;
        let (_, feed_id) = create_user_and_feed(&db, "https://example.com/feed.xml").await;
        let repo = PostRepository::new(db.pool());

        repo.create(&sample_post(&feed_id, "https://example.com/1"))
            .await
            .unwrap();
        let result = repo
            .create(&sample_post(&feed_id, "https://example.com/1"))
            .await;
        assert!(matches!(result, Err(GatorError::Duplicate(_))));
        assert_eq!(repo.count_by_feed(&feed_id).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_same_url_different_feed_allowed() {
        let db = setup_db().await;
        let (_, feed_a) = create_user_and_feed(&db, "https://a.example/feed").await;
        let (_, feed_b) = create_user_and_feed(&db, "https://b.example/feed").await;
        let repo = PostRepository::new(db.pool());

        repo.create(&sample_post(&feed_a, "https://example.com/1"))
            .await
            .unwrap();
        repo.create(&sample_post(&feed_b, "https://example.com/1"))
            .await
            .unwrap();

        assert_eq!(repo.count_by_feed(&feed_a).await.unwrap(), 1);
        assert_eq!(repo.count_by_feed(&feed_b).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_list_for_user_only_followed_feeds() {
        let db = setup_db().await;
        let (user_id, followed) = create_user_and_feed(&db, "https://a.example/feed").await;
        let (_, unfollowed) = create_user_and_feed(&db, "https://b.example/feed").await;
        let posts = PostRepository::new(db.pool());
        let follows = FollowRepository::new(db.pool());

        follows.create(&user_id, &followed).await.unwrap();

        posts
            .create(&sample_post(&followed, "https://example.com/1"))
            .await
            .unwrap();
        posts
            .create(&sample_post(&unfollowed, "https://example.com/2"))
            .await
            .unwrap();

        let listed = posts.list_for_user(&user_id, 10).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].feed_id, followed);
    }

    #[tokio::test]
    async fn test_list_for_user_newest_first_with_limit() {
        let db = setup_db().await;
        let (user_id, feed_id) = create_user_and_feed(&db, "https://a.example/feed").await;
        let posts = PostRepository::new(db.pool());
        let follows = FollowRepository::new(db.pool());

        follows.create(&user_id, &feed_id).await.unwrap();

        for day in 1..=3 {
            let mut post = sample_post(&feed_id, &format!("https://example.com/{day}"));
            post.published_at = Utc.with_ymd_and_hms(2024, 1, day, 0, 0, 0).unwrap();
            posts.create(&post).await.unwrap();
        }

        let listed = posts.list_for_user(&user_id, 2).await.unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].url, "https://example.com/3");
        assert_eq!(listed[1].url, "https://example.com/2");
    }
}
