//! Database schema migrations for gator.
//!
//! Each entry is one migration; the migration runner in `db::Database`
//! applies the pending ones in order and records the version.

pub const MIGRATIONS: &[&str] = &[
    // v1: users, feeds, follows
    r#"
    CREATE TABLE users (
        id          TEXT PRIMARY KEY,
        created_at  TEXT NOT NULL,
        updated_at  TEXT NOT NULL,
        name        TEXT NOT NULL UNIQUE
    );

    CREATE TABLE feeds (
        id              TEXT PRIMARY KEY,
        created_at      TEXT NOT NULL,
        updated_at      TEXT NOT NULL,
        name            TEXT NOT NULL,
        url             TEXT NOT NULL UNIQUE,
        user_id         TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
        last_fetched_at TEXT
    );

    CREATE INDEX idx_feeds_last_fetched_at ON feeds(last_fetched_at);

    CREATE TABLE feed_follows (
        id          TEXT PRIMARY KEY,
        created_at  TEXT NOT NULL,
        updated_at  TEXT NOT NULL,
        user_id     TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
        feed_id     TEXT NOT NULL REFERENCES feeds(id) ON DELETE CASCADE,
        UNIQUE(user_id, feed_id)
    );
    "#,
    // v2: ingested posts, deduplicated per feed by URL
    r#"
    CREATE TABLE posts (
        id           TEXT PRIMARY KEY,
        created_at   TEXT NOT NULL,
        updated_at   TEXT NOT NULL,
        title        TEXT NOT NULL,
        url          TEXT NOT NULL,
        description  TEXT NOT NULL,
        published_at TEXT NOT NULL,
        feed_id      TEXT NOT NULL REFERENCES feeds(id) ON DELETE CASCADE,
        UNIQUE(feed_id, url)
    );

    CREATE INDEX idx_posts_feed_id ON posts(feed_id);
    CREATE INDEX idx_posts_published_at ON posts(published_at);
    "#,
];
