//! Feed commands: addfeed, feeds, follow, following, unfollow.

use tracing::info;
use url::Url;

use crate::commands::Session;
use crate::db::{FeedRepository, FollowRepository};
use crate::{GatorError, Result};

fn validate_feed_url(raw: &str) -> Result<()> {
    let parsed =
        Url::parse(raw).map_err(|e| GatorError::Validation(format!("invalid URL '{raw}': {e}")))?;
    match parsed.scheme() {
        "http" | "https" => Ok(()),
        other => Err(GatorError::Validation(format!(
            "unsupported URL scheme '{other}'; expected http or https"
        ))),
    }
}

/// `gator addfeed <name> <url>`: subscribe a feed and follow it.
pub async fn addfeed(session: &mut Session, args: &[String]) -> Result<()> {
    let [name, url] = args else {
        return Err(GatorError::Usage("addfeed <name> <url>"));
    };
    validate_feed_url(url)?;

    let user = session.require_user().await?;

    let feed = match FeedRepository::new(session.db.pool())
        .create(name, url, &user.id)
        .await
    {
        Ok(feed) => feed,
        Err(GatorError::Duplicate(_)) => {
            return Err(GatorError::Validation(format!(
                "a feed with URL '{url}' already exists"
            )));
        }
        Err(e) => return Err(e),
    };

    // The creator follows their own feed.
    FollowRepository::new(session.db.pool())
        .create(&user.id, &feed.id)
        .await?;

    info!(feed = %feed.name, url = %feed.url, "feed added");
    println!("feed '{}' added: {}", feed.name, feed.url);
    Ok(())
}

/// `gator feeds`: list every feed with its owner.
pub async fn feeds(session: &Session) -> Result<()> {
    let feeds = FeedRepository::new(session.db.pool())
        .list_with_owners()
        .await?;

    for entry in &feeds {
        println!(
            "* {} ({}) added by {}",
            entry.feed.name, entry.feed.url, entry.owner_name
        );
    }
    Ok(())
}

/// `gator follow <url>`: follow an existing feed.
pub async fn follow(session: &mut Session, args: &[String]) -> Result<()> {
    let [url] = args else {
        return Err(GatorError::Usage("follow <url>"));
    };

    let user = session.require_user().await?;

    let feed = FeedRepository::new(session.db.pool())
        .get_by_url(url)
        .await?
        .ok_or_else(|| GatorError::NotFound(format!("feed '{url}'")))?;

    match FollowRepository::new(session.db.pool())
        .create(&user.id, &feed.id)
        .await
    {
        Ok(_) => {
            println!("{} is now following '{}'", user.name, feed.name);
            Ok(())
        }
        Err(GatorError::Duplicate(_)) => Err(GatorError::Validation(format!(
            "already following '{}'",
            feed.name
        ))),
        Err(e) => Err(e),
    }
}

/// `gator following`: list the feeds the current user follows.
pub async fn following(session: &mut Session) -> Result<()> {
    let user = session.require_user().await?;

    let followed = FollowRepository::new(session.db.pool())
        .list_for_user(&user.id)
        .await?;

    for feed in &followed {
        println!("* {} ({})", feed.feed_name, feed.feed_url);
    }
    Ok(())
}

/// `gator unfollow <url>`: stop following a feed.
pub async fn unfollow(session: &mut Session, args: &[String]) -> Result<()> {
    let [url] = args else {
        return Err(GatorError::Usage("unfollow <url>"));
    };

    let user = session.require_user().await?;

    let feed = FeedRepository::new(session.db.pool())
        .get_by_url(url)
        .await?
        .ok_or_else(|| GatorError::NotFound(format!("feed '{url}'")))?;

    let removed = FollowRepository::new(session.db.pool())
        .delete(&user.id, &feed.id)
        .await?;
    if !removed {
        return Err(GatorError::Validation(format!(
            "not following '{}'",
            feed.name
        )));
    }

    println!("{} unfollowed '{}'", user.name, feed.name);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::user::register;
    use crate::{Config, Database};

    async fn logged_in_session() -> (Session, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let mut session = Session {
            db: Database::open_in_memory().await.unwrap(),
            config: Config::default(),
            config_path: dir.path().join(".gatorconfig.json"),
        };
        register(&mut session, &["alice".to_string()]).await.unwrap();
        (session, dir)
    }

    fn args(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn test_addfeed_creates_and_follows() {
        let (mut session, _dir) = logged_in_session().await;

        addfeed(&mut session, &args(&["Blog", "https://example.com/feed.xml"]))
            .await
            .unwrap();

        let feed = FeedRepository::new(session.db.pool())
            .get_by_url("https://example.com/feed.xml")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(feed.name, "Blog");

        let user = session.require_user().await.unwrap();
        let followed = FollowRepository::new(session.db.pool())
            .list_for_user(&user.id)
            .await
            .unwrap();
        assert_eq!(followed.len(), 1);
        assert_eq!(followed[0].feed_name, "Blog");
    }

    #[tokio::test]
    async fn test_addfeed_rejects_bad_url() {
        let (mut session, _dir) = logged_in_session().await;

        let result = addfeed(&mut session, &args(&["Blog", "not a url"])).await;
        assert!(matches!(result, Err(GatorError::Validation(_))));

        let result = addfeed(&mut session, &args(&["Blog", "ftp://example.com/feed"])).await;
        assert!(matches!(result, Err(GatorError::Validation(_))));
    }

    #[tokio::test]
    async fn test_addfeed_requires_login() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = Session {
            db: Database::open_in_memory().await.unwrap(),
            config: Config::default(),
            config_path: dir.path().join(".gatorconfig.json"),
        };

        let result = addfeed(&mut session, &args(&["Blog", "https://example.com/feed"])).await;
        assert!(matches!(result, Err(GatorError::Auth(_))));
    }

    #[tokio::test]
    async fn test_addfeed_duplicate_url() {
        let (mut session, _dir) = logged_in_session().await;

        addfeed(&mut session, &args(&["A", "https://example.com/feed"]))
            .await
            .unwrap();
        let result = addfeed(&mut session, &args(&["B", "https://example.com/feed"])).await;
        assert!(matches!(result, Err(GatorError::Validation(_))));
    }

    #[tokio::test]
    async fn test_follow_and_unfollow() {
        let (mut session, _dir) = logged_in_session().await;

        addfeed(&mut session, &args(&["Blog", "https://example.com/feed"]))
            .await
            .unwrap();

        // A second user follows, then unfollows.
        register(&mut session, &["bob".to_string()]).await.unwrap();

        follow(&mut session, &args(&["https://example.com/feed"]))
            .await
            .unwrap();

        let bob = session.require_user().await.unwrap();
        let followed = FollowRepository::new(session.db.pool())
            .list_for_user(&bob.id)
            .await
            .unwrap();
        assert_eq!(followed.len(), 1);

        unfollow(&mut session, &args(&["https://example.com/feed"]))
            .await
            .unwrap();
        let followed = FollowRepository::new(session.db.pool())
            .list_for_user(&bob.id)
            .await
            .unwrap();
        assert!(followed.is_empty());
    }

    #[tokio::test]
    async fn test_follow_unknown_feed() {
        let (mut session, _dir) = logged_in_session().await;

        let result = follow(&mut session, &args(&["https://nope.example/feed"])).await;
        assert!(matches!(result, Err(GatorError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_follow_twice() {
        let (mut session, _dir) = logged_in_session().await;

        addfeed(&mut session, &args(&["Blog", "https://example.com/feed"]))
            .await
            .unwrap();
        // addfeed already follows; a second follow is an error.
        let result = follow(&mut session, &args(&["https://example.com/feed"])).await;
        assert!(matches!(result, Err(GatorError::Validation(_))));
    }

    #[tokio::test]
    async fn test_unfollow_not_followed() {
        let (mut session, _dir) = logged_in_session().await;

        addfeed(&mut session, &args(&["Blog", "https://example.com/feed"]))
            .await
            .unwrap();
        register(&mut session, &["bob".to_string()]).await.unwrap();

        let result = unfollow(&mut session, &args(&["https://example.com/feed"])).await;
        assert!(matches!(result, Err(GatorError::Validation(_))));
    }
}
