//! The browse command.

use crate::commands::Session;
use crate::db::PostRepository;
use crate::{GatorError, Result};

const DEFAULT_BROWSE_LIMIT: i64 = 2;

/// `gator browse [limit]`: print the newest posts from followed feeds.
pub async fn browse(session: &mut Session, args: &[String]) -> Result<()> {
    let limit = match args {
        [] => DEFAULT_BROWSE_LIMIT,
        [raw] => raw
            .parse::<i64>()
            .ok()
            .filter(|n| *n > 0)
            .ok_or_else(|| GatorError::Validation(format!("invalid limit '{raw}'")))?,
        _ => return Err(GatorError::Usage("browse [limit]")),
    };

    let user = session.require_user().await?;

    let posts = PostRepository::new(session.db.pool())
        .list_for_user(&user.id, limit)
        .await?;

    for post in &posts {
        println!("{} <{}>", post.title, post.url);
        println!("  published {}", post.published_at.format("%Y-%m-%d %H:%M"));
        if !post.description.is_empty() {
            println!("  {}", post.description);
        }
    }
    Ok(())
}
