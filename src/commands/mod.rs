//! CLI command dispatch.
//!
//! Commands that act on behalf of a user resolve the logged-in user up
//! front via [`Session::require_user`]; there is no implicit ambient user.

mod agg;
mod feed;
mod post;
mod user;

use std::path::PathBuf;

use crate::db::{User, UserRepository};
use crate::{Config, Database, GatorError, Result};

/// Everything a command handler needs: the open database and the mutable
/// CLI configuration with the path it persists to.
pub struct Session {
    pub db: Database,
    pub config: Config,
    pub config_path: PathBuf,
}

impl Session {
    /// Resolve the logged-in user, or fail if nobody is.
    pub async fn require_user(&self) -> Result<User> {
        let name = self
            .config
            .current_user_name
            .as_deref()
            .ok_or_else(|| {
                GatorError::Auth("no user logged in; run gator login <name>".to_string())
            })?;

        UserRepository::new(self.db.pool())
            .get_by_name(name)
            .await?
            .ok_or_else(|| GatorError::NotFound(format!("user '{name}'")))
    }
}

/// A parsed command invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    pub name: String,
    pub args: Vec<String>,
}

impl Command {
    /// Split raw CLI arguments into a command name and its arguments.
    /// Returns `None` when no command was given.
    pub fn from_args(mut args: Vec<String>) -> Option<Self> {
        if args.is_empty() {
            return None;
        }
        let name = args.remove(0);
        Some(Self { name, args })
    }
}

/// Dispatch a command against the session.
pub async fn run(session: &mut Session, cmd: &Command) -> Result<()> {
    match cmd.name.as_str() {
        "register" => user::register(session, &cmd.args).await,
        "login" => user::login(session, &cmd.args).await,
        "users" => user::users(session).await,
        "reset" => user::reset(session).await,
        "addfeed" => feed::addfeed(session, &cmd.args).await,
        "feeds" => feed::feeds(session).await,
        "follow" => feed::follow(session, &cmd.args).await,
        "following" => feed::following(session).await,
        "unfollow" => feed::unfollow(session, &cmd.args).await,
        "browse" => post::browse(session, &cmd.args).await,
        "agg" => agg::agg(session, &cmd.args).await,
        _ => Err(GatorError::UnknownCommand(cmd.name.clone())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_args_splits_name_and_args() {
        let cmd = Command::from_args(vec![
            "addfeed".to_string(),
            "Blog".to_string(),
            "https://example.com/feed".to_string(),
        ])
        .unwrap();
        assert_eq!(cmd.name, "addfeed");
        assert_eq!(cmd.args, vec!["Blog", "https://example.com/feed"]);
    }

    #[test]
    fn test_from_args_empty() {
        assert!(Command::from_args(vec![]).is_none());
    }

    #[tokio::test]
    async fn test_require_user_without_login() {
        let db = Database::open_in_memory().await.unwrap();
        let session = Session {
            db,
            config: Config::default(),
            config_path: PathBuf::from("/nonexistent/.gatorconfig.json"),
        };

        let result = session.require_user().await;
        assert!(matches!(result, Err(GatorError::Auth(_))));
    }

    #[tokio::test]
    async fn test_require_user_with_stale_login() {
        let db = Database::open_in_memory().await.unwrap();
        let session = Session {
            db,
            config: Config {
                db_url: "sqlite::memory:".to_string(),
                current_user_name: Some("ghost".to_string()),
            },
            config_path: PathBuf::from("/nonexistent/.gatorconfig.json"),
        };

        let result = session.require_user().await;
        assert!(matches!(result, Err(GatorError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_unknown_command() {
        let db = Database::open_in_memory().await.unwrap();
        let mut session = Session {
            db,
            config: Config::default(),
            config_path: PathBuf::from("/nonexistent/.gatorconfig.json"),
        };

        let cmd = Command {
            name: "frobnicate".to_string(),
            args: vec![],
        };
        let result = run(&mut session, &cmd).await;
        assert!(matches!(result, Err(GatorError::UnknownCommand(_))));
    }
}
