//! User account commands: register, login, users, reset.

use tracing::info;

use crate::commands::Session;
use crate::db::UserRepository;
use crate::{GatorError, Result};

/// `gator register <name>`: create the user and log them in.
pub async fn register(session: &mut Session, args: &[String]) -> Result<()> {
    let [name] = args else {
        return Err(GatorError::Usage("register <name>"));
    };

    let users = UserRepository::new(session.db.pool());
    let user = match users.create(name).await {
        Ok(user) => user,
        Err(GatorError::Duplicate(_)) => {
            return Err(GatorError::Validation(format!(
                "user '{name}' already exists"
            )));
        }
        Err(e) => return Err(e),
    };

    session.config.set_user(name, &session.config_path)?;
    info!(user = %user.name, id = %user.id, "user registered");
    println!("user '{name}' was created");
    Ok(())
}

/// `gator login <name>`: switch the current user.
pub async fn login(session: &mut Session, args: &[String]) -> Result<()> {
    let [name] = args else {
        return Err(GatorError::Usage("login <name>"));
    };

    let users = UserRepository::new(session.db.pool());
    if users.get_by_name(name).await?.is_none() {
        return Err(GatorError::NotFound(format!("user '{name}'")));
    }

    session.config.set_user(name, &session.config_path)?;
    println!("user has been set to '{name}'");
    Ok(())
}

/// `gator users`: list all users, flagging the current one.
pub async fn users(session: &Session) -> Result<()> {
    let users = UserRepository::new(session.db.pool()).list().await?;
    let current = session.config.current_user_name.as_deref();

    for user in &users {
        if Some(user.name.as_str()) == current {
            println!("* {} (current)", user.name);
        } else {
            println!("* {}", user.name);
        }
    }
    Ok(())
}

/// `gator reset`: delete every user and, through cascades, everything else.
pub async fn reset(session: &Session) -> Result<()> {
    let deleted = UserRepository::new(session.db.pool()).delete_all().await?;
    info!(deleted, "database reset");
    println!("database reset");
    Ok(())
}
