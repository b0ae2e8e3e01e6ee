//! Persisted CLI configuration for gator.
//!
//! A small JSON file in the user's home directory holds the database
//! connection string and the currently logged-in user. `register` and
//! `login` rewrite it; everything else only reads it.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{GatorError, Result};

/// File name of the config file, resolved relative to `$HOME`.
pub const CONFIG_FILE_NAME: &str = ".gatorconfig.json";

/// Persisted configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Config {
    /// Database connection string, e.g. `sqlite:gator.db`.
    pub db_url: String,
    /// Name of the logged-in user; `None` before the first login.
    #[serde(default)]
    pub current_user_name: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            db_url: "sqlite:gator.db".to_string(),
            current_user_name: None,
        }
    }
}

impl Config {
    /// Default location of the config file: `$HOME/.gatorconfig.json`.
    pub fn default_path() -> Result<PathBuf> {
        let home = std::env::var_os("HOME")
            .ok_or_else(|| GatorError::Config("HOME is not set".to_string()))?;
        Ok(PathBuf::from(home).join(CONFIG_FILE_NAME))
    }

    /// Load the configuration from the given path.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let contents = fs::read_to_string(path.as_ref())?;
        serde_json::from_str(&contents)
            .map_err(|e| GatorError::Config(format!("invalid config file: {e}")))
    }

    /// Write the configuration to the given path.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let contents = serde_json::to_string_pretty(self)
            .map_err(|e| GatorError::Config(format!("failed to serialize config: {e}")))?;
        fs::write(path.as_ref(), contents)?;
        Ok(())
    }

    /// Record `name` as the logged-in user and persist the change.
    pub fn set_user(&mut self, name: &str, path: impl AsRef<Path>) -> Result<()> {
        self.current_user_name = Some(name.to_string());
        self.save(path)
    }
}
