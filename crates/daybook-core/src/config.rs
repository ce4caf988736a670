use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::ConfigError;

/// Application configuration.
///
/// Loaded from `$XDG_CONFIG_HOME/daybook/config.toml` when present; every
/// field can be overridden with a `DAYBOOK_*` environment variable. Defaults
/// match the original script layout: credential files and the notes file
/// live in the working directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Path to the OAuth client secret (Google "installed app" JSON).
    #[serde(default = "default_credentials_path")]
    pub credentials_path: PathBuf,

    /// Path to the cached credential (read/write).
    #[serde(default = "default_token_path")]
    pub token_path: PathBuf,

    /// Path to the append-only notes file.
    #[serde(default = "default_notes_path")]
    pub notes_path: PathBuf,

    /// Calendar to operate on.
    #[serde(default = "default_calendar_id")]
    pub calendar_id: String,
}

fn default_credentials_path() -> PathBuf {
    PathBuf::from("credentials.json")
}

fn default_token_path() -> PathBuf {
    PathBuf::from("token.json")
}

fn default_notes_path() -> PathBuf {
    PathBuf::from("notes.txt")
}

fn default_calendar_id() -> String {
    "primary".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            credentials_path: default_credentials_path(),
            token_path: default_token_path(),
            notes_path: default_notes_path(),
            calendar_id: default_calendar_id(),
        }
    }
}

impl Config {
    /// Load configuration: defaults, then the config file, then env overrides.
    pub fn load() -> Result<Self> {
        let mut config = match Self::config_file() {
            Some(path) if path.exists() => {
                let text = std::fs::read_to_string(&path)
                    .with_context(|| format!("Failed to read {}", path.display()))?;
                toml::from_str(&text)
                    .map_err(|e| ConfigError::ParseError(e.to_string()))
                    .with_context(|| format!("Failed to parse {}", path.display()))?
            }
            _ => Self::default(),
        };

        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Location of the optional config file.
    pub fn config_file() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("daybook").join("config.toml"))
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(v) = std::env::var("DAYBOOK_CREDENTIALS") {
            self.credentials_path = PathBuf::from(v);
        }
        if let Ok(v) = std::env::var("DAYBOOK_TOKEN") {
            self.token_path = PathBuf::from(v);
        }
        if let Ok(v) = std::env::var("DAYBOOK_NOTES") {
            self.notes_path = PathBuf::from(v);
        }
        if let Ok(v) = std::env::var("DAYBOOK_CALENDAR_ID") {
            self.calendar_id = v;
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.calendar_id.trim().is_empty() {
            return Err(ConfigError::Invalid("calendar_id must not be empty".into()));
        }
        Ok(())
    }
}
