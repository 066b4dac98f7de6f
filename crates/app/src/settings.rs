//! Handles settings for the application.
//!
//! Values come from an optional TOML file (`settings.toml` by default) and
//! are overridden by `CUAN__SECTION__KEY` environment variables, e.g.
//! `CUAN__DATABASE__URL`.

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

pub const DEFAULT_SETTINGS_PATH: &str = "settings";

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct App {
    /// Log level applied to every crate of the workspace.
    pub level: String,
}

impl Default for App {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Database {
    pub url: String,
    /// SQLite takes one writer at a time.
    pub max_connections: u32,
}

impl Default for Database {
    fn default() -> Self {
        Self {
            url: "sqlite:./cuan.db?mode=rwc".to_string(),
            max_connections: 1,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    pub app: App,
    pub database: Database,
}

impl Settings {
    pub fn load(path: &str) -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(File::with_name(path).required(false))
            .add_source(Environment::with_prefix("CUAN").separator("__"))
            .build()?
            .try_deserialize()
    }
}
