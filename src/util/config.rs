//! Application settings.
//!
//! Settings come from `config.toml` in the platform config directory. A
//! missing file yields the defaults. Environment variables are applied on top:
//! - `SPACEBUY_API_URL` overrides `api_base_url`
//! - `SPACEBUY_OFFLINE` overrides `offline`
//! - `SPACEBUY_LOG` overrides `log_filter`

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde::Deserialize;
use tracing::debug;

use crate::infra::api::DEFAULT_BASE_URL;

const APP_QUALIFIER: &str = "com";
const APP_ORG: &str = "SpaceBuy";
const APP_DIR: &str = "SpaceBuy";
const CONFIG_FILE: &str = "config.toml";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] io::Error),
    #[error("failed to parse config file: {0}")]
    Toml(#[from] toml::de::Error),
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub api_base_url: String,
    pub default_destination: String,
    /// Start every session logged in as the demo user.
    pub auto_login: bool,
    /// Skip the backend and use the bundled catalog.
    pub offline: bool,
    pub catalog_ttl_secs: u64,
    pub log_filter: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_BASE_URL.to_string(),
            default_destination: "Mars".to_string(),
            auto_login: true,
            offline: false,
            catalog_ttl_secs: 60 * 60,
            log_filter: "info".to_string(),
        }
    }
}

impl AppConfig {
    pub fn config_path() -> Option<PathBuf> {
        ProjectDirs::from(APP_QUALIFIER, APP_ORG, APP_DIR)
            .map(|dirs| dirs.config_dir().join(CONFIG_FILE))
    }

    /// Reads the user's config file, falling back to defaults, then applies
    /// environment overrides.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = match Self::config_path() {
            Some(path) if path.exists() => Self::from_file(&path)?,
            _ => Self::default(),
        };
        config.apply_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        debug!("reading config from {}", path.display());
        let contents = fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    pub fn parse(contents: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(contents)?)
    }

    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("SPACEBUY_API_URL").filter(|value| !value.trim().is_empty()) {
            self.api_base_url = url;
        }
        if let Some(flag) = lookup("SPACEBUY_OFFLINE").and_then(|value| parse_flag(&value)) {
            self.offline = flag;
        }
        if let Some(filter) = lookup("SPACEBUY_LOG").filter(|value| !value.trim().is_empty()) {
            self.log_filter = filter;
        }
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
