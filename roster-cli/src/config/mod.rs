//! Application configuration
//!
//! Values come from `config.toml` in the user's config directory, then from
//! `ROSTER_*` environment variables (a `.env` file is honoured), then from
//! command-line flags.

pub mod storage;

pub use storage::{CredentialProvider, FileStore, KeyValueStore, MemoryStore, StoredCredentials};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Directory name under the platform config dir
pub const APP_DIR: &str = "roster-cli";

pub const ENV_API_URL: &str = "ROSTER_API_URL";
pub const ENV_STORAGE_PATH: &str = "ROSTER_STORAGE_PATH";

const DEFAULT_API_BASE_URL: &str = "http://localhost:5000";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Base URL of the dormitory REST API
    pub api_base_url: String,
    /// Per-request timeout; unset leaves the HTTP client defaults in place
    pub request_timeout_secs: Option<u64>,
    /// Override for the credential store file
    pub storage_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            request_timeout_secs: None,
            storage_path: None,
        }
    }
}

impl Config {
    /// `~/.config/roster-cli` (or the platform equivalent)
    pub fn config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(APP_DIR)
    }

    pub fn default_path() -> PathBuf {
        Self::config_dir().join("config.toml")
    }

    /// Load from the default location and apply environment overrides
    pub fn load() -> Result<Self> {
        let config = Self::load_from(&Self::default_path())?;
        Ok(config.with_overrides(|key| std::env::var(key).ok()))
    }

    /// Load from `path`; a missing file yields the defaults
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            log::debug!("No config file at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Apply overrides from a variable lookup (normally the process environment)
    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(url) = lookup(ENV_API_URL).filter(|v| !v.trim().is_empty()) {
            self.api_base_url = url;
        }
        if let Some(path) = lookup(ENV_STORAGE_PATH).filter(|v| !v.trim().is_empty()) {
            self.storage_path = Some(PathBuf::from(path));
        }
        self
    }

    /// Where the credential store lives
    pub fn storage_file(&self) -> PathBuf {
        self.storage_path
            .clone()
            .unwrap_or_else(|| Self::config_dir().join("storage.toml"))
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }
}
