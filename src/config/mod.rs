//! Configuration management.
//!
//! The exporter reads a single JSON file describing the account to export
//! and how hard to push it:
//!
//! ```json
//! {
//!   "url": "https://company.example.com",
//!   "token": "secret",
//!   "export_folder": "./export",
//!   "per_page": 100,
//!   "download_threads": 8,
//!   "timeout": 30
//! }
//! ```
//!
//! Only `url`, `token` and `export_folder` are required. `HDX_TOKEN`
//! overrides the token so it can stay out of the file.

use crate::error::{Error, Result};

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Name of the config file looked up in the working directory.
pub const LOCAL_CONFIG_FILE: &str = "hdx.json";

/// Largest page size the remote API accepts.
pub const MAX_PER_PAGE: u32 = 100;

/// Exporter configuration, loaded once per process.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Base URL of the helpdesk account, without trailing slash.
    pub url: String,

    /// API token sent as the `auth_token` query parameter.
    pub token: String,

    /// Root of the export tree.
    pub export_folder: PathBuf,

    /// Page size for every listing call.
    #[serde(default = "default_per_page")]
    pub per_page: u32,

    /// Worker pool size for the batch stages. Bounds concurrent
    /// connections, so size it to the account's rate limit.
    #[serde(default = "default_download_threads")]
    pub download_threads: usize,

    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,
}

fn default_per_page() -> u32 {
    MAX_PER_PAGE
}

fn default_download_threads() -> usize {
    4
}

fn default_timeout() -> u64 {
    30
}

impl Config {
    /// Per-request timeout as a `Duration`.
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.timeout)
    }

    /// Check the loaded values before any work starts.
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` naming the first offending field.
    pub fn validate(&self) -> Result<()> {
        if self.url.trim().is_empty() {
            return Err(Error::Config("\"url\" must not be empty".into()));
        }
        if !self.url.starts_with("http://") && !self.url.starts_with("https://") {
            return Err(Error::Config(format!(
                "\"url\" must start with http:// or https://, got {}",
                self.url
            )));
        }
        if self.token.trim().is_empty() {
            return Err(Error::Config("\"token\" must not be empty".into()));
        }
        if self.export_folder.as_os_str().is_empty() {
            return Err(Error::Config("\"export_folder\" must not be empty".into()));
        }
        if self.per_page == 0 || self.per_page > MAX_PER_PAGE {
            return Err(Error::Config(format!(
                "\"per_page\" must be between 1 and {MAX_PER_PAGE}, got {}",
                self.per_page
            )));
        }
        if self.download_threads == 0 {
            return Err(Error::Config("\"download_threads\" must be at least 1".into()));
        }
        if self.timeout == 0 {
            return Err(Error::Config("\"timeout\" must be at least 1 second".into()));
        }
        Ok(())
    }
}

/// Per-user config location: `<config dir>/hdx/config.json`.
#[must_use]
pub fn user_config_path() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", "hdx").map(|d| d.config_dir().join("config.json"))
}

/// Resolve the config file path.
///
/// Priority:
/// 1. `explicit_path` (the `--config` flag or `HDX_CONFIG`), used as-is
/// 2. `./hdx.json`
/// 3. `<config dir>/hdx/config.json`
///
/// # Errors
///
/// Returns `Error::ConfigNotFound` listing every searched path.
pub fn resolve_config_path(explicit_path: Option<&Path>) -> Result<PathBuf> {
    let candidates: Vec<PathBuf> = match explicit_path {
        Some(path) => vec![path.to_path_buf()],
        None => std::iter::once(PathBuf::from(LOCAL_CONFIG_FILE))
            .chain(user_config_path())
            .collect(),
    };

    candidates
        .iter()
        .find(|p| p.is_file())
        .cloned()
        .ok_or(Error::ConfigNotFound {
            searched: candidates,
        })
}

/// Load and validate a config file.
///
/// # Errors
///
/// Returns `Error::Config` if the file cannot be read, parsed, or fails
/// validation.
pub fn load_config(path: &Path) -> Result<Config> {
    let content = fs::read_to_string(path).map_err(|e| {
        Error::Config(format!("Failed to read config file {}: {e}", path.display()))
    })?;

    let mut config: Config = serde_json::from_str(&content).map_err(|e| {
        Error::Config(format!("Failed to parse config file {}: {e}", path.display()))
    })?;

    if let Ok(token) = std::env::var("HDX_TOKEN") {
        if !token.is_empty() {
            config.token = token;
        }
    }

    config.url = config.url.trim_end_matches('/').to_string();
    config.validate()?;
    Ok(config)
}
