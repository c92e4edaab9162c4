use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use anyhow::{Result, anyhow};
use tracing::warn;

pub const DEFAULT_API_URL: &str = "http://localhost:8000";
pub const DEFAULT_FALLBACK_REPLY: &str = "Sorry, I couldn't find an answer.";

/// Environment variable overriding the backend base URL
pub const API_URL_ENV: &str = "TASKCHAT_API_URL";

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct Config {
    pub api_url: Option<String>,
    pub fallback_reply: Option<String>,
    pub request_timeout_secs: Option<u64>,
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads the config file (if any), then applies `.env` and environment overrides.
    pub fn load() -> Result<Self> {
        if let Err(e) = env_file_loaded(dotenvy::dotenv()) {
            warn!(error = %e, "Ignoring unreadable .env file");
        }

        let config_path = Self::get_config_path()?;
        let mut config = Self::load_from(&config_path)?;
        config.apply_env(std::env::var(API_URL_ENV).ok());
        Ok(config)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::new());
        }

        let config_content = fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&config_content)?;
        Ok(config)
    }

    pub fn apply_env(&mut self, api_url: Option<String>) {
        if let Some(url) = api_url.filter(|u| !u.trim().is_empty()) {
            self.api_url = Some(url);
        }
    }

    pub fn api_url(&self) -> &str {
        self.api_url.as_deref().unwrap_or(DEFAULT_API_URL)
    }

    pub fn fallback_reply(&self) -> &str {
        self.fallback_reply.as_deref().unwrap_or(DEFAULT_FALLBACK_REPLY)
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }

    fn get_config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow!("Could not determine config directory"))?;

        Ok(config_dir.join("taskchat").join("config.json"))
    }
}

/// `Ok(false)` when there is no `.env` file, which is the usual case.
fn env_file_loaded<T>(
    outcome: std::result::Result<T, dotenvy::Error>,
) -> std::result::Result<bool, dotenvy::Error> {
    match outcome {
        Ok(_) => Ok(true),
        Err(e) if e.not_found() => Ok(false),
        Err(e) => Err(e),
    }
}
