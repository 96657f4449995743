use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::download::DEFAULT_USER_AGENT;
use crate::error::{Result, SongFinderError};

pub const ENV_API_KEY: &str = "SONGFINDER_YOUTUBE_API_KEY";
pub const ENV_OUTPUT_DIR: &str = "SONGFINDER_OUTPUT_DIR";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory extracted audio is written to
    pub output_dir: PathBuf,
    /// Limit for API calls
    #[serde(with = "humantime_serde")]
    pub request_timeout: Duration,
    /// Limit for reading a whole audio stream
    #[serde(with = "humantime_serde")]
    pub stream_timeout: Duration,
    pub youtube: YoutubeConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("music"),
            request_timeout: Duration::from_secs(60),
            stream_timeout: Duration::from_secs(600),
            youtube: YoutubeConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct YoutubeConfig {
    pub api_key: String,
    /// Base of the Data API, e.g. `https://www.googleapis.com/youtube/v3`
    pub data_api_url: String,
    /// Base of the InnerTube API, e.g. `https://www.youtube.com`
    pub innertube_url: String,
    pub user_agent: String,
}

impl Default for YoutubeConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            data_api_url: "https://www.googleapis.com/youtube/v3".to_string(),
            innertube_url: "https://www.youtube.com".to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl Config {
    /// Parse a TOML document
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| SongFinderError::ConfigError(e.to_string()))
    }

    /// Load from `path` if given, falling back to defaults, then apply env overrides
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => {
                let content = std::fs::read_to_string(path).map_err(|e| {
                    SongFinderError::ConfigError(format!("{}: {}", path.display(), e))
                })?;
                Self::from_toml(&content)?
            }
            None => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Override settings from the environment. `lookup` is injected so the
    /// process environment is only read at the edge.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(key) = lookup(ENV_API_KEY).filter(|v| !v.is_empty()) {
            self.youtube.api_key = key;
        }
        if let Some(dir) = lookup(ENV_OUTPUT_DIR).filter(|v| !v.is_empty()) {
            self.output_dir = PathBuf::from(dir);
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.youtube.api_key.trim().is_empty() {
            return Err(SongFinderError::ConfigError(format!(
                "youtube.api_key is empty (set it in the config file or {ENV_API_KEY})"
            )));
        }
        if self.request_timeout.is_zero() || self.stream_timeout.is_zero() {
            return Err(SongFinderError::ConfigError(
                "timeouts must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}
