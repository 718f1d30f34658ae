//! Configuration for apodwall
//!
//! Settings are read from `config.toml` in the XDG config directory (or a path
//! given with `--config`). A missing file yields the defaults; command-line
//! flags are applied on top by `main`.

use directories::ProjectDirs;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

use crate::error::{ApodError, ApodResult};

/// APOD page that carries today's picture
pub const DEFAULT_PAGE_URL: &str = "https://apod.nasa.gov/apod/astropix.html";

/// Cross-origin relay used for the page request
pub const DEFAULT_RELAY: &str = "https://api.allorigins.win/raw";

/// Longest side of a downsampled image, in pixels
pub const DEFAULT_MAX_DIMENSION: u32 = 1200;

/// JPEG quality used when re-encoding (0.85)
pub const DEFAULT_JPEG_QUALITY: u8 = 85;

const DEFAULT_TIMEOUT_SECS: u64 = 20;

/// Runtime settings
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// APOD page to scrape
    pub page_url: String,
    /// Relay wrapping the page request; empty string disables it
    pub relay: String,
    /// Background used when every fetch and guess fails
    pub default_background: Option<String>,
    /// Re-encode images at reduced resolution before caching
    pub downsample: bool,
    pub max_dimension: u32,
    pub jpeg_quality: u8,
    /// Per-request timeout in seconds
    pub timeout_secs: u64,
    /// Cache the fallback background so the day is not re-fetched
    pub cache_fallback: bool,
    /// Stylesheet to write; stdout when unset
    pub output: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            page_url: DEFAULT_PAGE_URL.to_string(),
            relay: DEFAULT_RELAY.to_string(),
            default_background: None,
            downsample: true,
            max_dimension: DEFAULT_MAX_DIMENSION,
            jpeg_quality: DEFAULT_JPEG_QUALITY,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            cache_fallback: true,
            output: None,
        }
    }
}

impl Config {
    /// Relay URL, or `None` when disabled
    pub fn relay(&self) -> Option<&str> {
        let relay = self.relay.trim();
        (!relay.is_empty()).then_some(relay)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Parses a TOML document
    pub fn from_toml(content: &str, path: &Path) -> ApodResult<Self> {
        let config: Config = toml::from_str(content).map_err(|e| ApodError::ConfigInvalid {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        config.validate(path)?;
        Ok(config)
    }

    fn validate(&self, path: &Path) -> ApodResult<()> {
        let invalid = |reason: &str| ApodError::ConfigInvalid {
            path: path.to_path_buf(),
            reason: reason.to_string(),
        };
        if self.max_dimension == 0 {
            return Err(invalid("max_dimension must be greater than 0"));
        }
        if self.jpeg_quality == 0 || self.jpeg_quality > 100 {
            return Err(invalid("jpeg_quality must be between 1 and 100"));
        }
        if self.timeout_secs == 0 {
            return Err(invalid("timeout_secs must be greater than 0"));
        }
        Ok(())
    }
}

/// Locates and loads the configuration file
pub struct ConfigManager {
    config_path: PathBuf,
}

impl Default for ConfigManager {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigManager {
    /// Create a config manager with the default path
    pub fn new() -> Self {
        Self {
            config_path: Self::default_config_path(),
        }
    }

    /// Create a config manager with a custom path
    pub fn with_path(path: PathBuf) -> Self {
        Self { config_path: path }
    }

    /// `~/.config/apodwall/config.toml` on Linux
    pub fn default_config_path() -> PathBuf {
        ProjectDirs::from("", "", "apodwall")
            .map(|dirs| dirs.config_dir().to_path_buf())
            .unwrap_or_else(|| PathBuf::from("."))
            .join("config.toml")
    }

    pub fn path(&self) -> &Path {
        &self.config_path
    }

    /// Load configuration, falling back to defaults if the file does not exist
    pub async fn load(&self) -> ApodResult<Config> {
        if !self.config_path.exists() {
            debug!("Config file not found at {}, using defaults", self.config_path.display());
            return Ok(Config::default());
        }

        let content = tokio::fs::read_to_string(&self.config_path).await?;
        Config::from_toml(&content, &self.config_path)
    }
}
