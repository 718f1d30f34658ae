//! Command-line interface parsing for apodwall
//!
//! Flags override values from the configuration file; `StartupConfig`
//! captures what the binary should do once the configuration is settled.

use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

use crate::config::Config;

/// apodwall - NASA's Astronomy Picture of the Day as a page background
#[derive(Parser, Debug)]
#[command(name = "apodwall")]
#[command(about = "Applies NASA's Astronomy Picture of the Day as a page background")]
#[command(version)]
pub struct Cli {
    /// Path to the configuration file
    #[arg(long, value_name = "PATH", env = "APODWALL_CONFIG")]
    pub config: Option<PathBuf>,

    /// Write the background stylesheet here instead of stdout
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Background used when the picture of the day cannot be loaded
    #[arg(long, value_name = "URL", env = "APODWALL_DEFAULT_BACKGROUND")]
    pub default_background: Option<String>,

    /// Keep the full-resolution remote image instead of embedding a downsampled copy
    #[arg(long)]
    pub no_downsample: bool,

    /// Fetch the APOD page directly instead of through the relay
    #[arg(long)]
    pub no_relay: bool,

    /// Ignore and clear the cached background before loading
    #[arg(long)]
    pub refresh: bool,

    /// Keep running and re-check every SECS seconds
    ///
    /// Re-checks on the same day are served from the cache.
    #[arg(long, value_name = "SECS", value_parser = clap::value_parser!(u64).range(1..))]
    pub watch: Option<u64>,

    /// Increase logging verbosity (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

/// How the binary runs after startup
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunMode {
    /// Load once and exit
    #[default]
    Once,
    /// Load now and again every interval until interrupted
    Watch(Duration),
}

/// Settings derived from CLI arguments for application startup
#[derive(Debug, Clone, Default)]
pub struct StartupConfig {
    pub mode: RunMode,
    /// Clear the cache before the first load
    pub clear_cache: bool,
}

impl StartupConfig {
    /// Creates a StartupConfig from parsed CLI arguments
    pub fn from_cli(cli: &Cli) -> Self {
        let mode = match cli.watch {
            Some(secs) => RunMode::Watch(Duration::from_secs(secs)),
            None => RunMode::Once,
        };
        Self {
            mode,
            clear_cache: cli.refresh,
        }
    }
}

impl Cli {
    /// Applies command-line overrides on top of the file configuration
    pub fn apply_overrides(&self, config: &mut Config) {
        if let Some(ref output) = self.output {
            config.output = Some(output.clone());
        }
        if let Some(ref url) = self.default_background {
            config.default_background = Some(url.clone());
        }
        if self.no_downsample {
            config.downsample = false;
        }
        if self.no_relay {
            config.relay.clear();
        }
    }
}
