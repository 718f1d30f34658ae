//! apodwall - NASA's Astronomy Picture of the Day as a page background
//!
//! Loads today's picture (from cache when possible) and writes a stylesheet
//! applying it, once or repeatedly in watch mode.

use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use apodwall::apod::ReqwestFetcher;
use apodwall::cache::{CacheManager, FileStore, KeyValueStore, MemoryStore};
use apodwall::cli::{Cli, RunMode, StartupConfig};
use apodwall::clock::SystemClock;
use apodwall::config::ConfigManager;
use apodwall::error::ApodResult;
use apodwall::loader::ApodLoader;
use apodwall::refresh::run_watch;
use apodwall::render::{BackgroundSink, CssFileSink, StdoutSink};

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

/// Logs go to stderr so the stylesheet on stdout stays clean
fn init_logging(verbose: u8) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| match verbose {
        0 => EnvFilter::new("apodwall=warn"),
        1 => EnvFilter::new("apodwall=info"),
        _ => EnvFilter::new("apodwall=debug"),
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();
}

async fn run() -> ApodResult<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let startup = StartupConfig::from_cli(&cli);

    let config_manager = match cli.config {
        Some(ref path) => ConfigManager::with_path(path.clone()),
        None => ConfigManager::new(),
    };
    debug!("Loading config from {}", config_manager.path().display());
    let mut config = config_manager.load().await?;
    cli.apply_overrides(&mut config);

    let store: Arc<dyn KeyValueStore> = match FileStore::new() {
        Some(store) => Arc::new(store),
        None => {
            warn!("No cache directory available, caching in memory only");
            Arc::new(MemoryStore::new())
        }
    };
    let cache = CacheManager::new(store);
    if startup.clear_cache {
        info!("Clearing cached background");
        cache.clear()?;
    }

    let fetcher = Arc::new(ReqwestFetcher::new(config.timeout())?);
    let loader = ApodLoader::new(&config, fetcher, cache, Arc::new(SystemClock));

    let sink: Box<dyn BackgroundSink> = match config.output {
        Some(ref path) => Box::new(CssFileSink::new(path.clone())),
        None => Box::new(StdoutSink),
    };

    match startup.mode {
        RunMode::Once => {
            let outcome = loader.load_and_render(sink.as_ref()).await;
            info!(source = ?outcome.source, "Background applied");
        }
        RunMode::Watch(interval) => {
            info!("Watching every {}s, press Ctrl-C to stop", interval.as_secs());
            let shutdown = async {
                if let Err(e) = tokio::signal::ctrl_c().await {
                    warn!("Failed to listen for Ctrl-C: {}", e);
                    std::future::pending::<()>().await;
                }
            };
            let runs = run_watch(&loader, sink.as_ref(), interval, shutdown).await;
            info!("Stopped after {} loads", runs);
        }
    }

    Ok(())
}
