//! The fetch-parse-cache-render pipeline
//!
//! Each call to [`ApodLoader::load`] walks one trigger through:
//!
//! ```text
//! CheckCache -> UseCache
//!            -> Fetch -> Extract ok   -> Process -> Cache
//!                     -> Extract miss -> Guess found     -> Process -> Cache
//!                                     -> Guess not found -> Fallback
//! ```
//!
//! and always yields a background URL. Errors are logged and recovered here;
//! none escape to the caller.

use chrono::NaiveDate;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::apod::{download_image, extract_image_url, fetch_page, probe_direct_url, HttpFetch};
use crate::cache::{CacheManager, CacheRecord};
use crate::clock::Clock;
use crate::config::Config;
use crate::error::{ApodError, ApodResult};
use crate::process::ImageProcessor;
use crate::render::BackgroundSink;

/// Used when nothing else worked and no default background is configured
pub const LAST_RESORT_BACKGROUND: &str =
    "https://apod.nasa.gov/apod/image/1901/IC405_Abolfath_3952.jpg";

/// Where the background of a load came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageSource {
    /// Today's cached record
    Cache,
    /// Image referenced by the APOD page
    Extracted,
    /// Date-based guess of the image URL
    Guessed,
    /// Configured default or the built-in last resort
    Fallback,
}

/// Result of one trigger
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadOutcome {
    pub image_url: String,
    pub source: ImageSource,
}

/// Resolves today's background, consulting the cache first
pub struct ApodLoader {
    fetcher: Arc<dyn HttpFetch>,
    cache: CacheManager,
    clock: Arc<dyn Clock>,
    /// `None` when downsampling is disabled
    processor: Option<ImageProcessor>,
    page_url: String,
    relay: Option<String>,
    default_background: Option<String>,
    cache_fallback: bool,
}

impl ApodLoader {
    pub fn new(
        config: &Config,
        fetcher: Arc<dyn HttpFetch>,
        cache: CacheManager,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            fetcher,
            cache,
            clock,
            processor: config
                .downsample
                .then(|| ImageProcessor::new(config.max_dimension, config.jpeg_quality)),
            page_url: config.page_url.clone(),
            relay: config.relay().map(str::to_string),
            default_background: config.default_background.clone(),
            cache_fallback: config.cache_fallback,
        }
    }

    /// Loads the background and hands it to `sink`
    ///
    /// A failing sink is logged; the outcome is returned either way.
    pub async fn load_and_render(&self, sink: &dyn BackgroundSink) -> LoadOutcome {
        let outcome = self.load().await;
        if let Err(e) = sink.apply(&outcome.image_url) {
            warn!("Failed to apply background: {}", e);
        }
        outcome
    }

    /// Resolves today's background
    pub async fn load(&self) -> LoadOutcome {
        let today = self.clock.today();

        if let Err(e) = self.cache.check_new_day(today) {
            warn!("Failed to update last-visit marker: {}", e);
        }

        if let Some(record) = self.cache.read() {
            if CacheManager::is_valid(&record, today) {
                debug!("Using cached background for {}", today);
                return LoadOutcome {
                    image_url: record.image_url,
                    source: ImageSource::Cache,
                };
            }
            debug!("Cached background is stale");
        }

        match self.resolve_remote(today).await {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!("Falling back to default background: {}", e);
                self.fallback(today)
            }
        }
    }

    /// Fetch, extract or guess, then process and cache
    async fn resolve_remote(&self, today: NaiveDate) -> ApodResult<LoadOutcome> {
        let (url, bytes, source) = match self.extract_from_page().await {
            Ok(url) => {
                let bytes = download_image(self.fetcher.as_ref(), &url).await?;
                (url, bytes, ImageSource::Extracted)
            }
            Err(e) => {
                info!("{}; guessing image URL from date", e);
                let (url, bytes) = probe_direct_url(self.fetcher.as_ref(), today).await?;
                (url, bytes, ImageSource::Guessed)
            }
        };

        let record = self.process(&url, &bytes, today)?;
        if let Err(e) = self.cache.write(&record) {
            warn!("Failed to cache background: {}", e);
        }
        info!("Loaded picture of the day from {}", url);

        Ok(LoadOutcome {
            image_url: record.image_url,
            source,
        })
    }

    async fn extract_from_page(&self) -> ApodResult<String> {
        let html = fetch_page(self.fetcher.as_ref(), &self.page_url, self.relay.as_deref()).await?;
        extract_image_url(&html)
    }

    /// Builds the cache record for a downloaded image
    ///
    /// Undecodable bytes are an error. A re-encoding failure keeps the remote URL.
    fn process(&self, url: &str, bytes: &[u8], today: NaiveDate) -> ApodResult<CacheRecord> {
        let image = ImageProcessor::decode(url, bytes)?;

        let Some(processor) = self.processor else {
            return Ok(CacheRecord::new(url, today).with_dimensions(image.width(), image.height()));
        };

        match processor.process(&image) {
            Ok(processed) => Ok(CacheRecord::new(processed.data_url, today)
                .with_dimensions(processed.width, processed.height)),
            Err(e @ ApodError::Serialization(_)) => {
                warn!("{}; caching original URL", e);
                Ok(CacheRecord::new(url, today).with_dimensions(image.width(), image.height()))
            }
            Err(e) => Err(e),
        }
    }

    fn fallback(&self, today: NaiveDate) -> LoadOutcome {
        let image_url = self
            .default_background
            .clone()
            .unwrap_or_else(|| LAST_RESORT_BACKGROUND.to_string());

        if self.cache_fallback {
            if let Err(e) = self.cache.write(&CacheRecord::new(image_url.clone(), today)) {
                warn!("Failed to cache fallback background: {}", e);
            }
        }

        LoadOutcome {
            image_url,
            source: ImageSource::Fallback,
        }
    }
}
