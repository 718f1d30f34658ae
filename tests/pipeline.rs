//! End-to-end tests of the loader against a scripted fetcher
//!
//! These use the on-disk store and the CSS sink the binary uses, with the
//! network replaced by an in-memory `HttpFetch`.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use image::codecs::jpeg::JpegEncoder;
use image::{ExtendedColorType, Rgb, RgbImage};
use tempfile::TempDir;

use apodwall::apod::{direct_url, HttpFetch};
use apodwall::cache::{CacheManager, FileStore};
use apodwall::clock::FixedClock;
use apodwall::config::Config;
use apodwall::error::{ApodError, ApodResult};
use apodwall::loader::{ApodLoader, ImageSource};
use apodwall::refresh::run_watch;
use apodwall::render::{background_css, CssFileSink};

struct ScriptedFetcher {
    page: Option<String>,
    images: HashMap<String, Vec<u8>>,
    calls: AtomicUsize,
}

impl ScriptedFetcher {
    fn new(page: Option<&str>) -> Self {
        Self {
            page: page.map(str::to_string),
            images: HashMap::new(),
            calls: AtomicUsize::new(0),
        }
    }

    fn image(mut self, url: &str, width: u32, height: u32) -> Self {
        let img = RgbImage::from_pixel(width, height, Rgb([0, 0, 64]));
        let mut bytes = Vec::new();
        JpegEncoder::new_with_quality(&mut bytes, 90)
            .encode(img.as_raw(), width, height, ExtendedColorType::Rgb8)
            .unwrap();
        self.images.insert(url.to_string(), bytes);
        self
    }
}

#[async_trait]
impl HttpFetch for ScriptedFetcher {
    async fn get_text(&self, _url: &str) -> ApodResult<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.page
            .clone()
            .ok_or_else(|| ApodError::Network("connection refused".to_string()))
    }

    async fn get_bytes(&self, url: &str) -> ApodResult<Vec<u8>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.images
            .get(url)
            .cloned()
            .ok_or_else(|| ApodError::Network("404 Not Found".to_string()))
    }
}

fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 10, d).unwrap()
}

fn loader_for(
    config: &Config,
    fetcher: Arc<ScriptedFetcher>,
    cache_dir: &TempDir,
    today: NaiveDate,
) -> ApodLoader {
    let cache = CacheManager::new(Arc::new(FileStore::with_dir(cache_dir.path().to_path_buf())));
    ApodLoader::new(config, fetcher, cache, Arc::new(FixedClock(today)))
}

#[tokio::test]
async fn test_cache_persists_across_runs_on_same_day() {
    let cache_dir = TempDir::new().unwrap();
    let page = r#"<center><img src="image/2410/Comet_1080.jpg" alt="comet"></center>"#;
    let fetcher = Arc::new(
        ScriptedFetcher::new(Some(page)).image("https://apod.nasa.gov/apod/image/2410/Comet_1080.jpg", 1920, 1080),
    );
    let config = Config::default();

    let first = loader_for(&config, fetcher.clone(), &cache_dir, day(3)).load().await;
    let calls_after_first = fetcher.calls.load(Ordering::SeqCst);

    // A new process on the same day reads the record back from disk
    let second = loader_for(&config, fetcher.clone(), &cache_dir, day(3)).load().await;

    assert_eq!(first.source, ImageSource::Extracted);
    assert_eq!(second.source, ImageSource::Cache);
    assert_eq!(second.image_url, first.image_url);
    assert_eq!(fetcher.calls.load(Ordering::SeqCst), calls_after_first);
}

#[tokio::test]
async fn test_next_day_fetches_again() {
    let cache_dir = TempDir::new().unwrap();
    let config = Config {
        downsample: false,
        ..Config::default()
    };
    let fetcher = Arc::new(
        ScriptedFetcher::new(Some("<p>video today</p>"))
            .image(&direct_url(day(3)), 640, 480)
            .image(&direct_url(day(4)), 640, 480),
    );

    let first = loader_for(&config, fetcher.clone(), &cache_dir, day(3)).load().await;
    let second = loader_for(&config, fetcher.clone(), &cache_dir, day(4)).load().await;

    assert_eq!(first.image_url, "https://apod.nasa.gov/apod/image/2410/241003.jpg");
    assert_eq!(second.source, ImageSource::Guessed);
    assert_eq!(second.image_url, "https://apod.nasa.gov/apod/image/2410/241004.jpg");
}

#[tokio::test]
async fn test_total_failure_renders_default_background() {
    let cache_dir = TempDir::new().unwrap();
    let out_dir = TempDir::new().unwrap();
    let css_path = out_dir.path().join("background.css");
    let config = Config {
        default_background: Some("https://example.com/stars.jpg".to_string()),
        ..Config::default()
    };
    let fetcher = Arc::new(ScriptedFetcher::new(None));
    let loader = loader_for(&config, fetcher, &cache_dir, day(3));

    let outcome = loader.load_and_render(&CssFileSink::new(css_path.clone())).await;

    assert_eq!(outcome.source, ImageSource::Fallback);
    let css = std::fs::read_to_string(&css_path).unwrap();
    assert_eq!(css, background_css("https://example.com/stars.jpg"));
}

#[tokio::test]
async fn test_watch_reuses_cache_between_ticks() {
    let cache_dir = TempDir::new().unwrap();
    let out_dir = TempDir::new().unwrap();
    let css_path = out_dir.path().join("background.css");
    let page = r#"<img src="image/2410/Comet_1080.jpg">"#;
    let fetcher = Arc::new(
        ScriptedFetcher::new(Some(page)).image("https://apod.nasa.gov/apod/image/2410/Comet_1080.jpg", 200, 100),
    );
    let loader = loader_for(&Config::default(), fetcher.clone(), &cache_dir, day(3));
    let sink = CssFileSink::new(css_path.clone());

    let runs = run_watch(
        &loader,
        &sink,
        Duration::from_millis(20),
        tokio::time::sleep(Duration::from_millis(300)),
    )
    .await;

    assert!(runs >= 2, "expected at least one re-trigger, got {runs}");
    // One page request and one image download, no matter how many ticks
    assert_eq!(fetcher.calls.load(Ordering::SeqCst), 2);
    assert!(std::fs::read_to_string(&css_path).unwrap().contains("data:image/jpeg;base64,"));
}
