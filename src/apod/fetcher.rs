//! HTTP access for the APOD page and images
//!
//! `HttpFetch` is the seam the loader talks to; `ReqwestFetcher` is the
//! production implementation. Page requests optionally go through a relay and
//! always carry a cache-busting parameter.

use async_trait::async_trait;
use reqwest::{Client, Url};
use std::time::Duration;
use tracing::debug;
use uuid::Uuid;

use crate::error::{ApodError, ApodResult};

/// Minimal HTTP GET interface
#[async_trait]
pub trait HttpFetch: Send + Sync {
    /// GETs `url` and returns the body as text
    async fn get_text(&self, url: &str) -> ApodResult<String>;

    /// GETs `url` and returns the raw body
    async fn get_bytes(&self, url: &str) -> ApodResult<Vec<u8>>;
}

/// `HttpFetch` backed by reqwest
#[derive(Debug, Clone)]
pub struct ReqwestFetcher {
    client: Client,
}

impl ReqwestFetcher {
    /// Create a fetcher whose requests time out after `timeout`
    pub fn new(timeout: Duration) -> ApodResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("apodwall/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self::with_client(client))
    }

    /// Create a fetcher with a custom HTTP client
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }

    async fn get(&self, url: &str) -> ApodResult<reqwest::Response> {
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ApodError::Network(format!("{} returned {}", url, status)));
        }
        Ok(response)
    }
}

#[async_trait]
impl HttpFetch for ReqwestFetcher {
    async fn get_text(&self, url: &str) -> ApodResult<String> {
        Ok(self.get(url).await?.text().await?)
    }

    async fn get_bytes(&self, url: &str) -> ApodResult<Vec<u8>> {
        Ok(self.get(url).await?.bytes().await?.to_vec())
    }
}

/// Builds the URL used to request the APOD page
///
/// With a relay the page URL is passed as the relay's `url` parameter;
/// either way a `_` parameter carrying `buster` defeats intermediate caches.
///
/// # Arguments
/// * `page_url` - The APOD page to request
/// * `relay` - Optional relay base URL (e.g., "https://api.allorigins.win/raw")
/// * `buster` - Value for the cache-busting `_` parameter
///
/// # Returns
/// * `Ok(String)` with the full request URL
/// * `Err(ApodError::Network)` if the page or relay URL cannot be parsed
pub fn page_request_url(page_url: &str, relay: Option<&str>, buster: &str) -> ApodResult<String> {
    let parse = |s: &str| {
        Url::parse(s).map_err(|e| ApodError::Network(format!("Invalid URL '{}': {}", s, e)))
    };

    let mut url = match relay {
        Some(relay) => {
            let mut url = parse(relay)?;
            url.query_pairs_mut().append_pair("url", page_url);
            url
        }
        None => parse(page_url)?,
    };
    url.query_pairs_mut().append_pair("_", buster);
    Ok(url.into())
}

/// Fetches the APOD page HTML
pub async fn fetch_page(
    fetcher: &dyn HttpFetch,
    page_url: &str,
    relay: Option<&str>,
) -> ApodResult<String> {
    let buster = Uuid::new_v4().simple().to_string();
    let url = page_request_url(page_url, relay, &buster)?;
    debug!("Fetching APOD page via {}", url);
    fetcher.get_text(&url).await
}

/// Downloads an image, reporting any failure as an image load error
pub async fn download_image(fetcher: &dyn HttpFetch, url: &str) -> ApodResult<Vec<u8>> {
    fetcher
        .get_bytes(url)
        .await
        .map_err(|e| ApodError::image_load(url, e))
}
