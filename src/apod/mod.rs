//! Access to the APOD website
//!
//! This module fetches the picture-of-the-day page, pulls the image reference
//! out of its HTML, and guesses the image location from the date when the page
//! cannot be used.

pub mod extract;
pub mod fetcher;
pub mod guess;

pub use extract::{extract_image_url, resolve_reference, SITE_ROOT};
pub use fetcher::{download_image, fetch_page, page_request_url, HttpFetch, ReqwestFetcher};
pub use guess::{direct_url, probe_direct_url};
