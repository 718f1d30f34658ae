//! Date-based guess of the image location
//!
//! APOD stores pictures as `image/YYMM/YYMMDD.jpg` often enough that the name
//! is worth probing when the page gives nothing usable.

use chrono::NaiveDate;
use tracing::debug;

use super::extract::SITE_ROOT;
use super::fetcher::{download_image, HttpFetch};
use crate::error::{ApodError, ApodResult};

/// Candidate image URL for `date`
pub fn direct_url(date: NaiveDate) -> String {
    format!(
        "{}image/{}/{}.jpg",
        SITE_ROOT,
        date.format("%y%m"),
        date.format("%y%m%d")
    )
}

/// Downloads the candidate for `date` and checks that it is an image
///
/// Returns the URL and the downloaded bytes on success.
pub async fn probe_direct_url(
    fetcher: &dyn HttpFetch,
    date: NaiveDate,
) -> ApodResult<(String, Vec<u8>)> {
    let url = direct_url(date);
    debug!("Probing {}", url);
    let bytes = download_image(fetcher, &url).await?;
    image::guess_format(&bytes).map_err(|e| ApodError::image_load(&url, e))?;
    Ok((url, bytes))
}
