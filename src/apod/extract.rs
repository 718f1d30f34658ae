//! Image reference extraction from the APOD page
//!
//! Two patterns are tried in order: an `<img>` whose `src` points into the
//! site's `image/` tree, then an `<a>` linking to a `.jpg`. The first match
//! wins and is resolved against the site root.

use regex::Regex;
use reqwest::Url;
use std::sync::OnceLock;
use tracing::debug;

use crate::error::{ApodError, ApodResult};

/// Base that relative references on the APOD page resolve against
pub const SITE_ROOT: &str = "https://apod.nasa.gov/apod/";

fn img_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r#"(?i)<img\b[^>]*?\ssrc\s*=\s*["']([^"']*image/[^"']+)["']"#)
            .expect("img pattern is valid")
    })
}

fn link_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r#"(?i)<a\b[^>]*?\shref\s*=\s*["']([^"']+\.jpg)["']"#)
            .expect("link pattern is valid")
    })
}

/// Resolves a page reference to an absolute URL
///
/// Absolute URLs pass through; relative and root-relative ones are joined onto
/// [`SITE_ROOT`].
pub fn resolve_reference(reference: &str) -> Option<String> {
    let base = Url::parse(SITE_ROOT).ok()?;
    base.join(reference.trim()).ok().map(String::from)
}

/// Finds the picture of the day in the page HTML
///
/// Returns `ApodError::ExtractionMiss` when neither pattern matches.
pub fn extract_image_url(html: &str) -> ApodResult<String> {
    for (name, pattern) in [("img", img_pattern()), ("link", link_pattern())] {
        let Some(reference) = pattern.captures(html).and_then(|c| c.get(1)) else {
            continue;
        };
        if let Some(url) = resolve_reference(reference.as_str()) {
            debug!("Extracted image via {} pattern: {}", name, url);
            return Ok(url);
        }
    }
    Err(ApodError::ExtractionMiss)
}
