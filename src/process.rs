//! Image downsampling and serialization
//!
//! Decodes a downloaded picture, caps its longest side, re-encodes it as JPEG
//! and wraps the result in a `data:` URL so it can be cached and embedded.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, ExtendedColorType};
use tracing::debug;

use crate::config::{DEFAULT_JPEG_QUALITY, DEFAULT_MAX_DIMENSION};
use crate::error::{ApodError, ApodResult};

/// A re-encoded image ready to embed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessedImage {
    /// `data:image/jpeg;base64,...`
    pub data_url: String,
    pub width: u32,
    pub height: u32,
}

/// Dimensions of `width`x`height` scaled so the longest side is at most `max`
///
/// Images already within bounds are returned unchanged. The shorter side is
/// rounded and never drops below 1.
pub fn scaled_dimensions(width: u32, height: u32, max: u32) -> (u32, u32) {
    let longest = width.max(height);
    if longest <= max || longest == 0 {
        return (width, height);
    }
    let scale = |side: u32| {
        let scaled = (side as u64 * max as u64 + longest as u64 / 2) / longest as u64;
        (scaled as u32).max(1)
    };
    if width >= height {
        (max, scale(height))
    } else {
        (scale(width), max)
    }
}

/// Downsamples and re-encodes images
#[derive(Debug, Clone, Copy)]
pub struct ImageProcessor {
    max_dimension: u32,
    quality: u8,
}

impl Default for ImageProcessor {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_DIMENSION, DEFAULT_JPEG_QUALITY)
    }
}

impl ImageProcessor {
    pub fn new(max_dimension: u32, quality: u8) -> Self {
        Self {
            max_dimension,
            quality,
        }
    }

    /// Decodes image bytes, attributing failures to `url`
    pub fn decode(url: &str, bytes: &[u8]) -> ApodResult<DynamicImage> {
        image::load_from_memory(bytes).map_err(|e| ApodError::image_load(url, e))
    }

    /// Downsamples `image` if needed and serializes it as a JPEG data URL
    pub fn process(&self, image: &DynamicImage) -> ApodResult<ProcessedImage> {
        let (width, height) =
            scaled_dimensions(image.width(), image.height(), self.max_dimension);

        let rgb = if (width, height) == (image.width(), image.height()) {
            image.to_rgb8()
        } else {
            debug!(
                "Downsampling {}x{} to {}x{}",
                image.width(),
                image.height(),
                width,
                height
            );
            image.resize_exact(width, height, FilterType::Lanczos3).to_rgb8()
        };

        let mut jpeg = Vec::new();
        JpegEncoder::new_with_quality(&mut jpeg, self.quality)
            .encode(rgb.as_raw(), width, height, ExtendedColorType::Rgb8)
            .map_err(|e| ApodError::Serialization(e.to_string()))?;

        Ok(ProcessedImage {
            data_url: format!("data:image/jpeg;base64,{}", STANDARD.encode(&jpeg)),
            width,
            height,
        })
    }
}
