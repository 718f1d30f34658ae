//! Error types for apodwall
//!
//! Pipeline stages return `ApodResult<T>`. Everything except configuration and
//! startup IO errors is recovered inside the loader and never reaches `main`.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for apodwall operations
pub type ApodResult<T> = Result<T, ApodError>;

/// Errors that can occur while loading the picture of the day
#[derive(Debug, Error)]
pub enum ApodError {
    /// The relay or page was unreachable, or answered with a non-success status
    #[error("Network error: {0}")]
    Network(String),

    /// Neither extraction pattern matched the page
    #[error("No image reference found in page")]
    ExtractionMiss,

    /// An image could not be downloaded or decoded
    #[error("Failed to load image {url}: {reason}")]
    ImageLoad { url: String, reason: String },

    /// Re-encoding the downsampled image failed
    #[error("Failed to serialize image: {0}")]
    Serialization(String),

    /// Invalid configuration file
    #[error("Invalid configuration at {path}: {reason}")]
    ConfigInvalid { path: PathBuf, reason: String },

    /// Filesystem error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Cache record could not be encoded
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ApodError {
    /// Builds an image load error for the given URL
    pub fn image_load(url: impl Into<String>, reason: impl ToString) -> Self {
        Self::ImageLoad {
            url: url.into(),
            reason: reason.to_string(),
        }
    }
}

impl From<reqwest::Error> for ApodError {
    fn from(err: reqwest::Error) -> Self {
        Self::Network(err.to_string())
    }
}
