//! Cache manager for the daily background record
//!
//! Provides a `CacheManager` that stores one `CacheRecord` per cache key and a
//! last-visit marker. A record is valid only on the calendar day it was written.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, warn};

use super::KeyValueStore;
use crate::error::ApodResult;

/// Key holding the JSON cache record
pub const CACHE_KEY: &str = "apod_cache";

/// Key holding the last-visit date
pub const LAST_VISIT_KEY: &str = "apod_last_visit";

/// The cached background for one day
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheRecord {
    /// Absolute URL or `data:` URL of the background image
    pub image_url: String,
    /// Calendar date the record was written
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
    /// Milliseconds since the epoch, written by older versions only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
}

impl CacheRecord {
    /// Creates a record stamped with `date`
    pub fn new(image_url: impl Into<String>, date: NaiveDate) -> Self {
        Self {
            image_url: image_url.into(),
            date: Some(date),
            timestamp: None,
            width: None,
            height: None,
        }
    }

    /// Attaches image dimensions
    pub fn with_dimensions(mut self, width: u32, height: u32) -> Self {
        self.width = Some(width);
        self.height = Some(height);
        self
    }
}

/// Reads and writes the daily record through a `KeyValueStore`
#[derive(Clone)]
pub struct CacheManager {
    store: Arc<dyn KeyValueStore>,
}

impl CacheManager {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Reads the cached record
    ///
    /// Returns `None` if the record doesn't exist or cannot be parsed.
    pub fn read(&self) -> Option<CacheRecord> {
        let content = self.store.get(CACHE_KEY)?;
        match serde_json::from_str(&content) {
            Ok(record) => Some(record),
            Err(e) => {
                warn!("Ignoring unreadable cache record: {}", e);
                None
            }
        }
    }

    /// Writes `record`, replacing any previous one
    pub fn write(&self, record: &CacheRecord) -> ApodResult<()> {
        let json = serde_json::to_string(record)?;
        self.store.set(CACHE_KEY, &json)?;
        Ok(())
    }

    /// Whether `record` may be used on `today`
    ///
    /// Only an exact calendar-date match counts. Legacy records that carry a
    /// timestamp but no date are always stale.
    pub fn is_valid(record: &CacheRecord, today: NaiveDate) -> bool {
        record.date == Some(today)
    }

    /// Records today's visit, dropping the cached record when the day changed
    ///
    /// # Arguments
    /// * `today` - The current calendar date
    ///
    /// # Returns
    /// * `Ok(true)` if the stored last-visit date differs from `today`
    ///   (including the very first visit); the cached record was removed
    /// * `Ok(false)` if today was already recorded
    /// * `Err` if the store cannot be updated
    pub fn check_new_day(&self, today: NaiveDate) -> ApodResult<bool> {
        let last_visit = self
            .store
            .get(LAST_VISIT_KEY)
            .and_then(|s| serde_json::from_str::<NaiveDate>(&s).ok());

        if last_visit == Some(today) {
            return Ok(false);
        }

        debug!(?last_visit, %today, "New day, invalidating cache");
        self.store.remove(CACHE_KEY)?;
        self.store
            .set(LAST_VISIT_KEY, &serde_json::to_string(&today)?)?;
        Ok(true)
    }

    /// Removes both the record and the last-visit marker
    pub fn clear(&self) -> ApodResult<()> {
        self.store.remove(CACHE_KEY)?;
        self.store.remove(LAST_VISIT_KEY)?;
        Ok(())
    }
}
