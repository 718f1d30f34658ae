//! Cache module for persisting the picture of the day
//!
//! The cache holds a single date-stamped record plus a last-visit marker, both
//! stored as JSON strings behind the `KeyValueStore` trait. `FileStore` keeps
//! them in an XDG-compliant cache directory; `MemoryStore` backs tests.

mod manager;
mod store;

pub use manager::{CacheManager, CacheRecord, CACHE_KEY, LAST_VISIT_KEY};
pub use store::{FileStore, KeyValueStore, MemoryStore};
