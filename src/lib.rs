//! apodwall library
//!
//! Fetches NASA's Astronomy Picture of the Day, caches it per calendar day and
//! renders it as a page background stylesheet. Exposed as a library for the
//! binary and integration tests.

pub mod apod;
pub mod cache;
pub mod cli;
pub mod clock;
pub mod config;
pub mod error;
pub mod loader;
pub mod process;
pub mod refresh;
pub mod render;
