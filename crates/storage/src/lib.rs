//! Storage abstractions for parcel imagery analysis.
//!
//! Provides:
//! - An injected, memory-bounded LRU cache for fetched image payloads

pub mod image_cache;

pub use image_cache::{ImageCache, ImageCacheStats};
