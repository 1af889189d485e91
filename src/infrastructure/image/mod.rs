//! Image handling infrastructure.
//!
//! This module provides:
//! - Upload URL resolution
//! - Persistent per-property photo storage
//! - Memory caching with LRU eviction
//! - Photo download over HTTP

pub mod disk_store;
pub mod fetcher;
pub mod http_source;
pub mod memory_cache;
pub mod photo_urls;
pub mod tracing_observer;

pub use disk_store::{DiskPhotoStore, format_size};
pub use fetcher::{FetchOutcome, PhotoFetcher};
pub use http_source::HttpPhotoSource;
pub use memory_cache::{CacheStats, MemoryImageCache};
pub use photo_urls::{InvalidServerUrl, PhotoUrlResolver};
pub use tracing_observer::TracingCacheObserver;
