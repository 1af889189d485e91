//! Infrastructure layer with external service adapters.

/// Booklet server API client.
pub mod api;
/// Application configuration.
pub mod config;
/// Image handling (URL resolution, disk and memory caching, download).
pub mod image;

pub use api::LocAppClient;
pub use config::{AppConfig, CliArgs, Command, ConfigError, ConfigLoader, LogLevel};
pub use image::{
    CacheStats, DiskPhotoStore, HttpPhotoSource, MemoryImageCache, PhotoFetcher, PhotoUrlResolver,
    TracingCacheObserver, format_size,
};
