//! Application layer orchestrating the photo caches.

/// Download orchestration and per-view image resolution.
pub mod services;

pub use services::{ImageRequest, PhotoCacheManager, RemoteImage};
