mod cache_observer_port;
mod image_cache_port;
mod photo_fetch_port;
mod property_data_port;

pub use cache_observer_port::{CacheEvent, CacheObserverPort};
pub use image_cache_port::ImageCachePort;
pub use photo_fetch_port::PhotoFetchPort;
pub use property_data_port::PropertyDataPort;
