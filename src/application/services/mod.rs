pub mod photo_cache_manager;
pub mod remote_image;

pub use photo_cache_manager::PhotoCacheManager;
pub use remote_image::{ImageRequest, RemoteImage};
