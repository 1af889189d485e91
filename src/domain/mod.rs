//! Domain layer with core photo cache entities and port definitions.

/// Entity definitions.
pub mod entities;
/// Error types.
pub mod errors;
/// Port definitions.
pub mod ports;

pub use entities::{PhotoKey, PhotoKind, PhotoRef, PropertyManifest};
pub use errors::{ApiError, CacheError, CacheResult};
pub use ports::{CacheEvent, CacheObserverPort, PhotoFetchPort, PropertyDataPort};
