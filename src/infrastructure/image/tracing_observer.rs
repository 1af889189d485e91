//! Default cache observer that writes events to the tracing subscriber.

use tracing::{debug, info, warn};

use crate::domain::ports::{CacheEvent, CacheObserverPort};

/// Logs every cache event at a level matching its severity.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingCacheObserver;

impl CacheObserverPort for TracingCacheObserver {
    fn record(&self, event: &CacheEvent) {
        match event {
            CacheEvent::SessionStarted {
                reservation_id,
                property_slug,
            } => info!(reservation_id, property = %property_slug, "Photo download started"),
            CacheEvent::ManifestFailed {
                reservation_id,
                error,
            } => warn!(reservation_id, error = %error, "Failed to retrieve property photos"),
            CacheEvent::InvalidEntry {
                property_slug,
                filename,
                error,
            } => warn!(property = %property_slug, filename = %filename, error = %error, "Skipping manifest entry"),
            CacheEvent::PhotoSkipped { key } => debug!(key = %key, "Photo already cached"),
            CacheEvent::PhotoStored { key, size } => debug!(key = %key, size, "Photo cached"),
            CacheEvent::FetchFailed { url, error } => {
                warn!(url = %url, error = %error, "Failed to download photo");
            }
            CacheEvent::StorageFailed { operation, error } => {
                warn!(operation, error = %error, "Photo store operation failed");
            }
            CacheEvent::DecodeFailed { source, error } => {
                warn!(source = %source, error = %error, "Failed to decode image");
            }
            CacheEvent::Progress {
                property_slug,
                progress,
            } => debug!(property = %property_slug, progress, "Download progress"),
            CacheEvent::SessionFinished {
                property_slug,
                report,
            } => info!(property = %property_slug, %report, "Photo download finished"),
        }
    }
}
