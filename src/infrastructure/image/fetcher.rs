//! Single-photo download into the disk store.

use std::sync::Arc;

use tracing::debug;

use crate::domain::entities::PhotoKey;
use crate::domain::errors::CacheResult;
use crate::domain::ports::{CacheEvent, CacheObserverPort, PhotoFetchPort};

use super::disk_store::DiskPhotoStore;

/// Result of one fetch attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    /// The photo is now on disk.
    Stored {
        /// Bytes written.
        size: u64,
    },
    /// Download or write failed; the photo stays uncached.
    Failed,
}

/// Downloads one photo and persists it.
///
/// The caller checks the disk store first; the fetcher always issues a
/// request. One GET per call, no retry.
pub struct PhotoFetcher {
    source: Arc<dyn PhotoFetchPort>,
    store: Arc<DiskPhotoStore>,
    observer: Arc<dyn CacheObserverPort>,
}

impl PhotoFetcher {
    /// Creates a fetcher writing into `store`.
    #[must_use]
    pub fn new(
        source: Arc<dyn PhotoFetchPort>,
        store: Arc<DiskPhotoStore>,
        observer: Arc<dyn CacheObserverPort>,
    ) -> Self {
        Self {
            source,
            store,
            observer,
        }
    }

    /// Fetches `url` and stores it under `key`. Failures are reported to
    /// the observer and never returned as errors.
    pub async fn fetch_and_store(&self, url: &str, key: &PhotoKey) -> FetchOutcome {
        match self.try_fetch_and_store(url, key).await {
            Ok(size) => {
                self.observer.record(&CacheEvent::PhotoStored {
                    key: key.clone(),
                    size,
                });
                FetchOutcome::Stored { size }
            }
            Err(error) if error.is_network_error() => {
                self.observer.record(&CacheEvent::FetchFailed {
                    url: url.to_string(),
                    error,
                });
                FetchOutcome::Failed
            }
            Err(error) => {
                self.observer.record(&CacheEvent::StorageFailed {
                    operation: "write photo",
                    error,
                });
                FetchOutcome::Failed
            }
        }
    }

    async fn try_fetch_and_store(&self, url: &str, key: &PhotoKey) -> CacheResult<u64> {
        let bytes = self.source.fetch(url).await?;
        debug!(key = %key, size = bytes.len(), "Fetched photo");
        self.store.try_write(key, bytes).await
    }
}

impl std::fmt::Debug for PhotoFetcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PhotoFetcher")
            .field("store", &self.store)
            .finish_non_exhaustive()
    }
}
