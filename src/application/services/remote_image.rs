//! Per-request image resolution for UI code.
//!
//! Tiers, first match wins: persistent photo store, memory cache, network.
//! A request resolves once; a loaded or fallback state is never revisited.

use std::sync::Arc;

use tokio::sync::watch;
use tracing::{debug, trace};

use crate::domain::entities::{ImageSource, ImageState, LoadedImage, PhotoKey, PhotoKind};
use crate::domain::errors::{CacheError, CacheResult};
use crate::domain::ports::{CacheEvent, CacheObserverPort, ImageCachePort, PhotoFetchPort};
use crate::infrastructure::image::{DiskPhotoStore, PhotoUrlResolver};

/// What a view wants to display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRequest {
    url: Option<String>,
    property_slug: Option<String>,
    filename: Option<String>,
    kind: PhotoKind,
}

impl ImageRequest {
    /// A property photo, looked up on disk first and otherwise downloaded
    /// from its upload URL.
    #[must_use]
    pub fn photo(
        property_slug: impl Into<String>,
        filename: impl Into<String>,
        kind: PhotoKind,
    ) -> Self {
        Self {
            url: None,
            property_slug: Some(property_slug.into()),
            filename: Some(filename.into()),
            kind,
        }
    }

    /// An arbitrary remote image (avatar, header). Skips the photo store.
    #[must_use]
    pub fn url(url: impl Into<String>) -> Self {
        Self {
            url: Some(url.into()),
            property_slug: None,
            filename: None,
            kind: PhotoKind::Standard,
        }
    }

    /// Uses `url` instead of the computed upload URL.
    #[must_use]
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    fn photo_parts(&self) -> Option<(&str, &str)> {
        Some((self.property_slug.as_deref()?, self.filename.as_deref()?))
    }
}

/// Resolves [`ImageRequest`]s into [`ImageState`]s.
pub struct RemoteImage {
    store: Arc<DiskPhotoStore>,
    memory: Arc<dyn ImageCachePort>,
    source: Arc<dyn PhotoFetchPort>,
    resolver: PhotoUrlResolver,
    observer: Arc<dyn CacheObserverPort>,
}

impl std::fmt::Debug for RemoteImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteImage")
            .field("store", &self.store)
            .field("memory_entries", &self.memory.len())
            .finish_non_exhaustive()
    }
}

impl RemoteImage {
    /// Creates an adapter over the shared caches.
    #[must_use]
    pub fn new(
        store: Arc<DiskPhotoStore>,
        memory: Arc<dyn ImageCachePort>,
        source: Arc<dyn PhotoFetchPort>,
        resolver: PhotoUrlResolver,
        observer: Arc<dyn CacheObserverPort>,
    ) -> Self {
        Self {
            store,
            memory,
            source,
            resolver,
            observer,
        }
    }

    /// Starts resolving `request` on a background task. The receiver starts
    /// at `Loading` and changes exactly once, to `Loaded` or `Fallback`.
    #[must_use]
    pub fn mount(self: &Arc<Self>, request: ImageRequest) -> watch::Receiver<ImageState> {
        let (tx, rx) = watch::channel(ImageState::Loading);
        let this = Arc::clone(self);
        tokio::spawn(async move {
            let state = this.resolve(&request).await;
            tx.send_replace(state);
        });
        rx
    }

    /// Resolves `request` to its terminal state. Never fails; any error ends
    /// in `Fallback` and is reported to the observer.
    pub async fn resolve(&self, request: &ImageRequest) -> ImageState {
        if let Some((slug, filename)) = request.photo_parts()
            && let Ok(key) = PhotoKey::new(slug, filename, request.kind)
            && let Some(image) = self.store.read_image(&key).await
        {
            trace!(key = %key, "Resolved image from photo store");
            return ImageState::Loaded(LoadedImage::new(image, ImageSource::DiskCache));
        }

        let Some(url) = self.effective_url(request) else {
            debug!("No URL for image request, using fallback");
            return ImageState::Fallback;
        };

        if let Some(image) = self.memory.get(&url).await {
            return ImageState::Loaded(LoadedImage::new(image, ImageSource::MemoryCache));
        }

        match self.download(&url).await {
            Ok(image) => {
                self.memory.put(url.clone(), image.clone()).await;
                debug!(url = %url, "Image loaded from network");
                ImageState::Loaded(LoadedImage::new(image, ImageSource::Network))
            }
            Err(error @ CacheError::DecodeError(_)) => {
                self.observer.record(&CacheEvent::DecodeFailed { source: url, error });
                ImageState::Fallback
            }
            Err(error) => {
                self.observer.record(&CacheEvent::FetchFailed { url, error });
                ImageState::Fallback
            }
        }
    }

    fn effective_url(&self, request: &ImageRequest) -> Option<String> {
        if let Some(url) = &request.url {
            return Some(url.clone());
        }
        let (slug, filename) = request.photo_parts()?;
        Some(self.resolver.photo_url(slug, filename, request.kind))
    }

    async fn download(&self, url: &str) -> CacheResult<Arc<image::DynamicImage>> {
        let bytes = self.source.fetch(url).await?;

        let decoded = tokio::task::spawn_blocking(move || image::load_from_memory(&bytes))
            .await
            .map_err(|e| CacheError::DecodeError(format!("Decode task panicked: {e}")))?
            .map_err(|e| CacheError::DecodeError(format!("Failed to decode image: {e}")))?;

        Ok(Arc::new(decoded))
    }
}
