//! Bulk photo download and cached-photo lookup per property.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::domain::entities::{DownloadReport, DownloadSession, PhotoKey, PhotoKind};
use crate::domain::ports::{CacheEvent, CacheObserverPort, PhotoFetchPort, PropertyDataPort};
use crate::infrastructure::image::{
    DiskPhotoStore, FetchOutcome, PhotoFetcher, PhotoUrlResolver, format_size,
};

/// Keeps every photo of a property available offline.
///
/// A download session walks the property manifest, skips photos already on
/// disk and fetches the rest one at a time. Sessions for the same property
/// are serialized; sessions for different properties may overlap and share
/// the published [`DownloadSession`] state. No failure escapes this type:
/// each one is reported to the observer and the photo simply stays uncached.
pub struct PhotoCacheManager {
    provider: Arc<dyn PropertyDataPort>,
    store: Arc<DiskPhotoStore>,
    fetcher: PhotoFetcher,
    resolver: PhotoUrlResolver,
    observer: Arc<dyn CacheObserverPort>,
    session_tx: watch::Sender<DownloadSession>,
    // Entries live while a session or deletion holds or awaits them.
    property_locks: Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>,
}

impl std::fmt::Debug for PhotoCacheManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PhotoCacheManager")
            .field("store", &self.store)
            .field("session", &*self.session_tx.borrow())
            .finish_non_exhaustive()
    }
}

impl PhotoCacheManager {
    /// Creates a manager over an existing photo store.
    #[must_use]
    pub fn new(
        provider: Arc<dyn PropertyDataPort>,
        source: Arc<dyn PhotoFetchPort>,
        store: Arc<DiskPhotoStore>,
        resolver: PhotoUrlResolver,
        observer: Arc<dyn CacheObserverPort>,
    ) -> Self {
        let fetcher = PhotoFetcher::new(source, store.clone(), observer.clone());
        let (session_tx, _) = watch::channel(DownloadSession::idle());
        Self {
            provider,
            store,
            fetcher,
            resolver,
            observer,
            session_tx,
            property_locks: Mutex::new(HashMap::new()),
        }
    }

    /// Subscribes to download session updates.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<DownloadSession> {
        self.session_tx.subscribe()
    }

    /// Current download session state.
    #[must_use]
    pub fn session(&self) -> DownloadSession {
        self.session_tx.borrow().clone()
    }

    /// The underlying photo store.
    #[must_use]
    pub const fn store(&self) -> &Arc<DiskPhotoStore> {
        &self.store
    }

    /// The URL resolver used for downloads.
    #[must_use]
    pub const fn resolver(&self) -> &PhotoUrlResolver {
        &self.resolver
    }

    fn property_lock(&self, property_slug: &str) -> Arc<tokio::sync::Mutex<()>> {
        self.property_locks
            .lock()
            .entry(property_slug.to_string())
            .or_default()
            .clone()
    }

    fn release_property_lock(&self, property_slug: &str, lock: Arc<tokio::sync::Mutex<()>>) {
        let mut locks = self.property_locks.lock();
        drop(lock);
        if locks
            .get(property_slug)
            .is_some_and(|l| Arc::strong_count(l) == 1)
        {
            locks.remove(property_slug);
        }
    }

    /// Downloads every photo of the property attached to `reservation_id`
    /// that is not already on disk.
    ///
    /// Photos are visited in manifest order, standard before access photos.
    /// Progress is published after each one, whatever its outcome, and is
    /// forced to 1.0 when the session ends. A manifest failure ends the
    /// session immediately, exactly like an empty manifest.
    pub async fn download_photos_for_property(
        &self,
        reservation_id: u64,
        property_slug: &str,
    ) -> DownloadReport {
        let lock = self.property_lock(property_slug);
        let report = {
            let _guard = lock.lock().await;
            self.run_session(reservation_id, property_slug).await
        };
        self.release_property_lock(property_slug, lock);
        report
    }

    async fn run_session(&self, reservation_id: u64, property_slug: &str) -> DownloadReport {
        self.session_tx
            .send_replace(DownloadSession::started(property_slug));
        self.observer.record(&CacheEvent::SessionStarted {
            reservation_id,
            property_slug: property_slug.to_string(),
        });

        let mut report = DownloadReport::default();

        let manifest = match self.provider.property_manifest(reservation_id).await {
            Ok(manifest) => manifest,
            Err(e) => {
                self.observer
                    .record(&CacheEvent::manifest_failed(reservation_id, &e));
                report.manifest_failed = true;
                self.finish_session(property_slug, report);
                return report;
            }
        };

        if manifest.property_slug != property_slug {
            warn!(
                requested = property_slug,
                manifest = %manifest.property_slug,
                "Manifest belongs to a different property slug; caching under the requested one"
            );
        }

        self.store.ensure_directories(property_slug).await;

        report.total = manifest.total();
        #[allow(clippy::cast_precision_loss)]
        let denominator = report.total.max(1) as f64;
        let mut accounted = 0usize;

        for photo in manifest.iter() {
            match PhotoKey::for_ref(property_slug, photo) {
                Ok(key) => {
                    if self.store.exists(&key).await {
                        report.skipped += 1;
                        self.observer.record(&CacheEvent::PhotoSkipped { key });
                    } else {
                        let url =
                            self.resolver
                                .photo_url(property_slug, &photo.filename, photo.kind);
                        match self.fetcher.fetch_and_store(&url, &key).await {
                            FetchOutcome::Stored { .. } => report.fetched += 1,
                            FetchOutcome::Failed => report.failed += 1,
                        }
                    }
                }
                Err(error) => {
                    report.failed += 1;
                    self.observer.record(&CacheEvent::InvalidEntry {
                        property_slug: property_slug.to_string(),
                        filename: photo.filename.clone(),
                        error,
                    });
                }
            }

            accounted += 1;
            #[allow(clippy::cast_precision_loss)]
            let progress = accounted as f64 / denominator;
            self.session_tx.send_modify(|s| s.progress = progress);
            self.observer.record(&CacheEvent::Progress {
                property_slug: property_slug.to_string(),
                progress,
            });
        }

        self.finish_session(property_slug, report);
        report
    }

    fn finish_session(&self, property_slug: &str, report: DownloadReport) {
        self.session_tx.send_modify(DownloadSession::finish);
        self.observer.record(&CacheEvent::SessionFinished {
            property_slug: property_slug.to_string(),
            report,
        });
    }

    /// Local path of a cached photo, or `None` if it is not on disk.
    /// Only the disk store is consulted.
    #[must_use]
    pub fn cached_photo_path(
        &self,
        property_slug: &str,
        filename: &str,
        kind: PhotoKind,
    ) -> Option<PathBuf> {
        let key = PhotoKey::new(property_slug, filename, kind).ok()?;
        self.store.locate(&key)
    }

    /// Decoded cached photo, or `None` if missing or unreadable.
    /// Only the disk store is consulted.
    pub async fn cached_image(
        &self,
        property_slug: &str,
        filename: &str,
        kind: PhotoKind,
    ) -> Option<Arc<image::DynamicImage>> {
        let key = PhotoKey::new(property_slug, filename, kind).ok()?;
        self.store.read_image(&key).await
    }

    /// Deletes every cached photo of a property. Waits for a running
    /// session of the same property to finish first.
    pub async fn delete_photos_for_property(&self, property_slug: &str) {
        let lock = self.property_lock(property_slug);
        {
            let _guard = lock.lock().await;
            self.store.delete_property(property_slug).await;
        }
        self.release_property_lock(property_slug, lock);
    }

    /// Deletes every cached photo.
    pub async fn delete_all_photos(&self) {
        self.store.delete_all().await;
        debug!("Photo store reset");
    }

    /// Size of the whole photo store in bytes.
    pub async fn cache_size(&self) -> u64 {
        self.store.total_size_bytes().await
    }

    /// Size of the whole photo store, formatted for display.
    pub async fn formatted_cache_size(&self) -> String {
        let size = self.cache_size().await;
        let formatted = format_size(size);
        info!(bytes = size, size = %formatted, "Computed photo cache size");
        formatted
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use bytes::Bytes;
    use tempfile::TempDir;

    use crate::domain::entities::PropertyManifest;
    use crate::domain::errors::{ApiError, CacheError};
    use crate::domain::ports::mocks::{
        MockPhotoSource, MockPropertyDataPort, RecordingObserver, StaticPropertyData,
    };

    const SERVER: &str = "https://booklet.example.com";
    const SLUG: &str = "mazet-bsa";
    const RESERVATION: u64 = 42;

    struct Fixture {
        manager: PhotoCacheManager,
        provider: Arc<StaticPropertyData>,
        source: Arc<MockPhotoSource>,
        observer: Arc<RecordingObserver>,
        _temp: TempDir,
    }

    async fn fixture_with(manifest: PropertyManifest, source: MockPhotoSource) -> Fixture {
        let temp = TempDir::new().unwrap();
        let observer = Arc::new(RecordingObserver::new());
        let store = Arc::new(DiskPhotoStore::new(temp.path().join("photos"), observer.clone()).await);
        let provider = Arc::new(StaticPropertyData::with_manifest(RESERVATION, manifest));
        let source = Arc::new(source);
        let resolver = PhotoUrlResolver::new(SERVER).unwrap();

        for photo in [
            ("a.jpg", PhotoKind::Standard),
            ("b.jpg", PhotoKind::Standard),
            ("keybox.jpg", PhotoKind::AccessRestricted),
        ] {
            source.serve(
                resolver.photo_url(SLUG, photo.0, photo.1),
                format!("bytes of {}", photo.0),
            );
        }

        let manager = PhotoCacheManager::new(
            provider.clone(),
            source.clone(),
            store,
            resolver,
            observer.clone(),
        );
        Fixture {
            manager,
            provider,
            source,
            observer,
            _temp: temp,
        }
    }

    async fn fixture(manifest: PropertyManifest) -> Fixture {
        fixture_with(manifest, MockPhotoSource::new()).await
    }

    fn two_photos() -> PropertyManifest {
        PropertyManifest::new(SLUG)
            .with_photo("a.jpg")
            .with_photo("b.jpg")
    }

    fn assert_complete(session: &DownloadSession) {
        assert!(!session.is_downloading);
        assert!((session.progress - 1.0).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn test_first_session_fetches_everything() {
        let f = fixture(two_photos()).await;

        let report = f
            .manager
            .download_photos_for_property(RESERVATION, SLUG)
            .await;

        assert_eq!(report.fetched, 2);
        assert_eq!(f.source.fetch_count(), 2);
        assert_eq!(f.observer.progress_values(), vec![0.5, 1.0]);
        assert_complete(&f.manager.session());
        assert!(
            f.manager
                .cached_photo_path(SLUG, "a.jpg", PhotoKind::Standard)
                .is_some()
        );
    }

    #[tokio::test]
    async fn test_second_session_is_idempotent() {
        let f = fixture(two_photos()).await;

        f.manager
            .download_photos_for_property(RESERVATION, SLUG)
            .await;
        let report = f
            .manager
            .download_photos_for_property(RESERVATION, SLUG)
            .await;

        assert_eq!(f.source.fetch_count(), 2);
        assert_eq!(report.skipped, 2);
        assert_eq!(report.fetched, 0);
        assert_complete(&f.manager.session());
    }

    #[tokio::test]
    async fn test_standard_photos_before_access_photos() {
        let manifest = PropertyManifest::new(SLUG)
            .with_access_photo("keybox.jpg")
            .with_photo("b.jpg")
            .with_photo("a.jpg");
        let f = fixture(manifest).await;

        f.manager
            .download_photos_for_property(RESERVATION, SLUG)
            .await;

        let resolver = f.manager.resolver();
        assert_eq!(
            f.source.requested(),
            vec![
                resolver.photo_url(SLUG, "b.jpg", PhotoKind::Standard),
                resolver.photo_url(SLUG, "a.jpg", PhotoKind::Standard),
                resolver.photo_url(SLUG, "keybox.jpg", PhotoKind::AccessRestricted),
            ]
        );
        assert!(
            f.manager
                .cached_photo_path(SLUG, "keybox.jpg", PhotoKind::AccessRestricted)
                .is_some()
        );
        assert!(
            f.manager
                .cached_photo_path(SLUG, "keybox.jpg", PhotoKind::Standard)
                .is_none()
        );
    }

    #[tokio::test]
    async fn test_progress_is_monotonic_and_ends_at_one() {
        let manifest = two_photos()
            .with_photo("missing.jpg")
            .with_access_photo("keybox.jpg");
        let f = fixture(manifest).await;

        let report = f
            .manager
            .download_photos_for_property(RESERVATION, SLUG)
            .await;

        let values = f.observer.progress_values();
        assert_eq!(values.len(), 4);
        assert!(values.windows(2).all(|w| w[0] <= w[1]));
        assert!((values[3] - 1.0).abs() < f64::EPSILON);
        assert_eq!(report.failed, 1);
        assert_eq!(report.fetched, 3);
        assert_complete(&f.manager.session());
    }

    #[tokio::test]
    async fn test_empty_manifest_completes_without_fetching() {
        let f = fixture(PropertyManifest::new(SLUG)).await;

        let report = f
            .manager
            .download_photos_for_property(RESERVATION, SLUG)
            .await;

        assert_eq!(report.total, 0);
        assert_eq!(f.source.fetch_count(), 0);
        assert!(f.observer.progress_values().is_empty());
        assert_complete(&f.manager.session());
    }

    #[tokio::test]
    async fn test_manifest_failure_ends_session() {
        let f = fixture(two_photos()).await;

        let report = f.manager.download_photos_for_property(7, SLUG).await;

        assert!(report.manifest_failed);
        assert_eq!(f.source.fetch_count(), 0);
        assert_complete(&f.manager.session());
        assert!(
            f.observer
                .events()
                .iter()
                .any(|e| matches!(e, CacheEvent::ManifestFailed { reservation_id: 7, .. }))
        );
    }

    #[tokio::test]
    async fn test_unauthorized_provider_is_not_an_error() {
        let temp = TempDir::new().unwrap();
        let observer = Arc::new(RecordingObserver::new());
        let store = Arc::new(DiskPhotoStore::new(temp.path().to_path_buf(), observer.clone()).await);
        let mut provider = MockPropertyDataPort::new();
        provider
            .expect_property_manifest()
            .times(1)
            .returning(|_| Err(ApiError::Unauthorized));
        let source = Arc::new(MockPhotoSource::new());
        let manager = PhotoCacheManager::new(
            Arc::new(provider),
            source.clone(),
            store,
            PhotoUrlResolver::new(SERVER).unwrap(),
            observer.clone(),
        );

        let report = manager.download_photos_for_property(RESERVATION, SLUG).await;

        assert!(report.manifest_failed);
        assert_eq!(observer.failure_count(), 1);
        assert_complete(&manager.session());
    }

    #[tokio::test]
    async fn test_fetch_failure_does_not_abort_batch() {
        let manifest = PropertyManifest::new(SLUG)
            .with_photo("a.jpg")
            .with_photo("b.jpg");
        let f = fixture(manifest).await;
        let resolver = f.manager.resolver().clone();
        f.source.fail(
            resolver.photo_url(SLUG, "a.jpg", PhotoKind::Standard),
            CacheError::NetworkError("connection reset".to_string()),
        );

        let report = f
            .manager
            .download_photos_for_property(RESERVATION, SLUG)
            .await;

        assert_eq!(report.failed, 1);
        assert_eq!(report.fetched, 1);
        assert!(
            f.manager
                .cached_photo_path(SLUG, "a.jpg", PhotoKind::Standard)
                .is_none()
        );

        // The failed photo is retried on the next session only.
        f.source.serve(
            resolver.photo_url(SLUG, "a.jpg", PhotoKind::Standard),
            Bytes::from_static(b"late bytes"),
        );
        let report = f
            .manager
            .download_photos_for_property(RESERVATION, SLUG)
            .await;
        assert_eq!(report.fetched, 1);
        assert_eq!(report.skipped, 1);
    }

    #[tokio::test]
    async fn test_invalid_filename_is_skipped() {
        let manifest = PropertyManifest::new(SLUG)
            .with_photo("../escape.jpg")
            .with_photo("a.jpg");
        let f = fixture(manifest).await;

        let report = f
            .manager
            .download_photos_for_property(RESERVATION, SLUG)
            .await;

        assert_eq!(report.failed, 1);
        assert_eq!(report.fetched, 1);
        assert_eq!(f.source.fetch_count(), 1);
        assert_eq!(f.observer.progress_values(), vec![0.5, 1.0]);
    }

    #[tokio::test]
    async fn test_delete_property_forces_refetch() {
        let f = fixture(two_photos()).await;
        f.manager
            .download_photos_for_property(RESERVATION, SLUG)
            .await;

        f.manager.delete_photos_for_property(SLUG).await;

        for name in ["a.jpg", "b.jpg"] {
            assert!(
                f.manager
                    .cached_photo_path(SLUG, name, PhotoKind::Standard)
                    .is_none()
            );
        }
        let report = f
            .manager
            .download_photos_for_property(RESERVATION, SLUG)
            .await;
        assert_eq!(report.fetched, 2);
        assert_eq!(f.source.fetch_count(), 4);
    }

    #[tokio::test]
    async fn test_delete_all_and_cache_size() {
        let f = fixture(two_photos()).await;
        f.manager
            .download_photos_for_property(RESERVATION, SLUG)
            .await;

        // "bytes of a.jpg" + "bytes of b.jpg"
        assert_eq!(f.manager.cache_size().await, 28);
        assert_eq!(f.manager.formatted_cache_size().await, "28 bytes");

        f.manager.delete_all_photos().await;

        assert_eq!(f.manager.cache_size().await, 0);
        assert!(
            f.manager
                .cached_photo_path(SLUG, "a.jpg", PhotoKind::Standard)
                .is_none()
        );
    }

    #[tokio::test]
    async fn test_cached_image_reads_disk_only() {
        let f = fixture(PropertyManifest::new(SLUG).with_photo("pic.png")).await;
        let url = f
            .manager
            .resolver()
            .photo_url(SLUG, "pic.png", PhotoKind::Standard);
        f.source.serve(url, crate::test_support::sample_png(3, 2));

        assert!(
            f.manager
                .cached_image(SLUG, "pic.png", PhotoKind::Standard)
                .await
                .is_none()
        );
        f.manager
            .download_photos_for_property(RESERVATION, SLUG)
            .await;
        let fetches = f.source.fetch_count();

        let img = f
            .manager
            .cached_image(SLUG, "pic.png", PhotoKind::Standard)
            .await
            .unwrap();
        assert_eq!((img.width(), img.height()), (3, 2));
        assert_eq!(f.source.fetch_count(), fetches);
    }

    #[tokio::test]
    async fn test_concurrent_sessions_for_same_property_serialize() {
        let f = fixture_with(
            two_photos(),
            MockPhotoSource::new().with_delay(Duration::from_millis(20)),
        )
        .await;

        let (first, second) = tokio::join!(
            f.manager.download_photos_for_property(RESERVATION, SLUG),
            f.manager.download_photos_for_property(RESERVATION, SLUG),
        );

        assert_eq!(f.source.fetch_count(), 2);
        assert_eq!(first.fetched + second.fetched, 2);
        assert_eq!(first.skipped + second.skipped, 2);
        assert!(f.manager.property_locks.lock().is_empty());
    }

    #[tokio::test]
    async fn test_property_locks_are_released() {
        let f = fixture(two_photos()).await;

        f.manager
            .download_photos_for_property(RESERVATION, SLUG)
            .await;
        assert!(f.manager.property_locks.lock().is_empty());

        let held = f.manager.property_lock(SLUG);
        let guard = held.lock().await;
        let deletion = f.manager.delete_photos_for_property(SLUG);
        tokio::pin!(deletion);
        // Deletion waits behind the held lock; the registry entry must survive.
        assert!(
            tokio::time::timeout(Duration::from_millis(20), &mut deletion)
                .await
                .is_err()
        );
        drop(guard);
        deletion.await;
        assert!(f.manager.property_locks.lock().contains_key(SLUG));

        f.manager.release_property_lock(SLUG, held);
        assert!(f.manager.property_locks.lock().is_empty());
    }

    #[tokio::test]
    async fn test_subscribers_see_session_lifecycle() {
        let f = fixture(two_photos()).await;
        let mut rx = f.manager.subscribe();
        assert!(!rx.borrow().is_downloading);

        f.manager
            .download_photos_for_property(RESERVATION, SLUG)
            .await;

        assert!(rx.has_changed().unwrap());
        let session = rx.borrow_and_update().clone();
        assert_complete(&session);
        assert_eq!(session.property_slug.as_deref(), Some(SLUG));
        assert!(session.started_at.is_some());
    }

    #[tokio::test]
    async fn test_manifest_update_adds_new_photos_only() {
        let f = fixture(two_photos()).await;
        f.manager
            .download_photos_for_property(RESERVATION, SLUG)
            .await;

        f.provider
            .set(RESERVATION, two_photos().with_access_photo("keybox.jpg"));
        let report = f
            .manager
            .download_photos_for_property(RESERVATION, SLUG)
            .await;

        assert_eq!(report.total, 3);
        assert_eq!(report.skipped, 2);
        assert_eq!(report.fetched, 1);
        assert_eq!(f.source.fetch_count(), 3);
    }
}
