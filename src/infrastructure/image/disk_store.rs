//! Persistent per-property photo store.
//!
//! Layout: `<root>/<property slug>/{photos,access}/<filename>`. A file's
//! presence is the cache-hit signal, so files only ever appear at their
//! final path through an atomic rename.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use bytes::Bytes;
use tokio::fs;
use tracing::{debug, error, info, trace, warn};

use crate::domain::entities::{PhotoKey, PhotoKind};
use crate::domain::errors::{CacheError, CacheResult};
use crate::domain::ports::{CacheEvent, CacheObserverPort};

/// Name of the cache root below the platform data directory.
pub const PHOTOS_DIR_NAME: &str = "PropertyPhotos";

/// Disk-backed photo store. Every public operation is best-effort: failures
/// are reported to the observer and read back as a cache miss.
pub struct DiskPhotoStore {
    root: PathBuf,
    observer: Arc<dyn CacheObserverPort>,
}

impl std::fmt::Debug for DiskPhotoStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DiskPhotoStore")
            .field("root", &self.root)
            .finish_non_exhaustive()
    }
}

impl DiskPhotoStore {
    /// Creates a store rooted at `root`, creating the directory if needed.
    pub async fn new(root: PathBuf, observer: Arc<dyn CacheObserverPort>) -> Self {
        let store = Self { root, observer };
        if let Err(e) = fs::create_dir_all(&store.root).await {
            store.report("create cache root", CacheError::io("Failed to create cache root", &e));
        }
        store
    }

    /// Root directory of the store.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn property_dir(&self, property_slug: &str) -> PathBuf {
        self.root.join(property_slug)
    }

    fn kind_dir(&self, property_slug: &str, kind: PhotoKind) -> PathBuf {
        self.property_dir(property_slug).join(kind.subdir())
    }

    /// Final on-disk path of a photo.
    #[must_use]
    pub fn path_for(&self, key: &PhotoKey) -> PathBuf {
        self.kind_dir(key.property_slug(), key.kind())
            .join(key.filename())
    }

    fn report(&self, operation: &'static str, error: CacheError) {
        self.observer
            .record(&CacheEvent::StorageFailed { operation, error });
    }

    /// Creates both kind directories for a property. Idempotent.
    pub async fn ensure_directories(&self, property_slug: &str) {
        if let Err(e) = PhotoKey::check_slug(property_slug) {
            self.report("create directories", e);
            return;
        }
        for kind in PhotoKind::ALL {
            let dir = self.kind_dir(property_slug, kind);
            if let Err(e) = fs::create_dir_all(&dir).await {
                self.report(
                    "create directories",
                    CacheError::io(&format!("Failed to create {}", dir.display()), &e),
                );
            }
        }
    }

    /// Checks if a photo is cached.
    pub async fn exists(&self, key: &PhotoKey) -> bool {
        let path = self.path_for(key);
        fs::try_exists(&path).await.unwrap_or(false)
    }

    /// Returns the path of a cached photo without touching the async runtime.
    #[must_use]
    pub fn locate(&self, key: &PhotoKey) -> Option<PathBuf> {
        let path = self.path_for(key);
        path.is_file().then_some(path)
    }

    /// Stores photo bytes. Returns true if the photo is now on disk.
    pub async fn write(&self, key: &PhotoKey, bytes: Bytes) -> bool {
        match self.try_write(key, bytes).await {
            Ok(_) => true,
            Err(e) => {
                self.report("write photo", e);
                false
            }
        }
    }

    /// Stores photo bytes through a temporary file in the target directory,
    /// then renames it into place. Never creates directories.
    ///
    /// # Errors
    /// Returns error if the temporary file cannot be created, written or
    /// renamed. No file is left at the final path in that case.
    pub async fn try_write(&self, key: &PhotoKey, bytes: Bytes) -> CacheResult<u64> {
        let dir = self.kind_dir(key.property_slug(), key.kind());
        let path = self.path_for(key);
        let size = bytes.len() as u64;

        let target = path.clone();
        tokio::task::spawn_blocking(move || -> CacheResult<()> {
            let mut temp = tempfile::NamedTempFile::new_in(&dir)
                .map_err(|e| CacheError::io("Failed to create temp file", &e))?;
            temp.write_all(&bytes)
                .map_err(|e| CacheError::io("Failed to write temp file", &e))?;
            temp.as_file()
                .sync_all()
                .map_err(|e| CacheError::io("Failed to sync temp file", &e))?;
            temp.persist(&target)
                .map_err(|e| CacheError::io("Failed to rename cache file", &e.error))?;
            Ok(())
        })
        .await
        .map_err(|e| CacheError::IoError(format!("Write task panicked: {e}")))??;

        debug!(key = %key, path = %path.display(), size, "Stored photo on disk");
        Ok(size)
    }

    /// Gets raw photo bytes from disk.
    pub async fn read_bytes(&self, key: &PhotoKey) -> Option<Vec<u8>> {
        let path = self.path_for(key);
        match fs::read(&path).await {
            Ok(bytes) => {
                trace!(key = %key, "Disk cache hit");
                Some(bytes)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                trace!(key = %key, "Disk cache miss");
                None
            }
            Err(e) => {
                self.report("read photo", CacheError::io("Failed to read cache file", &e));
                None
            }
        }
    }

    /// Loads and decodes a photo. Corrupt files read as a miss.
    pub async fn read_image(&self, key: &PhotoKey) -> Option<Arc<image::DynamicImage>> {
        let bytes = self.read_bytes(key).await?;

        let result = tokio::task::spawn_blocking(move || image::load_from_memory(&bytes)).await;

        match result {
            Ok(Ok(img)) => {
                debug!(key = %key, "Decoded photo from disk");
                Some(Arc::new(img))
            }
            Ok(Err(e)) => {
                self.observer.record(&CacheEvent::DecodeFailed {
                    source: key.to_string(),
                    error: CacheError::DecodeError(e.to_string()),
                });
                None
            }
            Err(e) => {
                error!(key = %key, error = %e, "Decode task panicked");
                None
            }
        }
    }

    /// Removes every cached photo of a property.
    pub async fn delete_property(&self, property_slug: &str) {
        if let Err(e) = PhotoKey::check_slug(property_slug) {
            self.report("delete property", e);
            return;
        }
        let dir = self.property_dir(property_slug);
        match fs::remove_dir_all(&dir).await {
            Ok(()) => info!(property = property_slug, "Deleted cached photos"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(property = property_slug, "No cached photos to delete");
            }
            Err(e) => self.report(
                "delete property",
                CacheError::io("Failed to delete property photos", &e),
            ),
        }
    }

    /// Removes the whole store and recreates an empty root.
    pub async fn delete_all(&self) {
        match fs::remove_dir_all(&self.root).await {
            Ok(()) => info!("Deleted all cached photos"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => {
                self.report("delete all", CacheError::io("Failed to delete cache root", &e));
                return;
            }
        }
        if let Err(e) = fs::create_dir_all(&self.root).await {
            self.report("delete all", CacheError::io("Failed to recreate cache root", &e));
        }
    }

    /// Total size of every file under the root, in bytes.
    ///
    /// Walks the whole tree on each call.
    pub async fn total_size_bytes(&self) -> u64 {
        let mut total = 0u64;
        let mut pending = vec![self.root.clone()];

        while let Some(dir) = pending.pop() {
            let mut entries = match fs::read_dir(&dir).await {
                Ok(entries) => entries,
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => continue,
                Err(e) => {
                    warn!(dir = %dir.display(), error = %e, "Failed to scan cache directory");
                    continue;
                }
            };

            while let Ok(Some(entry)) = entries.next_entry().await {
                let Ok(file_type) = entry.file_type().await else {
                    continue;
                };
                if file_type.is_dir() {
                    pending.push(entry.path());
                } else if file_type.is_file()
                    && let Ok(meta) = entry.metadata().await
                {
                    total += meta.len();
                }
            }
        }

        total
    }
}

/// Formats a byte count with decimal units, the way file sizes are shown to
/// users.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn format_size(bytes: u64) -> String {
    const KB: f64 = 1000.0;
    const MB: f64 = KB * 1000.0;
    const GB: f64 = MB * 1000.0;

    // Units are picked after rounding so 999_999 reads "1.0 MB", not "1000 KB".
    let value = bytes as f64;
    let kb = (value / KB).round();
    let mb = (value / MB * 10.0).round() / 10.0;
    if bytes < 1000 {
        format!("{bytes} bytes")
    } else if kb < 1000.0 {
        format!("{kb:.0} KB")
    } else if mb < 1000.0 {
        format!("{mb:.1} MB")
    } else {
        format!("{:.2} GB", value / GB)
    }
}
