//! Observability hook for the photo cache.

use crate::domain::entities::{DownloadReport, PhotoKey};
use crate::domain::errors::{ApiError, CacheError};

/// Something worth reporting that happened inside the cache.
///
/// Failures never propagate to callers; this is the only channel through
/// which they surface.
#[derive(Debug, Clone)]
pub enum CacheEvent {
    /// A bulk download session started.
    SessionStarted {
        /// Reservation whose manifest is requested.
        reservation_id: u64,
        /// Property being downloaded.
        property_slug: String,
    },
    /// The manifest could not be retrieved; the session ends early.
    ManifestFailed {
        /// Reservation whose manifest was requested.
        reservation_id: u64,
        /// Provider error, rendered.
        error: String,
    },
    /// A manifest entry could not be mapped onto the disk layout.
    InvalidEntry {
        /// Offending property slug.
        property_slug: String,
        /// Offending filename.
        filename: String,
        /// Validation failure.
        error: CacheError,
    },
    /// A photo was already on disk.
    PhotoSkipped {
        /// The cached photo.
        key: PhotoKey,
    },
    /// A photo was downloaded and persisted.
    PhotoStored {
        /// The stored photo.
        key: PhotoKey,
        /// Bytes written.
        size: u64,
    },
    /// Downloading a photo failed.
    FetchFailed {
        /// Requested URL.
        url: String,
        /// Network failure.
        error: CacheError,
    },
    /// A filesystem operation failed.
    StorageFailed {
        /// What was being done.
        operation: &'static str,
        /// Filesystem failure.
        error: CacheError,
    },
    /// Bytes were retrieved but could not be decoded as an image.
    DecodeFailed {
        /// URL or key of the image.
        source: String,
        /// Decoder failure.
        error: CacheError,
    },
    /// Session progress moved.
    Progress {
        /// Property being downloaded.
        property_slug: String,
        /// New progress value.
        progress: f64,
    },
    /// A bulk download session ended.
    SessionFinished {
        /// Property that was downloaded.
        property_slug: String,
        /// Session counters.
        report: DownloadReport,
    },
}

impl CacheEvent {
    /// Builds a manifest failure event.
    #[must_use]
    pub fn manifest_failed(reservation_id: u64, error: &ApiError) -> Self {
        Self::ManifestFailed {
            reservation_id,
            error: error.to_string(),
        }
    }

    /// Returns true for events describing a failure.
    #[must_use]
    pub const fn is_failure(&self) -> bool {
        matches!(
            self,
            Self::ManifestFailed { .. }
                | Self::InvalidEntry { .. }
                | Self::FetchFailed { .. }
                | Self::StorageFailed { .. }
                | Self::DecodeFailed { .. }
        )
    }
}

/// Receives cache events. Called inline, so implementations must be cheap.
pub trait CacheObserverPort: Send + Sync {
    /// Records one event.
    fn record(&self, event: &CacheEvent);
}
