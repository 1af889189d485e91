//! Domain types for decoded images and their resolution state.

use std::sync::Arc;

/// Where an image was resolved from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageSource {
    /// Loaded from the persistent photo store.
    DiskCache,
    /// Loaded from in-memory LRU cache.
    MemoryCache,
    /// Downloaded from network.
    Network,
}

impl std::fmt::Display for ImageSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DiskCache => write!(f, "disk"),
            Self::MemoryCache => write!(f, "memory"),
            Self::Network => write!(f, "network"),
        }
    }
}

/// A decoded image ready for display.
#[derive(Debug, Clone)]
pub struct LoadedImage {
    /// The decoded pixels.
    pub image: Arc<image::DynamicImage>,
    /// Which tier served the image.
    pub source: ImageSource,
}

impl LoadedImage {
    /// Wraps a decoded image.
    #[must_use]
    pub const fn new(image: Arc<image::DynamicImage>, source: ImageSource) -> Self {
        Self { image, source }
    }
}

/// State of a single image request.
///
/// Starts in `Loading` and reaches exactly one terminal state.
#[derive(Debug, Clone, Default)]
pub enum ImageState {
    /// Resolution in progress.
    #[default]
    Loading,
    /// Image available.
    Loaded(LoadedImage),
    /// No image could be produced; the caller shows its placeholder.
    Fallback,
}

impl ImageState {
    /// Returns true while resolution is still running.
    #[must_use]
    pub const fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }

    /// Returns true once an image is available.
    #[must_use]
    pub const fn is_loaded(&self) -> bool {
        matches!(self, Self::Loaded(_))
    }

    /// Returns true if the request ended without an image.
    #[must_use]
    pub const fn is_fallback(&self) -> bool {
        matches!(self, Self::Fallback)
    }

    /// Returns the tier that served the image, if loaded.
    #[must_use]
    pub fn source(&self) -> Option<ImageSource> {
        match self {
            Self::Loaded(loaded) => Some(loaded.source),
            _ => None,
        }
    }
}
