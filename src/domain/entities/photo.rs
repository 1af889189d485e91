//! Photo identity and property manifest types.

use serde::{Deserialize, Serialize};

use crate::domain::errors::{CacheError, CacheResult};

/// Classification of a property photo.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PhotoKind {
    /// General property photo.
    Standard,
    /// Entry or keybox photo, shown only once access instructions are unlocked.
    AccessRestricted,
}

impl PhotoKind {
    /// Name of the directory holding this kind, both on disk and on the server.
    #[must_use]
    pub const fn subdir(self) -> &'static str {
        match self {
            Self::Standard => "photos",
            Self::AccessRestricted => "access",
        }
    }

    /// Both kinds, in session processing order.
    pub const ALL: [Self; 2] = [Self::Standard, Self::AccessRestricted];
}

impl std::fmt::Display for PhotoKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Standard => write!(f, "standard"),
            Self::AccessRestricted => write!(f, "access"),
        }
    }
}

/// A single photo listed in a property manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhotoRef {
    /// Server-side file name, also used as the on-disk name.
    pub filename: String,
    /// Photo classification.
    pub kind: PhotoKind,
    /// Optional caption.
    pub title: Option<String>,
    /// Optional description.
    pub description: Option<String>,
    /// Optional ordering hint from the host.
    pub display_order: Option<i32>,
}

impl PhotoRef {
    /// Creates a photo reference with no metadata.
    #[must_use]
    pub fn new(filename: impl Into<String>, kind: PhotoKind) -> Self {
        Self {
            filename: filename.into(),
            kind,
            title: None,
            description: None,
            display_order: None,
        }
    }
}

/// Photo lists for one property, fetched once per download session.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PropertyManifest {
    /// Property slug as known by the server.
    pub property_slug: String,
    /// Display name of the property, when the provider sends one.
    pub property_name: Option<String>,
    /// Standard photos, in manifest order.
    pub photos: Vec<PhotoRef>,
    /// Access-restricted photos, in manifest order.
    pub access_photos: Vec<PhotoRef>,
}

impl PropertyManifest {
    /// Creates an empty manifest for a property.
    #[must_use]
    pub fn new(property_slug: impl Into<String>) -> Self {
        Self {
            property_slug: property_slug.into(),
            ..Self::default()
        }
    }

    /// Appends a standard photo.
    #[must_use]
    pub fn with_photo(mut self, filename: impl Into<String>) -> Self {
        self.photos
            .push(PhotoRef::new(filename, PhotoKind::Standard));
        self
    }

    /// Appends an access-restricted photo.
    #[must_use]
    pub fn with_access_photo(mut self, filename: impl Into<String>) -> Self {
        self.access_photos
            .push(PhotoRef::new(filename, PhotoKind::AccessRestricted));
        self
    }

    /// Total number of photos across both lists.
    #[must_use]
    pub fn total(&self) -> usize {
        self.photos.len() + self.access_photos.len()
    }

    /// Standard photos followed by access photos, in manifest order.
    pub fn iter(&self) -> impl Iterator<Item = &PhotoRef> {
        self.photos.iter().chain(self.access_photos.iter())
    }
}

/// Identity of a cached photo: `(property slug, kind, filename)`.
///
/// Construction validates both path components so the key can never escape
/// its property directory.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PhotoKey {
    property_slug: String,
    kind: PhotoKind,
    filename: String,
}

impl PhotoKey {
    /// Creates a validated key.
    ///
    /// # Errors
    /// Returns `CacheError::InvalidKey` if the slug or filename is empty,
    /// contains a path separator, or is a relative path component.
    pub fn new(
        property_slug: impl Into<String>,
        filename: impl Into<String>,
        kind: PhotoKind,
    ) -> CacheResult<Self> {
        let property_slug = property_slug.into();
        let filename = filename.into();
        validate_component(&property_slug)?;
        validate_component(&filename)?;
        Ok(Self {
            property_slug,
            kind,
            filename,
        })
    }

    /// Checks that a property slug can name a cache directory.
    ///
    /// # Errors
    /// Returns `CacheError::InvalidKey` on the same conditions as [`PhotoKey::new`].
    pub fn check_slug(property_slug: &str) -> CacheResult<()> {
        validate_component(property_slug)
    }

    /// Builds a key for a manifest entry.
    ///
    /// # Errors
    /// See [`PhotoKey::new`].
    pub fn for_ref(property_slug: &str, photo: &PhotoRef) -> CacheResult<Self> {
        Self::new(property_slug, photo.filename.as_str(), photo.kind)
    }

    /// Property slug.
    #[must_use]
    pub fn property_slug(&self) -> &str {
        &self.property_slug
    }

    /// Photo kind.
    #[must_use]
    pub const fn kind(&self) -> PhotoKind {
        self.kind
    }

    /// File name.
    #[must_use]
    pub fn filename(&self) -> &str {
        &self.filename
    }
}

impl std::fmt::Display for PhotoKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}/{}/{}",
            self.property_slug,
            self.kind.subdir(),
            self.filename
        )
    }
}

fn validate_component(value: &str) -> CacheResult<()> {
    if value.is_empty() {
        return Err(CacheError::InvalidKey("empty path component".to_string()));
    }
    if value == "." || value == ".." {
        return Err(CacheError::InvalidKey(format!(
            "relative path component: {value}"
        )));
    }
    if value.contains(['/', '\\', '\0']) {
        return Err(CacheError::InvalidKey(format!(
            "path separator in component: {value}"
        )));
    }
    Ok(())
}
