//! Wire types for the mobile API.

use serde::Deserialize;

use crate::domain::entities::{PhotoKind, PhotoRef, PropertyManifest};

/// Property data payload for one reservation. Only the fields the photo
/// cache needs are decoded; the rest of the booklet is ignored.
#[derive(Debug, Deserialize)]
pub struct PropertyDataResponse {
    /// Property identity.
    pub property: PropertyInfo,
    /// Standard photos.
    #[serde(default)]
    pub photos: Vec<PhotoDto>,
    /// Access photos.
    #[serde(default)]
    pub access_photos: Vec<PhotoDto>,
}

/// Property identity block.
#[derive(Debug, Deserialize)]
pub struct PropertyInfo {
    /// Server id.
    pub id: i64,
    /// Display name.
    pub name: String,
    /// URL-safe identifier used in upload paths.
    pub slug: String,
}

/// Photo entry, shared by both photo lists.
#[derive(Debug, Deserialize)]
pub struct PhotoDto {
    /// Server id.
    pub id: i64,
    /// Upload file name.
    pub filename: String,
    /// Optional caption.
    pub title: Option<String>,
    /// Optional description.
    pub description: Option<String>,
    /// Optional ordering hint.
    pub display_order: Option<i32>,
}

impl PhotoDto {
    fn into_ref(self, kind: PhotoKind) -> PhotoRef {
        PhotoRef {
            filename: self.filename,
            kind,
            title: self.title,
            description: self.description,
            display_order: self.display_order,
        }
    }
}

impl From<PropertyDataResponse> for PropertyManifest {
    fn from(data: PropertyDataResponse) -> Self {
        Self {
            property_slug: data.property.slug,
            property_name: Some(data.property.name),
            photos: data
                .photos
                .into_iter()
                .map(|p| p.into_ref(PhotoKind::Standard))
                .collect(),
            access_photos: data
                .access_photos
                .into_iter()
                .map(|p| p.into_ref(PhotoKind::AccessRestricted))
                .collect(),
        }
    }
}

/// API error response structure.
#[derive(Debug, Deserialize)]
pub struct ErrorResponse {
    /// Error message from the server.
    pub error: String,
}
