//! Remote URL resolution for property photos and other uploads.

use reqwest::Url;

use crate::domain::entities::PhotoKind;

/// Error raised when the configured server base cannot host upload paths.
#[derive(Debug, Clone, thiserror::Error)]
#[error("invalid server URL {url}: {reason}")]
pub struct InvalidServerUrl {
    /// The rejected value.
    pub url: String,
    /// Why it was rejected.
    pub reason: String,
}

/// Maps photo identities onto upload URLs under a server base.
///
/// Path components are percent-encoded, so a filename can never change the
/// directory it resolves into.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhotoUrlResolver {
    base: Url,
}

impl PhotoUrlResolver {
    /// Creates a resolver for `server_url` (e.g. `https://example.com`).
    ///
    /// # Errors
    /// Returns error if the value is not an absolute http(s) URL.
    pub fn new(server_url: &str) -> Result<Self, InvalidServerUrl> {
        let invalid = |reason: String| InvalidServerUrl {
            url: server_url.to_string(),
            reason,
        };

        let base = Url::parse(server_url).map_err(|e| invalid(e.to_string()))?;
        if base.cannot_be_a_base() || !matches!(base.scheme(), "http" | "https") {
            return Err(invalid("expected an http(s) base URL".to_string()));
        }
        Ok(Self { base })
    }

    /// Server base this resolver was built from.
    #[must_use]
    pub const fn base(&self) -> &Url {
        &self.base
    }

    /// URL of a property photo.
    #[must_use]
    pub fn photo_url(&self, property_slug: &str, filename: &str, kind: PhotoKind) -> String {
        self.join(&[
            "uploads",
            "properties",
            property_slug,
            kind.subdir(),
            filename,
        ])
    }

    /// URL of a host contact avatar.
    #[must_use]
    pub fn avatar_url(&self, filename: &str) -> String {
        self.join(&["uploads", "avatars", filename])
    }

    /// URL of a booklet header image.
    #[must_use]
    pub fn header_image_url(&self, filename: &str) -> String {
        self.join(&["uploads", "headers", filename])
    }

    /// URL of an API endpoint below `api_path` (e.g. `/api/mobile`).
    #[must_use]
    pub fn api_url(&self, api_path: &str, endpoint: &str) -> String {
        let segments: Vec<&str> = api_path
            .split('/')
            .chain(endpoint.split('/'))
            .filter(|s| !s.is_empty())
            .collect();
        self.join(&segments)
    }

    fn join(&self, segments: &[&str]) -> String {
        let mut url = self.base.clone();
        // `new` rejects cannot-be-a-base URLs, so this always succeeds.
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url.into()
    }
}
