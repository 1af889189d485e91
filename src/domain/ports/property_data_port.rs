//! Property data provider port definition.

use async_trait::async_trait;

use crate::domain::entities::PropertyManifest;
use crate::domain::errors::ApiError;

/// Source of property manifests, keyed by reservation.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PropertyDataPort: Send + Sync {
    /// Retrieves the photo manifest of the property attached to a reservation.
    async fn property_manifest(&self, reservation_id: u64) -> Result<PropertyManifest, ApiError>;
}

#[cfg(test)]
pub mod mock {
    use super::*;
    use std::collections::HashMap;

    use parking_lot::RwLock;

    /// Provider serving fixed manifests; unknown reservations fail.
    #[derive(Default)]
    pub struct StaticPropertyData {
        manifests: RwLock<HashMap<u64, PropertyManifest>>,
    }

    impl StaticPropertyData {
        /// Creates an empty provider.
        pub fn new() -> Self {
            Self::default()
        }

        /// Creates a provider with one reservation.
        pub fn with_manifest(reservation_id: u64, manifest: PropertyManifest) -> Self {
            let provider = Self::new();
            provider.set(reservation_id, manifest);
            provider
        }

        /// Replaces the manifest for a reservation.
        pub fn set(&self, reservation_id: u64, manifest: PropertyManifest) {
            self.manifests.write().insert(reservation_id, manifest);
        }
    }

    #[async_trait]
    impl PropertyDataPort for StaticPropertyData {
        async fn property_manifest(
            &self,
            reservation_id: u64,
        ) -> Result<PropertyManifest, ApiError> {
            self.manifests
                .read()
                .get(&reservation_id)
                .cloned()
                .ok_or_else(|| ApiError::server(format!("unknown reservation {reservation_id}")))
        }
    }
}
