//! Port for retrieving raw photo bytes from the remote photo server.

use async_trait::async_trait;
use bytes::Bytes;

use crate::domain::errors::CacheResult;

/// Issues a single GET for a photo URL.
///
/// Non-success statuses must be reported as errors; implementations do not
/// retry.
#[async_trait]
pub trait PhotoFetchPort: Send + Sync {
    /// Downloads the body at `url`.
    async fn fetch(&self, url: &str) -> CacheResult<Bytes>;
}
