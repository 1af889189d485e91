//! HTTP adapter for the remote photo server.

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use tracing::{debug, warn};

use crate::domain::errors::{CacheError, CacheResult};
use crate::domain::ports::PhotoFetchPort;

const USER_AGENT: &str = concat!("locapp-photos/", env!("CARGO_PKG_VERSION"));

/// Downloads photos with a shared `reqwest` client.
#[derive(Debug, Clone)]
pub struct HttpPhotoSource {
    client: reqwest::Client,
}

impl HttpPhotoSource {
    /// Creates a source. Without `timeout` a request may wait indefinitely.
    ///
    /// # Errors
    /// Returns error if HTTP client creation fails.
    pub fn new(timeout: Option<Duration>) -> CacheResult<Self> {
        let mut builder = reqwest::Client::builder().user_agent(USER_AGENT);
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| CacheError::NetworkError(format!("Failed to create HTTP client: {e}")))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl PhotoFetchPort for HttpPhotoSource {
    async fn fetch(&self, url: &str) -> CacheResult<Bytes> {
        debug!(url, "Downloading photo");

        let response = self.client.get(url).send().await.map_err(|e| {
            warn!(url, error = %e, "Photo request failed");
            if e.is_timeout() {
                CacheError::NetworkError("request timed out".to_string())
            } else {
                CacheError::NetworkError(format!("Request failed: {e}"))
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(CacheError::HttpStatus {
                status: status.as_u16(),
            });
        }

        response
            .bytes()
            .await
            .map_err(|e| CacheError::NetworkError(format!("Failed to read body: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_creation() {
        tokio_test::assert_ok!(HttpPhotoSource::new(None));
    }

    #[tokio::test]
    async fn test_unreachable_host_is_network_error() {
        let source = HttpPhotoSource::new(Some(Duration::from_secs(2))).unwrap();
        // Port 9 on loopback is the discard service; nothing listens there in CI.
        let result = source.fetch("http://127.0.0.1:9/photo.jpg").await;
        assert!(result.is_err_and(|e| e.is_network_error()));
    }
}
