//! REST client for the booklet server's mobile API.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode, header};
use tracing::{debug, warn};

use super::dto::{ErrorResponse, PropertyDataResponse};
use crate::domain::entities::PropertyManifest;
use crate::domain::errors::ApiError;
use crate::domain::ports::PropertyDataPort;
use crate::infrastructure::image::PhotoUrlResolver;

/// Default API prefix below the server URL.
pub const DEFAULT_API_PATH: &str = "/api/mobile";

const USER_AGENT: &str = concat!("locapp-photos/", env!("CARGO_PKG_VERSION"));

/// Mobile API client.
pub struct LocAppClient {
    client: Client,
    resolver: PhotoUrlResolver,
    api_path: String,
    auth_token: Option<String>,
}

impl std::fmt::Debug for LocAppClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocAppClient")
            .field("server", &self.resolver.base().as_str())
            .field("api_path", &self.api_path)
            .field("authenticated", &self.auth_token.is_some())
            .finish_non_exhaustive()
    }
}

impl LocAppClient {
    /// Creates a client for the server behind `resolver`.
    ///
    /// # Errors
    /// Returns error if HTTP client creation fails.
    pub fn new(
        resolver: PhotoUrlResolver,
        api_path: impl Into<String>,
        timeout: Option<Duration>,
    ) -> Result<Self, ApiError> {
        let mut builder = Client::builder().user_agent(USER_AGENT);
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| ApiError::network(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            resolver,
            api_path: api_path.into(),
            auth_token: None,
        })
    }

    /// Sends `token` as a bearer token with every request.
    #[must_use]
    pub fn with_auth_token(mut self, token: impl Into<String>) -> Self {
        self.auth_token = Some(token.into());
        self
    }

    fn endpoint(&self, path: &str) -> String {
        self.resolver.api_url(&self.api_path, path)
    }

    async fn handle_error_response(status: StatusCode, response: reqwest::Response) -> ApiError {
        if status == StatusCode::UNAUTHORIZED {
            return ApiError::Unauthorized;
        }
        match response.json::<ErrorResponse>().await {
            Ok(error) => ApiError::server(error.error),
            Err(_) => ApiError::server(format!("HTTP {status}")),
        }
    }
}

#[async_trait]
impl PropertyDataPort for LocAppClient {
    async fn property_manifest(&self, reservation_id: u64) -> Result<PropertyManifest, ApiError> {
        let url = self.endpoint(&format!("reservations/{reservation_id}/property"));
        debug!(reservation_id, "Requesting property data");

        let mut request = self
            .client
            .get(&url)
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(token) = &self.auth_token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await.map_err(|e| {
            warn!(error = %e, "Failed to reach property API");
            if e.is_timeout() {
                ApiError::network("request timed out")
            } else if e.is_connect() {
                ApiError::network("failed to connect to server")
            } else {
                ApiError::network(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(Self::handle_error_response(status, response).await);
        }

        let data: PropertyDataResponse = response.json().await.map_err(|e| {
            warn!(error = %e, "Failed to parse property data");
            ApiError::decode(e.to_string())
        })?;

        let manifest = PropertyManifest::from(data);
        debug!(
            reservation_id,
            property = %manifest.property_slug,
            photos = manifest.total(),
            "Property data received"
        );
        Ok(manifest)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> LocAppClient {
        let resolver = PhotoUrlResolver::new("http://127.0.0.1:9").unwrap();
        LocAppClient::new(resolver, DEFAULT_API_PATH, Some(Duration::from_secs(2))).unwrap()
    }

    #[test]
    fn test_endpoint() {
        assert_eq!(
            client().endpoint("reservations/12/property"),
            "http://127.0.0.1:9/api/mobile/reservations/12/property"
        );
    }

    #[test]
    fn test_debug_hides_token() {
        let rendered = format!("{:?}", client().with_auth_token("secret-token"));
        assert!(!rendered.contains("secret-token"));
        assert!(rendered.contains("authenticated: true"));
    }

    #[test]
    fn test_unreachable_server_is_network_error() {
        let error = tokio_test::assert_err!(tokio_test::block_on(client().property_manifest(12)));
        assert!(error.is_network_error());
    }
}
