//! Photo cache error types.

/// Result type for cache operations.
pub type CacheResult<T> = std::result::Result<T, CacheError>;

/// Errors that can occur inside the photo cache.
///
/// These never cross the public boundary of the cache manager or the image
/// adapter; they are reported to the observer and degrade to a cache miss.
#[derive(Debug, Clone, thiserror::Error)]
pub enum CacheError {
    /// A slug or filename that cannot be mapped safely onto the disk layout.
    #[error("Invalid cache key: {0}")]
    InvalidKey(String),
    /// Failed to decode image.
    #[error("Decode error: {0}")]
    DecodeError(String),
    /// I/O error during cache operation.
    #[error("IO error: {0}")]
    IoError(String),
    /// Network error during download.
    #[error("Network error: {0}")]
    NetworkError(String),
    /// The server answered with a non-success status.
    #[error("HTTP {status}")]
    HttpStatus {
        /// Status code returned by the server.
        status: u16,
    },
}

impl CacheError {
    /// Creates an I/O error with context.
    #[must_use]
    pub fn io(context: &str, err: &std::io::Error) -> Self {
        Self::IoError(format!("{context}: {err}"))
    }

    /// Returns whether the error came from the network tier.
    #[must_use]
    pub const fn is_network_error(&self) -> bool {
        matches!(self, Self::NetworkError(_) | Self::HttpStatus { .. })
    }
}
