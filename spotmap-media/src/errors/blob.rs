//! Blob store error types.

use thiserror::Error;

/// Errors from blob-store operations.
///
/// Transport failures are flattened into `Backend` at the store boundary so
/// backend exception types never leak to callers.
#[derive(Debug, Clone, Error)]
pub enum BlobStoreError {
    /// No blob exists for the given url.
    #[error("Blob not found: {0}")]
    NotFound(String),

    /// The url does not belong to this store or cannot be parsed back
    /// into a key.
    #[error("Invalid blob url: {0}")]
    InvalidUrl(String),

    /// Network or backend failure.
    #[error("Backend error: {0}")]
    Backend(String),
}

impl BlobStoreError {
    /// Create a backend error.
    pub fn backend(msg: impl Into<String>) -> Self {
        Self::Backend(msg.into())
    }
}
