//! Document-store error types.
//!
//! These errors come out of `DocumentStore` implementations. Backend-specific
//! failures are flattened into `Backend` at the store boundary so they never
//! leak transport exception types to callers.

use thiserror::Error;

/// Errors from document-store operations.
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    /// An optimistic commit lost against a concurrent writer. `run_transaction`
    /// retries these; callers only see one after retries are exhausted.
    #[error("Transaction conflict: {0}")]
    Conflict(String),

    /// A membership query carried more ids than the store allows.
    #[error("Batch size {provided} exceeds maximum {max}")]
    BatchSizeExceeded { provided: usize, max: usize },

    /// A document write targeted an id that already exists.
    #[error("Document already exists: {collection}/{id}")]
    AlreadyExists { collection: String, id: String },

    /// Network or backend failure not classified above.
    #[error("Backend error: {0}")]
    Backend(String),
}

impl StoreError {
    /// Create a conflict error.
    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    /// Create a backend error.
    pub fn backend(msg: impl Into<String>) -> Self {
        Self::Backend(msg.into())
    }

    /// Create a batch size exceeded error.
    pub fn batch_size_exceeded(provided: usize, max: usize) -> Self {
        Self::BatchSizeExceeded { provided, max }
    }

    /// Whether a caller can safely retry the failed operation as-is.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Conflict(_) | Self::Backend(_))
    }
}
