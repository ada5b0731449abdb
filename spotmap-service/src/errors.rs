//! Service-level error types.

use spotmap_media::MediaError;
use spotmap_repository::RepositoryError;
use spotmap_shared::types::SpotId;
use thiserror::Error;

/// Errors surfaced by the high-level spot operations.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// The operation requires a signed-in user and none is present, or the
    /// caller is not allowed to act on the target record.
    #[error("Operation requires an authorized user")]
    Unauthorized,

    /// The submitted data failed validation; the caller must correct it
    /// before retrying.
    #[error("Validation failed: {0}")]
    Validation(String),

    /// The spot record was written but some photo uploads failed. The
    /// failed input positions are listed so the caller can resubmit just
    /// that subset.
    #[error("Spot {spot_id} created with {} photo upload(s) failed", failed_indices.len())]
    PhotoUploads {
        spot_id: SpotId,
        failed_indices: Vec<usize>,
    },

    /// A repository operation failed (not found, conflict exhaustion,
    /// backend I/O).
    #[error("Repository operation failed: {0}")]
    Repository(#[from] RepositoryError),

    /// A photo pipeline operation failed.
    #[error("Media operation failed: {0}")]
    Media(#[from] MediaError),
}

impl ServiceError {
    /// Creates a new `Validation` error with the given message.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }
}
