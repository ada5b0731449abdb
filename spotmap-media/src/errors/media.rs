//! Photo pipeline error types.

use thiserror::Error;

use crate::errors::BlobStoreError;

/// Errors from the photo asset pipeline.
///
/// `UndecodableImage` is a validation error: the caller must supply a
/// different image before retrying. `Upload` and `Delete` wrap blob-store
/// failures and are safe to retry as-is.
#[derive(Debug, Clone, Error)]
pub enum MediaError {
    /// The input bytes are not a decodable image (corrupt or unsupported
    /// format). Fail-fast: nothing is uploaded.
    #[error("Undecodable image: {0}")]
    UndecodableImage(String),

    /// Re-encoding the resized image failed.
    #[error("Image encoding failed: {0}")]
    Encode(String),

    /// The blob upload failed after a successful compression.
    #[error("Upload failed: {0}")]
    Upload(#[source] BlobStoreError),

    /// A blob delete failed. Callers treat this as non-fatal.
    #[error("Delete failed: {0}")]
    Delete(#[source] BlobStoreError),

    /// The background compression task was cancelled or panicked.
    #[error("Background task failed: {0}")]
    Task(String),
}

impl MediaError {
    /// Whether a caller can safely retry the failed operation as-is.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Upload(_) | Self::Delete(_) | Self::Task(_))
    }
}
