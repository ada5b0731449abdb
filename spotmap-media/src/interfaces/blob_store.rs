//! Blob store trait definition.
//!
//! This module defines the abstract interface for binary asset storage,
//! allowing for different backend implementations (the managed object store
//! in production, `MemoryBlobStore` in tests and local runs).

use async_trait::async_trait;

use crate::errors::BlobStoreError;

/// Abstracts the underlying blob storage backend.
///
/// Implementations are injected into [`crate::PhotoPipeline`] as
/// `Arc<dyn BlobStore>`. Keys are slash-separated paths
/// (`spots/{owner}/{random}.jpg`); a successful upload returns the stable
/// retrieval url the stored documents reference.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Upload `bytes` under `key` and return the retrieval url.
    async fn upload(&self, key: &str, bytes: Vec<u8>) -> Result<String, BlobStoreError>;

    /// Delete the blob a previously returned url points at.
    async fn delete(&self, url: &str) -> Result<(), BlobStoreError>;
}
