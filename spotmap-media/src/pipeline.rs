//! The photo asset pipeline: compress, upload, and manage lifecycle.

use std::sync::Arc;

use futures::future;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use tracing::warn;
use uuid::Uuid;

use crate::config::MediaConfig;
use crate::errors::MediaError;
use crate::interfaces::BlobStore;
use crate::types::{CascadeOutcome, PhotoBatchOutcome, PhotoPurpose};

/// Compresses raw images, uploads them to the blob store and manages their
/// lifecycle (creation, replacement, cascading deletion).
///
/// Compression is CPU-bound and runs on the blocking pool, off the caller's
/// interactive thread. Upload keys are namespaced by owner id with a random
/// 128-bit suffix, so collisions are not a practical concern.
pub struct PhotoPipeline {
    blob_store: Arc<dyn BlobStore>,
    config: MediaConfig,
}

fn compress_blocking(bytes: &[u8], max_edge: u32, quality: u8) -> Result<Vec<u8>, MediaError> {
    let img = image::load_from_memory(bytes)
        .map_err(|e| MediaError::UndecodableImage(e.to_string()))?;

    // Shrink-to-fit on the long edge, preserving aspect ratio. Never upscale.
    let img = if img.width().max(img.height()) > max_edge {
        img.resize(max_edge, max_edge, FilterType::Lanczos3)
    } else {
        img
    };

    let mut out = Vec::new();
    let encoder = JpegEncoder::new_with_quality(&mut out, quality);
    // JPEG has no alpha channel; flatten before encoding.
    img.to_rgb8()
        .write_with_encoder(encoder)
        .map_err(|e| MediaError::Encode(e.to_string()))?;
    Ok(out)
}

impl PhotoPipeline {
    /// Create a new pipeline over the given blob store.
    pub fn new(blob_store: Arc<dyn BlobStore>, config: MediaConfig) -> Self {
        Self { blob_store, config }
    }

    /// Compress one image off-thread according to the purpose's bounds.
    async fn compress(&self, bytes: Vec<u8>, purpose: PhotoPurpose) -> Result<Vec<u8>, MediaError> {
        let (max_edge, quality) = self.config.bounds(purpose);
        tokio::task::spawn_blocking(move || compress_blocking(&bytes, max_edge, quality))
            .await
            .map_err(|e| MediaError::Task(e.to_string()))?
    }

    fn allocate_key(owner_id: &str, purpose: PhotoPurpose) -> String {
        format!("{}/{owner_id}/{}.jpg", purpose.key_prefix(), Uuid::new_v4())
    }

    /// Compress and upload a single photo; returns the retrieval url.
    ///
    /// Decode failures abort before anything is written. An upload failure is
    /// surfaced as-is and not retried here; the caller decides whether to
    /// retry the submission.
    pub async fn upload_photo(
        &self,
        bytes: Vec<u8>,
        owner_id: &str,
        purpose: PhotoPurpose,
    ) -> Result<String, MediaError> {
        let encoded = self.compress(bytes, purpose).await?;
        let key = Self::allocate_key(owner_id, purpose);
        self.blob_store
            .upload(&key, encoded)
            .await
            .map_err(MediaError::Upload)
    }

    /// Compress and upload a batch of photos concurrently, preserving the
    /// caller-supplied order.
    ///
    /// All images are decoded and compressed first; any decode failure fails
    /// the whole submission before a single upload starts (unambiguous client
    /// error). Upload failures are partial: the outcome lists url-or-error
    /// per input position so the caller can retry just the failed subset.
    pub async fn upload_photos(
        &self,
        inputs: Vec<Vec<u8>>,
        owner_id: &str,
        purpose: PhotoPurpose,
    ) -> Result<PhotoBatchOutcome, MediaError> {
        if inputs.is_empty() {
            return Ok(PhotoBatchOutcome::empty());
        }

        let compressed = future::try_join_all(
            inputs.into_iter().map(|bytes| self.compress(bytes, purpose)),
        )
        .await?;

        let uploads = compressed.into_iter().map(|bytes| {
            let key = Self::allocate_key(owner_id, purpose);
            let blob_store = Arc::clone(&self.blob_store);
            async move { blob_store.upload(&key, bytes).await.map_err(MediaError::Upload) }
        });
        let results = future::join_all(uploads).await;

        for (i, r) in results.iter().enumerate() {
            if let Err(e) = r {
                warn!(index = i, error = %e, "photo upload failed");
            }
        }
        Ok(PhotoBatchOutcome { results })
    }

    /// Best-effort single delete. A failure is logged and returned, but
    /// callers treat it as non-fatal: photo cleanup is not part of the spot
    /// record's correctness invariant.
    pub async fn delete_photo(&self, url: &str) -> Result<(), MediaError> {
        self.blob_store.delete(url).await.map_err(|e| {
            warn!(%url, error = %e, "photo delete failed");
            MediaError::Delete(e)
        })
    }

    /// Cascading delete: attempt every url, continuing past individual
    /// failures. Used when a spot transitions to deleted.
    pub async fn delete_photos(&self, urls: &[String]) -> CascadeOutcome {
        let mut failures = Vec::new();
        for url in urls {
            if let Err(e) = self.delete_photo(url).await {
                failures.push((url.clone(), e));
            }
        }
        CascadeOutcome {
            attempted: urls.len(),
            failures,
        }
    }
}
