//! Error types for the media pipeline.
//! Consolidates and re-exports blob-store and pipeline errors.
mod blob;
mod media;

pub use blob::BlobStoreError;
pub use media::MediaError;
