//! # Spotmap Media
//!
//! This crate provides the blob-store abstraction and the photo asset
//! pipeline: image compression, upload with namespaced random keys,
//! order-preserving multi-photo fan-out with partial-failure reporting, and
//! cascading best-effort deletion. It includes an in-memory blob store for
//! tests and local development.

pub mod config;
pub mod errors;
pub mod interfaces;
pub mod memory;
pub mod pipeline;
pub mod types;

pub use config::MediaConfig;
pub use errors::{BlobStoreError, MediaError};
pub use interfaces::BlobStore;
pub use memory::MemoryBlobStore;
pub use pipeline::PhotoPipeline;
pub use types::{CascadeOutcome, PhotoBatchOutcome, PhotoPurpose};
