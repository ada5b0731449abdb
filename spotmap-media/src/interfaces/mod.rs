//! This module defines and re-exports the interfaces for the blob store.
mod blob_store;

pub use blob_store::BlobStore;
