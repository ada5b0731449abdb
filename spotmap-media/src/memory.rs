//! In-memory blob store for testing and local development.
//!
//! Keys map to `mem://{key}` urls. The store can be inspected from tests to
//! verify what was uploaded and what survived a cascade.
//!
//! # Example
//!
//! ```
//! use spotmap_media::{BlobStore, MemoryBlobStore};
//!
//! # async fn demo() -> Result<(), spotmap_media::BlobStoreError> {
//! let store = MemoryBlobStore::new();
//! let url = store.upload("spots/u1/a.jpg", vec![1, 2, 3]).await?;
//! assert_eq!(url, "mem://spots/u1/a.jpg");
//! store.delete(&url).await?;
//! # Ok(())
//! # }
//! ```

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use crate::errors::BlobStoreError;
use crate::interfaces::BlobStore;

const URL_SCHEME: &str = "mem://";

/// In-memory `BlobStore` backed by a map of key to bytes.
#[derive(Default)]
pub struct MemoryBlobStore {
    blobs: RwLock<HashMap<String, Vec<u8>>>,
}

impl MemoryBlobStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// The stored bytes behind a url, if present. Test helper.
    pub fn get(&self, url: &str) -> Option<Vec<u8>> {
        let key = url.strip_prefix(URL_SCHEME)?;
        self.blobs.read().expect("blob lock poisoned").get(key).cloned()
    }

    /// Number of stored blobs.
    pub fn len(&self) -> usize {
        self.blobs.read().expect("blob lock poisoned").len()
    }

    /// Whether the store holds no blobs.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn upload(&self, key: &str, bytes: Vec<u8>) -> Result<String, BlobStoreError> {
        self.blobs
            .write()
            .expect("blob lock poisoned")
            .insert(key.to_owned(), bytes);
        Ok(format!("{URL_SCHEME}{key}"))
    }

    async fn delete(&self, url: &str) -> Result<(), BlobStoreError> {
        let key = url
            .strip_prefix(URL_SCHEME)
            .ok_or_else(|| BlobStoreError::InvalidUrl(url.to_owned()))?;
        let removed = self
            .blobs
            .write()
            .expect("blob lock poisoned")
            .remove(key)
            .is_some();
        if removed {
            Ok(())
        } else {
            Err(BlobStoreError::NotFound(url.to_owned()))
        }
    }
}
