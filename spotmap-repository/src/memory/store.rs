//! In-memory `DocumentStore` with real optimistic-conflict detection.
//!
//! The `MemoryDocumentStore` keeps versioned documents behind an interior
//! lock and verifies read stamps at commit exactly like the managed backend,
//! so tests exercise the same conflict/retry paths as production without
//! network access.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use spotmap_repository::{DocumentStore, MemoryDocumentStore, StoreConfig};
//!
//! let store: Arc<dyn DocumentStore> = Arc::new(MemoryDocumentStore::new(StoreConfig::default()));
//! let id = store.allocate_id();
//! assert_eq!(id.len(), 36); // uuid v4
//! ```

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value;
use uuid::Uuid;

use crate::config::StoreConfig;
use crate::errors::StoreError;
use crate::interfaces::{DocumentStore, RawDocument, ReadStamp, WriteOp};

type Collection = HashMap<String, (Value, u64)>;

/// In-memory document store that mirrors the managed backend's transactional
/// semantics: versioned documents, stamped reads verified at commit, and a
/// configurable membership-query limit.
pub struct MemoryDocumentStore {
    collections: RwLock<HashMap<&'static str, Collection>>,
    config: StoreConfig,
}

impl MemoryDocumentStore {
    /// Create a new empty store.
    pub fn new(config: StoreConfig) -> Self {
        Self {
            collections: RwLock::new(HashMap::new()),
            config,
        }
    }

    /// Number of documents currently in a collection. Test helper.
    pub fn len(&self, collection: &'static str) -> usize {
        self.collections
            .read()
            .expect("store lock poisoned")
            .get(collection)
            .map(|c| c.len())
            .unwrap_or(0)
    }

    /// Whether a collection holds no documents.
    pub fn is_empty(&self, collection: &'static str) -> bool {
        self.len(collection) == 0
    }
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn get(
        &self,
        collection: &'static str,
        id: &str,
    ) -> Result<Option<RawDocument>, StoreError> {
        let collections = self.collections.read().expect("store lock poisoned");
        Ok(collections.get(collection).and_then(|c| {
            c.get(id).map(|(data, version)| RawDocument {
                id: id.to_owned(),
                data: data.clone(),
                version: *version,
            })
        }))
    }

    async fn list(&self, collection: &'static str) -> Result<Vec<RawDocument>, StoreError> {
        let collections = self.collections.read().expect("store lock poisoned");
        Ok(collections
            .get(collection)
            .map(|c| {
                c.iter()
                    .map(|(id, (data, version))| RawDocument {
                        id: id.clone(),
                        data: data.clone(),
                        version: *version,
                    })
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn get_many(
        &self,
        collection: &'static str,
        ids: &[String],
    ) -> Result<Vec<RawDocument>, StoreError> {
        if ids.len() > self.config.max_batch_size {
            return Err(StoreError::batch_size_exceeded(
                ids.len(),
                self.config.max_batch_size,
            ));
        }
        let collections = self.collections.read().expect("store lock poisoned");
        let Some(c) = collections.get(collection) else {
            return Ok(Vec::new());
        };
        Ok(ids
            .iter()
            .filter_map(|id| {
                c.get(id).map(|(data, version)| RawDocument {
                    id: id.clone(),
                    data: data.clone(),
                    version: *version,
                })
            })
            .collect())
    }

    async fn query_eq(
        &self,
        collection: &'static str,
        field: &str,
        value: &Value,
    ) -> Result<Vec<RawDocument>, StoreError> {
        let collections = self.collections.read().expect("store lock poisoned");
        Ok(collections
            .get(collection)
            .map(|c| {
                c.iter()
                    .filter(|(_, (data, _))| data.get(field) == Some(value))
                    .map(|(id, (data, version))| RawDocument {
                        id: id.clone(),
                        data: data.clone(),
                        version: *version,
                    })
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn commit(&self, reads: &[ReadStamp], writes: Vec<WriteOp>) -> Result<(), StoreError> {
        let mut collections = self.collections.write().expect("store lock poisoned");

        // Verify every read stamp before touching anything.
        for stamp in reads {
            let current = collections
                .get(stamp.collection)
                .and_then(|c| c.get(&stamp.id))
                .map(|(_, version)| *version);
            if current != stamp.version {
                return Err(StoreError::conflict(format!(
                    "{}/{} moved since read",
                    stamp.collection, stamp.id
                )));
            }
        }

        // Creates are validated up front so a rejected commit applies nothing.
        for write in &writes {
            if let WriteOp::Create { collection, id, .. } = write {
                let taken = collections
                    .get(collection)
                    .is_some_and(|c| c.contains_key(id));
                if taken {
                    return Err(StoreError::AlreadyExists {
                        collection: (*collection).to_owned(),
                        id: id.clone(),
                    });
                }
            }
        }

        for write in writes {
            match write {
                WriteOp::Create { collection, id, data } => {
                    collections.entry(collection).or_default().insert(id, (data, 1));
                }
                WriteOp::Set { collection, id, data } => {
                    let c = collections.entry(collection).or_default();
                    let next_version = c.get(&id).map(|(_, v)| v + 1).unwrap_or(1);
                    c.insert(id, (data, next_version));
                }
                WriteOp::Delete { collection, id } => {
                    if let Some(c) = collections.get_mut(collection) {
                        c.remove(&id);
                    }
                }
            }
        }
        Ok(())
    }

    fn allocate_id(&self) -> String {
        Uuid::new_v4().to_string()
    }

    fn now_millis(&self) -> i64 {
        Utc::now().timestamp_millis()
    }
}
