//! Document store trait definition.
//!
//! This module defines the abstract interface for the transactional document
//! store, allowing for different backend implementations (the managed remote
//! store in production, `MemoryDocumentStore` in tests and local runs).
//!
//! The store uses versioned documents: every successful write bumps the
//! document version, and a commit declares the versions it read so the store
//! can reject it when a concurrent writer moved any of them. That rejection
//! (`StoreError::Conflict`) is what `run_transaction` retries.

use async_trait::async_trait;
use serde_json::Value;

use crate::errors::StoreError;

/// A document as it crosses the store boundary: id, body and the version
/// stamp used for optimistic concurrency.
#[derive(Debug, Clone, PartialEq)]
pub struct RawDocument {
    pub id: String,
    pub data: Value,
    pub version: u64,
}

/// The version observed for one document at read time.
///
/// `version: None` records that the document was absent; commit then verifies
/// it is still absent, so read-then-create flows are race-free.
#[derive(Debug, Clone, PartialEq)]
pub struct ReadStamp {
    pub collection: &'static str,
    pub id: String,
    pub version: Option<u64>,
}

/// A buffered write applied atomically at commit.
#[derive(Debug, Clone)]
pub enum WriteOp {
    /// Create a new document; fails the commit if the id is taken.
    Create {
        collection: &'static str,
        id: String,
        data: Value,
    },
    /// Set (upsert) the full document body.
    Set {
        collection: &'static str,
        id: String,
        data: Value,
    },
    /// Delete the document if present.
    Delete { collection: &'static str, id: String },
}

/// Abstracts the underlying transactional document store.
///
/// Implementations are injected into the repositories as `Arc<dyn
/// DocumentStore>` to enable constructor injection and easy testing with the
/// in-memory implementation.
///
/// All reads are point-in-time; no implementation may cache authoritative
/// state across calls. Mutations that must preserve a cross-field invariant
/// go through `commit` with read stamps (via [`crate::transaction`]);
/// mutations without one may commit writes with no recorded reads.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Fetch a single document by id.
    async fn get(
        &self,
        collection: &'static str,
        id: &str,
    ) -> Result<Option<RawDocument>, StoreError>;

    /// Fetch every document of a collection.
    async fn list(&self, collection: &'static str) -> Result<Vec<RawDocument>, StoreError>;

    /// Membership query: fetch the documents whose ids appear in `ids`.
    ///
    /// The store bounds `ids.len()` by its configured batch limit and fails
    /// with `StoreError::BatchSizeExceeded` beyond it; callers are expected
    /// to chunk (see `SpotRepository::get_by_ids`). Ids with no matching
    /// document are silently skipped.
    async fn get_many(
        &self,
        collection: &'static str,
        ids: &[String],
    ) -> Result<Vec<RawDocument>, StoreError>;

    /// Equality query on a single top-level field.
    async fn query_eq(
        &self,
        collection: &'static str,
        field: &str,
        value: &Value,
    ) -> Result<Vec<RawDocument>, StoreError>;

    /// Atomically verify `reads` and apply `writes`.
    ///
    /// Fails with `StoreError::Conflict` when any read document's version no
    /// longer matches its stamp (including presence/absence changes). On
    /// failure nothing is applied.
    async fn commit(&self, reads: &[ReadStamp], writes: Vec<WriteOp>) -> Result<(), StoreError>;

    /// Allocate a fresh document id (128-bit random).
    fn allocate_id(&self) -> String;

    /// The store's clock, epoch millis. Server-assigned timestamps
    /// (`fechaCreacion` and friends) come from here, not the caller's clock.
    fn now_millis(&self) -> i64;
}
