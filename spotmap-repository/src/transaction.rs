//! Optimistic transactions over a [`DocumentStore`].
//!
//! A [`Transaction`] records the version of every document it reads and
//! buffers every write; [`run_transaction`] runs the caller's closure against
//! a fresh recorder, commits, and retries the whole read-compute-write
//! sequence when the store reports a conflict. The closure may therefore be
//! invoked more than once and must be free of side effects outside the
//! transaction's own reads and writes.

use std::sync::Arc;

use futures::future::BoxFuture;
use serde_json::Value;
use tracing::debug;

use crate::errors::StoreError;
use crate::interfaces::{DocumentStore, ReadStamp, WriteOp};

/// Records reads and buffers writes for one transaction attempt.
pub struct Transaction {
    store: Arc<dyn DocumentStore>,
    reads: Vec<ReadStamp>,
    writes: Vec<WriteOp>,
}

impl Transaction {
    fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            store,
            reads: Vec::new(),
            writes: Vec::new(),
        }
    }

    /// Read a document inside the transaction, recording its version stamp.
    ///
    /// Absence is recorded too: the commit will fail if a document observed
    /// as missing has been created by a concurrent writer.
    pub async fn get(
        &mut self,
        collection: &'static str,
        id: &str,
    ) -> Result<Option<Value>, StoreError> {
        let doc = self.store.get(collection, id).await?;
        self.reads.push(ReadStamp {
            collection,
            id: id.to_owned(),
            version: doc.as_ref().map(|d| d.version),
        });
        Ok(doc.map(|d| d.data))
    }

    /// Buffer a create of a new document.
    pub fn create(&mut self, collection: &'static str, id: impl Into<String>, data: Value) {
        self.writes.push(WriteOp::Create {
            collection,
            id: id.into(),
            data,
        });
    }

    /// Buffer a full overwrite (upsert) of a document.
    pub fn set(&mut self, collection: &'static str, id: impl Into<String>, data: Value) {
        self.writes.push(WriteOp::Set {
            collection,
            id: id.into(),
            data,
        });
    }

    /// Buffer a delete of a document.
    pub fn delete(&mut self, collection: &'static str, id: impl Into<String>) {
        self.writes.push(WriteOp::Delete {
            collection,
            id: id.into(),
        });
    }

    /// Allocate a fresh document id from the underlying store.
    pub fn allocate_id(&self) -> String {
        self.store.allocate_id()
    }

    /// The store clock, epoch millis.
    pub fn now_millis(&self) -> i64 {
        self.store.now_millis()
    }

    async fn commit(self) -> Result<(), StoreError> {
        self.store.commit(&self.reads, self.writes).await
    }
}

/// Run `body` as an optimistic transaction, retrying on conflict.
///
/// Each attempt gets a fresh [`Transaction`]; when the commit reports a
/// conflict the attempt is discarded wholesale and `body` runs again against
/// the store's current state, up to `max_attempts` times. Errors returned by
/// `body` itself are never retried.
pub async fn run_transaction<T, E, F>(
    store: &Arc<dyn DocumentStore>,
    max_attempts: u32,
    body: F,
) -> Result<T, E>
where
    E: From<StoreError>,
    F: for<'t> Fn(&'t mut Transaction) -> BoxFuture<'t, Result<T, E>>,
{
    let mut attempt = 0u32;
    loop {
        attempt += 1;
        let mut txn = Transaction::new(Arc::clone(store));
        let value = body(&mut txn).await?;
        match txn.commit().await {
            Ok(()) => return Ok(value),
            Err(StoreError::Conflict(reason)) if attempt < max_attempts => {
                debug!(attempt, %reason, "transaction conflict, retrying");
            }
            Err(e) => return Err(E::from(e)),
        }
    }
}
