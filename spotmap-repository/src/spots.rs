//! Spot repository: CRUD, soft delete and the chunked batch fetcher.

use std::collections::HashSet;
use std::sync::Arc;

use futures::future;
use serde_json::Value;
use spotmap_shared::types::{Spot, SpotId, SpotStatus};
use tracing::warn;

use crate::collections;
use crate::config::StoreConfig;
use crate::errors::{RepositoryError, StoreError};
use crate::interfaces::{DocumentStore, RawDocument, WriteOp};
use crate::transaction::run_transaction;

/// Repository for the `spots` collection.
///
/// Field edits keep the stored rating aggregate; the soft delete goes
/// through a transaction so the status transition is observed exactly once
/// by the caller that triggers the photo cascade.
pub struct SpotRepository {
    store: Arc<dyn DocumentStore>,
    config: StoreConfig,
}

fn corrupt(id: &str, e: serde_json::Error) -> StoreError {
    StoreError::backend(format!("corrupt spot document {id}: {e}"))
}

fn spot_from_doc(doc: &RawDocument) -> Result<Spot, serde_json::Error> {
    let mut spot: Spot = serde_json::from_value(doc.data.clone())?;
    // The document id is authoritative, whatever the body claims.
    spot.spot_id = Some(doc.id.clone());
    Ok(spot)
}

fn spot_to_value(spot: &Spot) -> Result<Value, StoreError> {
    serde_json::to_value(spot).map_err(|e| StoreError::backend(format!("encode spot: {e}")))
}

impl SpotRepository {
    /// Create a new repository over the given store.
    pub fn new(store: Arc<dyn DocumentStore>, config: StoreConfig) -> Self {
        Self { store, config }
    }

    /// Persist a new spot and return it with its store-assigned id,
    /// creation timestamp and a zeroed rating aggregate.
    pub async fn create(&self, spot: Spot) -> Result<Spot, RepositoryError> {
        let mut spot = spot;
        let id = self.store.allocate_id();
        spot.spot_id = Some(id.clone());
        spot.created_at = Some(self.store.now_millis());
        spot.status = SpotStatus::Activo;
        spot.average_rating = 0.0;
        spot.total_ratings = 0;

        let data = spot_to_value(&spot)?;
        self.store
            .commit(
                &[],
                vec![WriteOp::Create {
                    collection: collections::SPOTS,
                    id,
                    data,
                }],
            )
            .await?;
        Ok(spot)
    }

    /// Fetch a spot by id.
    pub async fn get(&self, spot_id: &str) -> Result<Option<Spot>, RepositoryError> {
        match self.store.get(collections::SPOTS, spot_id).await? {
            Some(doc) => Ok(Some(spot_from_doc(&doc).map_err(|e| corrupt(spot_id, e))?)),
            None => Ok(None),
        }
    }

    /// Fetch every spot. Documents that fail to deserialize are dropped
    /// with a warning rather than failing the listing.
    pub async fn get_all(&self) -> Result<Vec<Spot>, RepositoryError> {
        let docs = self.store.list(collections::SPOTS).await?;
        Ok(Self::tolerant_decode(docs))
    }

    /// Overwrite a spot's editable fields (name, description, tags,
    /// coordinates, photos).
    ///
    /// The rating aggregate is not editable here: the stored
    /// `averageRating`/`totalRatings` pair survives the overwrite, so an
    /// edit racing a concurrent rating cannot clobber the aggregate with the
    /// caller's stale copy.
    pub async fn update(&self, spot: &Spot) -> Result<(), RepositoryError> {
        let id = spot.spot_id.clone().ok_or(RepositoryError::MissingSpotId)?;
        run_transaction(&self.store, self.config.max_txn_attempts, |txn| {
            let id = id.clone();
            let spot = spot.clone();
            Box::pin(async move {
                let current = txn
                    .get(collections::SPOTS, &id)
                    .await?
                    .ok_or_else(|| RepositoryError::SpotNotFound(id.clone()))?;

                let mut data = spot_to_value(&spot)?;
                for field in ["averageRating", "totalRatings"] {
                    if let Some(stored) = current.get(field) {
                        data[field] = stored.clone();
                    }
                }
                txn.set(collections::SPOTS, id, data);
                Ok(())
            })
        })
        .await
    }

    /// Resolve a list of spot ids to full records despite the store's
    /// membership-query limit.
    ///
    /// Ids are partitioned into chunks of at most the configured limit and
    /// the chunk queries run concurrently. Records that fail to deserialize
    /// are dropped, not fatal, and the merged result is de-duplicated by id.
    pub async fn get_by_ids(&self, ids: &[SpotId]) -> Result<Vec<Spot>, RepositoryError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let queries = ids
            .chunks(self.config.max_batch_size)
            .map(|chunk| self.store.get_many(collections::SPOTS, chunk));
        let chunks = future::try_join_all(queries).await?;

        let mut seen = HashSet::new();
        let mut spots = Vec::new();
        for doc in chunks.into_iter().flatten() {
            if !seen.insert(doc.id.clone()) {
                continue;
            }
            match spot_from_doc(&doc) {
                Ok(spot) => spots.push(spot),
                Err(e) => warn!(spot_id = %doc.id, error = %e, "dropping undecodable spot document"),
            }
        }
        Ok(spots)
    }

    /// Soft-delete a spot: transition its status to `eliminado`.
    ///
    /// Returns the spot as read inside the transaction, photo urls included,
    /// so the caller can run the cascading photo delete. Idempotent: a spot
    /// already marked deleted is returned unchanged.
    pub async fn mark_deleted(&self, spot_id: &str) -> Result<Spot, RepositoryError> {
        run_transaction(&self.store, self.config.max_txn_attempts, |txn| {
            let spot_id = spot_id.to_owned();
            Box::pin(async move {
                let data = txn
                    .get(collections::SPOTS, &spot_id)
                    .await?
                    .ok_or_else(|| RepositoryError::SpotNotFound(spot_id.clone()))?;
                let mut spot: Spot =
                    serde_json::from_value(data).map_err(|e| corrupt(&spot_id, e))?;
                spot.spot_id = Some(spot_id.clone());

                if spot.status != SpotStatus::Eliminado {
                    let mut deleted = spot.clone();
                    deleted.status = SpotStatus::Eliminado;
                    txn.set(collections::SPOTS, spot_id.clone(), spot_to_value(&deleted)?);
                }
                Ok(spot)
            })
        })
        .await
    }

    fn tolerant_decode(docs: Vec<RawDocument>) -> Vec<Spot> {
        docs.iter()
            .filter_map(|doc| match spot_from_doc(doc) {
                Ok(spot) => Some(spot),
                Err(e) => {
                    warn!(spot_id = %doc.id, error = %e, "dropping undecodable spot document");
                    None
                }
            })
            .collect()
    }
}
