//! Valuation repository: the rating aggregator and valuation listings.

use std::sync::Arc;

use spotmap_shared::types::Valuation;
use tracing::warn;

use crate::collections;
use crate::config::StoreConfig;
use crate::errors::{RepositoryError, StoreError};
use crate::interfaces::{DocumentStore, RawDocument};
use crate::transaction::run_transaction;
use crate::types::AggregateSnapshot;

/// Repository for the `valuations` collection and the denormalized rating
/// aggregate it maintains on spots.
///
/// Valuations are immutable once created; there is no update or delete path.
pub struct ValuationRepository {
    store: Arc<dyn DocumentStore>,
    config: StoreConfig,
}

fn valuation_from_doc(doc: &RawDocument) -> Result<Valuation, serde_json::Error> {
    let mut valuation: Valuation = serde_json::from_value(doc.data.clone())?;
    valuation.valuation_id = Some(doc.id.clone());
    Ok(valuation)
}

impl ValuationRepository {
    /// Create a new repository over the given store.
    pub fn new(store: Arc<dyn DocumentStore>, config: StoreConfig) -> Self {
        Self { store, config }
    }

    /// Atomically fold a new rating into a spot's running average and count.
    ///
    /// One transaction reads the spot, creates the valuation document and
    /// writes the updated `averageRating`/`totalRatings` pair back onto the
    /// spot. On a write conflict the whole read-compute-write sequence is
    /// retried; two concurrent submissions on the same spot both succeed and
    /// the final aggregate reflects both.
    pub async fn submit_rating(
        &self,
        spot_id: &str,
        rater_id: &str,
        score: i32,
        comment: &str,
    ) -> Result<AggregateSnapshot, RepositoryError> {
        if !(1..=5).contains(&score) {
            return Err(RepositoryError::InvalidScore(score));
        }

        run_transaction(&self.store, self.config.max_txn_attempts, |txn| {
            let spot_id = spot_id.to_owned();
            let rater_id = rater_id.to_owned();
            let comment = comment.to_owned();
            Box::pin(async move {
                let mut spot_data = txn
                    .get(collections::SPOTS, &spot_id)
                    .await?
                    .ok_or_else(|| RepositoryError::SpotNotFound(spot_id.clone()))?;
                if !spot_data.is_object() {
                    return Err(StoreError::backend(format!(
                        "corrupt spot document {spot_id}"
                    ))
                    .into());
                }

                let old_count = spot_data["totalRatings"].as_i64().unwrap_or(0);
                let old_average = spot_data["averageRating"].as_f64().unwrap_or(0.0);

                // Running-mean fold; double precision, no rounding before storage.
                let new_count = old_count + 1;
                let new_average =
                    (old_average * old_count as f64 + f64::from(score)) / new_count as f64;

                let valuation = Valuation {
                    valuation_id: None,
                    rater_id,
                    spot_id: spot_id.clone(),
                    score,
                    comment,
                    rated_at: txn.now_millis(),
                };
                let valuation_data = serde_json::to_value(&valuation)
                    .map_err(|e| StoreError::backend(format!("encode valuation: {e}")))?;
                txn.create(collections::VALUATIONS, txn.allocate_id(), valuation_data);

                // Field-level update keeps the rest of the spot document as read.
                spot_data["averageRating"] = new_average.into();
                spot_data["totalRatings"] = new_count.into();
                txn.set(collections::SPOTS, spot_id, spot_data);

                Ok(AggregateSnapshot {
                    average_rating: new_average,
                    total_ratings: new_count,
                })
            })
        })
        .await
    }

    /// Every valuation of a spot, newest first.
    pub async fn for_spot(&self, spot_id: &str) -> Result<Vec<Valuation>, RepositoryError> {
        self.query("spotId", spot_id).await
    }

    /// Every valuation submitted by a user, newest first.
    pub async fn for_user(&self, user_id: &str) -> Result<Vec<Valuation>, RepositoryError> {
        self.query("userId", user_id).await
    }

    async fn query(&self, field: &str, value: &str) -> Result<Vec<Valuation>, RepositoryError> {
        let docs = self
            .store
            .query_eq(collections::VALUATIONS, field, &value.into())
            .await?;
        let mut valuations: Vec<Valuation> = docs
            .iter()
            .filter_map(|doc| match valuation_from_doc(doc) {
                Ok(v) => Some(v),
                Err(e) => {
                    warn!(valuation_id = %doc.id, error = %e, "dropping undecodable valuation");
                    None
                }
            })
            .collect();
        valuations.sort_by_key(|v| std::cmp::Reverse(v.rated_at));
        Ok(valuations)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interfaces::{ReadStamp, WriteOp};
    use crate::memory::MemoryDocumentStore;
    use crate::spots::SpotRepository;
    use async_trait::async_trait;
    use serde_json::Value;
    use spotmap_shared::types::{SportType, Spot, SpotStatus};
    use std::sync::atomic::{AtomicU32, Ordering};

    /// Store wrapper that rejects the first `n` commits with a conflict, to
    /// exercise the retry loop deterministically.
    struct ConflictingStore {
        inner: MemoryDocumentStore,
        remaining_conflicts: AtomicU32,
        commits_attempted: AtomicU32,
    }

    impl ConflictingStore {
        fn failing_first(n: u32) -> Self {
            Self {
                inner: MemoryDocumentStore::new(StoreConfig::default()),
                remaining_conflicts: AtomicU32::new(n),
                commits_attempted: AtomicU32::new(0),
            }
        }
    }

    #[async_trait]
    impl DocumentStore for ConflictingStore {
        async fn get(
            &self,
            collection: &'static str,
            id: &str,
        ) -> Result<Option<RawDocument>, StoreError> {
            self.inner.get(collection, id).await
        }

        async fn list(&self, collection: &'static str) -> Result<Vec<RawDocument>, StoreError> {
            self.inner.list(collection).await
        }

        async fn get_many(
            &self,
            collection: &'static str,
            ids: &[String],
        ) -> Result<Vec<RawDocument>, StoreError> {
            self.inner.get_many(collection, ids).await
        }

        async fn query_eq(
            &self,
            collection: &'static str,
            field: &str,
            value: &Value,
        ) -> Result<Vec<RawDocument>, StoreError> {
            self.inner.query_eq(collection, field, value).await
        }

        async fn commit(
            &self,
            reads: &[ReadStamp],
            writes: Vec<WriteOp>,
        ) -> Result<(), StoreError> {
            self.commits_attempted.fetch_add(1, Ordering::SeqCst);
            // Let the fixture setup (no recorded reads) through untouched.
            if !reads.is_empty()
                && self
                    .remaining_conflicts
                    .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
                    .is_ok()
            {
                return Err(StoreError::conflict("injected"));
            }
            self.inner.commit(reads, writes).await
        }

        fn allocate_id(&self) -> String {
            self.inner.allocate_id()
        }

        fn now_millis(&self) -> i64 {
            self.inner.now_millis()
        }
    }

    async fn fresh_spot(store: &Arc<dyn DocumentStore>) -> String {
        let repo = SpotRepository::new(Arc::clone(store), StoreConfig::default());
        let spot = Spot {
            spot_id: None,
            owner_id: "owner-1".into(),
            name: "Bowl del puerto".into(),
            sport_types: vec![SportType::Skatepark],
            description: "concrete bowl".into(),
            latitude: 43.32,
            longitude: -1.99,
            photo_urls: vec![],
            created_at: None,
            status: SpotStatus::Activo,
            average_rating: 0.0,
            total_ratings: 0,
        };
        repo.create(spot).await.unwrap().spot_id.unwrap()
    }

    fn memory() -> Arc<dyn DocumentStore> {
        Arc::new(MemoryDocumentStore::new(StoreConfig::default()))
    }

    #[tokio::test]
    async fn sequence_of_ratings_tracks_the_running_mean() {
        let store = memory();
        let spot_id = fresh_spot(&store).await;
        let repo = ValuationRepository::new(Arc::clone(&store), StoreConfig::default());

        let s1 = repo.submit_rating(&spot_id, "u1", 5, "").await.unwrap();
        assert_eq!(s1.total_ratings, 1);
        assert!((s1.average_rating - 5.0).abs() < 1e-9);

        let s2 = repo.submit_rating(&spot_id, "u2", 3, "").await.unwrap();
        assert_eq!(s2.total_ratings, 2);
        assert!((s2.average_rating - 4.0).abs() < 1e-9);

        let s3 = repo.submit_rating(&spot_id, "u3", 4, "meh").await.unwrap();
        assert_eq!(s3.total_ratings, 3);
        assert!((s3.average_rating - 4.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn aggregate_equals_mean_of_all_accepted_scores() {
        let store = memory();
        let spot_id = fresh_spot(&store).await;
        let repo = ValuationRepository::new(Arc::clone(&store), StoreConfig::default());

        let scores = [1, 5, 2, 4, 3, 5, 5, 1, 2, 4, 3, 3];
        let mut last = AggregateSnapshot {
            average_rating: 0.0,
            total_ratings: 0,
        };
        for (i, score) in scores.iter().enumerate() {
            last = repo
                .submit_rating(&spot_id, &format!("user-{i}"), *score, "")
                .await
                .unwrap();
        }

        let mean = scores.iter().sum::<i32>() as f64 / scores.len() as f64;
        assert_eq!(last.total_ratings, scores.len() as i64);
        assert!((last.average_rating - mean).abs() < 1e-9);
    }

    #[tokio::test]
    async fn out_of_range_scores_are_rejected_before_any_write() {
        let store = memory();
        let spot_id = fresh_spot(&store).await;
        let repo = ValuationRepository::new(Arc::clone(&store), StoreConfig::default());

        for score in [0, 6, -1] {
            let err = repo.submit_rating(&spot_id, "u1", score, "").await.unwrap_err();
            assert!(matches!(err, RepositoryError::InvalidScore(_)));
        }
        assert!(repo.for_spot(&spot_id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn rating_a_missing_spot_is_not_found() {
        let store = memory();
        let repo = ValuationRepository::new(store, StoreConfig::default());
        let err = repo.submit_rating("ghost", "u1", 4, "").await.unwrap_err();
        assert!(matches!(err, RepositoryError::SpotNotFound(_)));
    }

    #[tokio::test]
    async fn concurrent_ratings_lose_no_update() {
        let store = memory();
        let spot_id = fresh_spot(&store).await;
        let repo = Arc::new(ValuationRepository::new(
            Arc::clone(&store),
            StoreConfig::default(),
        ));

        let a = {
            let repo = Arc::clone(&repo);
            let spot_id = spot_id.clone();
            tokio::spawn(async move { repo.submit_rating(&spot_id, "u1", 2, "").await })
        };
        let b = {
            let repo = Arc::clone(&repo);
            let spot_id = spot_id.clone();
            tokio::spawn(async move { repo.submit_rating(&spot_id, "u2", 4, "").await })
        };

        a.await.unwrap().unwrap();
        b.await.unwrap().unwrap();

        let spot_repo = SpotRepository::new(Arc::clone(&store), StoreConfig::default());
        let spot = spot_repo.get(&spot_id).await.unwrap().unwrap();
        assert_eq!(spot.total_ratings, 2);
        assert!((spot.average_rating - 3.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn conflicts_are_retried_wholesale() {
        let conflicting = Arc::new(ConflictingStore::failing_first(2));
        let store: Arc<dyn DocumentStore> = conflicting.clone();
        let spot_id = fresh_spot(&store).await;
        let repo = ValuationRepository::new(Arc::clone(&store), StoreConfig::default());

        let snapshot = repo.submit_rating(&spot_id, "u1", 5, "").await.unwrap();
        assert_eq!(snapshot.total_ratings, 1);
        // One fixture commit plus two rejected attempts plus the success.
        assert_eq!(conflicting.commits_attempted.load(Ordering::SeqCst), 4);

        // Exactly one valuation exists despite the retries.
        assert_eq!(repo.for_spot(&spot_id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn retry_exhaustion_surfaces_the_conflict() {
        let conflicting = Arc::new(ConflictingStore::failing_first(u32::MAX));
        let store: Arc<dyn DocumentStore> = conflicting.clone();
        let spot_id = fresh_spot(&store).await;
        let repo = ValuationRepository::new(
            Arc::clone(&store),
            StoreConfig::with_max_txn_attempts(3),
        );

        let err = repo.submit_rating(&spot_id, "u1", 5, "").await.unwrap_err();
        assert!(matches!(err, RepositoryError::Store(StoreError::Conflict(_))));
    }

    #[tokio::test]
    async fn listings_are_sorted_newest_first() {
        let store = memory();
        let spot_id = fresh_spot(&store).await;
        let repo = ValuationRepository::new(Arc::clone(&store), StoreConfig::default());

        repo.submit_rating(&spot_id, "u1", 5, "first").await.unwrap();
        repo.submit_rating(&spot_id, "u2", 3, "second").await.unwrap();

        let listed = repo.for_spot(&spot_id).await.unwrap();
        assert_eq!(listed.len(), 2);
        assert!(listed[0].rated_at >= listed[1].rated_at);

        let by_user = repo.for_user("u2").await.unwrap();
        assert_eq!(by_user.len(), 1);
        assert_eq!(by_user[0].comment, "second");
    }
}
