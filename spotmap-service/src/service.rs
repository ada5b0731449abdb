//! High-level spot operations.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::broadcast;
use tracing::{info, warn};

use spotmap_media::{BlobStore, CascadeOutcome, MediaConfig, PhotoPipeline, PhotoPurpose};
use spotmap_repository::{
    AggregateSnapshot, DocumentStore, RepositoryError, SpotRepository, StoreConfig,
    UserRepository, ValuationRepository,
};
use spotmap_shared::types::{Contribution, SportType, Spot, SpotStatus, User, UserId};

use crate::errors::ServiceError;
use crate::events::ServiceEvent;
use crate::identity::IdentityProvider;

/// Broadcast capacity. Slow subscribers past this lag miss events and
/// reload; they are never allowed to backpressure writers.
const EVENT_CHANNEL_CAPACITY: usize = 64;

/// Caller-supplied fields of a new spot. Everything else (id, owner, status,
/// timestamps, aggregates) is assigned by the service and the store.
#[derive(Debug, Clone)]
pub struct SpotDraft {
    pub name: String,
    pub description: String,
    pub sport_types: Vec<SportType>,
    pub latitude: f64,
    pub longitude: f64,
}

/// The composition point of the spot domain.
///
/// Owns the repositories, the photo pipeline and the identity seam, and
/// exposes the operations the UI layer calls. Mutating operations publish a
/// [`ServiceEvent`] after their write commits.
pub struct SpotService {
    spots: SpotRepository,
    users: UserRepository,
    valuations: ValuationRepository,
    photos: PhotoPipeline,
    identity: Arc<dyn IdentityProvider>,
    events: broadcast::Sender<ServiceEvent>,
}

impl SpotService {
    /// Wires the service over the given stores and identity provider.
    pub fn new(
        store: Arc<dyn DocumentStore>,
        blob_store: Arc<dyn BlobStore>,
        identity: Arc<dyn IdentityProvider>,
        store_config: StoreConfig,
        media_config: MediaConfig,
    ) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            spots: SpotRepository::new(Arc::clone(&store), store_config.clone()),
            users: UserRepository::new(Arc::clone(&store), store_config.clone()),
            valuations: ValuationRepository::new(store, store_config),
            photos: PhotoPipeline::new(blob_store, media_config),
            identity,
            events,
        }
    }

    /// Subscribe to domain events committed after this call.
    pub fn subscribe(&self) -> broadcast::Receiver<ServiceEvent> {
        self.events.subscribe()
    }

    fn require_identity(&self) -> Result<UserId, ServiceError> {
        self.identity
            .current_identity()
            .ok_or(ServiceError::Unauthorized)
    }

    fn publish(&self, event: ServiceEvent) {
        // No subscribers is fine; the send result only reports that.
        let _ = self.events.send(event);
    }

    /// Create a spot owned by the current user, uploading its photos first.
    ///
    /// The UI pre-validates the draft, but the service re-checks it: blank
    /// name or description, an empty sport tag list or out-of-range
    /// coordinates are rejected before anything is written.
    ///
    /// An undecodable photo aborts the whole submission. Upload failures are
    /// partial: the record is still written with the photos that made it,
    /// and [`ServiceError::PhotoUploads`] reports the failed input positions
    /// so the caller can resubmit just those.
    pub async fn create_spot(
        &self,
        draft: SpotDraft,
        photos: Vec<Vec<u8>>,
    ) -> Result<Spot, ServiceError> {
        let owner_id = self.require_identity()?;
        validate_draft(&draft)?;

        let outcome = self
            .photos
            .upload_photos(photos, &owner_id, PhotoPurpose::Spot)
            .await?;

        let spot = self
            .spots
            .create(Spot {
                spot_id: None,
                owner_id,
                name: draft.name,
                sport_types: draft.sport_types,
                description: draft.description,
                latitude: draft.latitude,
                longitude: draft.longitude,
                photo_urls: outcome.succeeded().map(|(_, url)| url.to_owned()).collect(),
                created_at: None,
                status: SpotStatus::Activo,
                average_rating: 0.0,
                total_ratings: 0,
            })
            .await?;

        // The repository assigns the id on create.
        let spot_id = spot.spot_id.clone().unwrap_or_default();
        info!(%spot_id, "spot created");
        self.publish(ServiceEvent::SpotCreated {
            spot_id: spot_id.clone(),
        });

        if !outcome.is_complete() {
            return Err(ServiceError::PhotoUploads {
                spot_id,
                failed_indices: outcome.failed_indices(),
            });
        }
        Ok(spot)
    }

    /// A spot by id, if it exists.
    pub async fn spot(&self, spot_id: &str) -> Result<Option<Spot>, ServiceError> {
        Ok(self.spots.get(spot_id).await?)
    }

    /// All spots that have not been soft-deleted.
    pub async fn active_spots(&self) -> Result<Vec<Spot>, ServiceError> {
        let mut spots = self.spots.get_all().await?;
        spots.retain(|s| s.status != SpotStatus::Eliminado);
        Ok(spots)
    }

    /// Soft-delete a spot and cascade-delete its photo assets.
    ///
    /// Owner-only. The status transition commits first; blob deletes are
    /// best-effort afterwards, so a storage outage can orphan photos but can
    /// never resurrect the spot. The outcome reports which deletes failed.
    pub async fn delete_spot(&self, spot_id: &str) -> Result<CascadeOutcome, ServiceError> {
        let caller = self.require_identity()?;
        let spot = self
            .spots
            .get(spot_id)
            .await?
            .ok_or_else(|| RepositoryError::SpotNotFound(spot_id.to_owned()))?;
        if spot.owner_id != caller {
            return Err(ServiceError::Unauthorized);
        }

        let before = self.spots.mark_deleted(spot_id).await?;
        let outcome = self.photos.delete_photos(&before.photo_urls).await;
        if !outcome.is_clean() {
            warn!(
                %spot_id,
                failed = outcome.failures.len(),
                attempted = outcome.attempted,
                "spot deleted with orphaned photos"
            );
        }

        self.publish(ServiceEvent::SpotDeleted {
            spot_id: spot_id.to_owned(),
        });
        Ok(outcome)
    }

    /// Submit a 1-5 rating of a spot as the current user.
    pub async fn submit_rating(
        &self,
        spot_id: &str,
        score: i32,
        comment: &str,
    ) -> Result<AggregateSnapshot, ServiceError> {
        let rater_id = self.require_identity()?;
        let snapshot = self
            .valuations
            .submit_rating(spot_id, &rater_id, score, comment)
            .await?;
        self.publish(ServiceEvent::RatingSubmitted {
            spot_id: spot_id.to_owned(),
            snapshot,
        });
        Ok(snapshot)
    }

    /// Toggle a spot in the current user's favorites. Returns the resulting
    /// membership.
    pub async fn set_favorite(&self, spot_id: &str, desired: bool) -> Result<bool, ServiceError> {
        let user_id = self.require_identity()?;
        let favorite = self.users.set_favorite(&user_id, spot_id, desired).await?;
        self.publish(ServiceEvent::FavoriteChanged {
            user_id,
            spot_id: spot_id.to_owned(),
            favorite,
        });
        Ok(favorite)
    }

    /// The full records of a user's favorite spots.
    ///
    /// Ids whose document no longer decodes are dropped by the batch
    /// fetcher; soft-deleted spots are filtered here so stale favorites do
    /// not surface them.
    pub async fn favorite_spots(&self, user_id: &str) -> Result<Vec<Spot>, ServiceError> {
        let ids = self.users.favorites(user_id).await?;
        let mut spots = self.spots.get_by_ids(&ids).await?;
        spots.retain(|s| s.status != SpotStatus::Eliminado);
        Ok(spots)
    }

    /// Ensure a profile record exists for the current user (first sign-in).
    pub async fn register_profile(
        &self,
        name: &str,
        email: &str,
    ) -> Result<User, ServiceError> {
        let user_id = self.require_identity()?;
        Ok(self
            .users
            .create_if_absent(User {
                user_id,
                name: name.to_owned(),
                email: email.to_owned(),
                profile_photo_url: None,
                registered_at: 0,
                favorites: Vec::new(),
            })
            .await?)
    }

    /// Replace the current user's profile photo.
    ///
    /// The new image is uploaded first, then the url is swapped on the
    /// profile, then the previous blob is deleted best-effort. A failed
    /// delete orphans one blob and is only logged.
    pub async fn update_profile_photo(&self, bytes: Vec<u8>) -> Result<String, ServiceError> {
        let user_id = self.require_identity()?;
        let url = self
            .photos
            .upload_photo(bytes, &user_id, PhotoPurpose::Profile)
            .await?;
        let previous = self
            .users
            .set_profile_photo_url(&user_id, Some(url.clone()))
            .await?;
        if let Some(old) = previous {
            let _ = self.photos.delete_photo(&old).await;
        }
        Ok(url)
    }

    /// A user's contributions (spots created, ratings given, comments
    /// left), newest first.
    pub async fn contributions(&self, user_id: &str) -> Result<Vec<Contribution>, ServiceError> {
        let all_spots = self.spots.get_all().await?;
        let name_of: HashMap<&str, &str> = all_spots
            .iter()
            .filter_map(|s| {
                s.spot_id
                    .as_deref()
                    .map(|id| (id, s.name.as_str()))
            })
            .collect();

        let mut contributions = Vec::new();
        for spot in &all_spots {
            if spot.owner_id == user_id && spot.status != SpotStatus::Eliminado {
                if let Some(id) = &spot.spot_id {
                    contributions.push(Contribution::CreatedSpot {
                        spot_id: id.clone(),
                        spot_name: spot.name.clone(),
                        date: spot.created_at.unwrap_or(0),
                    });
                }
            }
        }

        for valuation in self.valuations.for_user(user_id).await? {
            let spot_name = name_of
                .get(valuation.spot_id.as_str())
                .map(|n| (*n).to_owned())
                .unwrap_or_default();
            contributions.push(Contribution::Rating {
                spot_id: valuation.spot_id.clone(),
                spot_name: spot_name.clone(),
                score: valuation.score,
                date: valuation.rated_at,
            });
            if !valuation.comment.trim().is_empty() {
                contributions.push(Contribution::Comment {
                    spot_id: valuation.spot_id,
                    spot_name,
                    comment: valuation.comment,
                    date: valuation.rated_at,
                });
            }
        }

        contributions.sort_by_key(|c| std::cmp::Reverse(c.date()));
        Ok(contributions)
    }
}

fn validate_draft(draft: &SpotDraft) -> Result<(), ServiceError> {
    if draft.name.trim().is_empty() {
        return Err(ServiceError::validation("spot name must not be blank"));
    }
    if draft.description.trim().is_empty() {
        return Err(ServiceError::validation(
            "spot description must not be blank",
        ));
    }
    if draft.sport_types.is_empty() {
        return Err(ServiceError::validation(
            "spot needs at least one sport tag",
        ));
    }
    if !(-90.0..=90.0).contains(&draft.latitude) {
        return Err(ServiceError::validation("latitude out of range"));
    }
    if !(-180.0..=180.0).contains(&draft.longitude) {
        return Err(ServiceError::validation("longitude out of range"));
    }
    Ok(())
}
