//! Integration tests for the full service over the in-memory stores.
//!
//! These walk realistic multi-user journeys through the real repositories,
//! transaction machinery and photo pipeline; only the storage backends are
//! in-memory.

use std::sync::Arc;

use image::codecs::jpeg::JpegEncoder;
use spotmap_media::{MediaConfig, MemoryBlobStore};
use spotmap_repository::{MemoryDocumentStore, StoreConfig};
use spotmap_service::{FixedIdentity, ServiceEvent, SpotDraft, SpotService};
use spotmap_shared::types::{SportType, SpotStatus};

struct World {
    service: SpotService,
    identity: Arc<FixedIdentity>,
    blob_store: Arc<MemoryBlobStore>,
}

fn world() -> World {
    let identity = Arc::new(FixedIdentity::new());
    let blob_store = Arc::new(MemoryBlobStore::new());
    let service = SpotService::new(
        Arc::new(MemoryDocumentStore::new(StoreConfig::default())),
        blob_store.clone(),
        identity.clone(),
        StoreConfig::default(),
        MediaConfig::default(),
    );
    World {
        service,
        identity,
        blob_store,
    }
}

async fn sign_in(w: &World, user_id: &str, name: &str) {
    w.identity.set(Some(user_id.to_owned()));
    w.service
        .register_profile(name, &format!("{user_id}@example.com"))
        .await
        .unwrap();
}

fn jpeg(width: u32, height: u32) -> Vec<u8> {
    let img = image::RgbImage::from_pixel(width, height, image::Rgb([30, 90, 180]));
    let mut out = Vec::new();
    img.write_with_encoder(JpegEncoder::new_with_quality(&mut out, 90))
        .unwrap();
    out
}

fn surf_draft(name: &str) -> SpotDraft {
    SpotDraft {
        name: name.to_owned(),
        description: "Hollow beach break by the harbor wall".to_owned(),
        sport_types: vec![SportType::Surf, SportType::Surfskate],
        latitude: 43.32,
        longitude: -1.99,
    }
}

#[tokio::test]
async fn a_spot_lifecycle_seen_by_two_users() {
    let w = world();

    // The owner signs in and shares a spot with two photos.
    sign_in(&w, "owner", "Maialen").await;
    let mut events = w.service.subscribe();
    let spot = w
        .service
        .create_spot(surf_draft("Zurriola"), vec![jpeg(1600, 900), jpeg(800, 800)])
        .await
        .unwrap();
    let spot_id = spot.spot_id.clone().unwrap();
    assert_eq!(w.blob_store.len(), 2);
    assert_eq!(
        events.recv().await.unwrap(),
        ServiceEvent::SpotCreated {
            spot_id: spot_id.clone()
        }
    );

    // A visitor rates it twice-over sessions and favorites it.
    sign_in(&w, "visitor", "Jon").await;
    let snapshot = w.service.submit_rating(&spot_id, 5, "glassy").await.unwrap();
    assert_eq!(snapshot.total_ratings, 1);
    let snapshot = w.service.submit_rating(&spot_id, 3, "").await.unwrap();
    assert_eq!(snapshot.total_ratings, 2);
    assert!((snapshot.average_rating - 4.0).abs() < 1e-9);

    assert!(w.service.set_favorite(&spot_id, true).await.unwrap());
    let favorites = w.service.favorite_spots("visitor").await.unwrap();
    assert_eq!(favorites.len(), 1);
    assert!((favorites[0].average_rating - 4.0).abs() < 1e-9);

    // The visitor's profile feed shows the rating and the comment.
    let feed = w.service.contributions("visitor").await.unwrap();
    assert_eq!(feed.len(), 3); // two ratings, one non-blank comment

    // Only the owner can take it down; doing so removes the blobs and the
    // visitor's stale favorite no longer resolves.
    let err = w.service.delete_spot(&spot_id).await;
    assert!(err.is_err());
    w.identity.set(Some("owner".to_owned()));
    let outcome = w.service.delete_spot(&spot_id).await.unwrap();
    assert_eq!(outcome.attempted, 2);
    assert!(outcome.is_clean());
    assert!(w.blob_store.is_empty());
    assert!(w.service.favorite_spots("visitor").await.unwrap().is_empty());

    // The document survives as a tombstone.
    let tombstone = w.service.spot(&spot_id).await.unwrap().unwrap();
    assert_eq!(tombstone.status, SpotStatus::Eliminado);
}

#[tokio::test]
async fn events_reach_every_subscriber_in_commit_order() {
    let w = world();
    sign_in(&w, "owner", "Maialen").await;
    let mut first = w.service.subscribe();
    let mut second = w.service.subscribe();

    let spot = w.service.create_spot(surf_draft("Zarautz"), vec![]).await.unwrap();
    let spot_id = spot.spot_id.unwrap();
    w.service.set_favorite(&spot_id, true).await.unwrap();

    for events in [&mut first, &mut second] {
        assert_eq!(
            events.recv().await.unwrap(),
            ServiceEvent::SpotCreated {
                spot_id: spot_id.clone()
            }
        );
        assert_eq!(
            events.recv().await.unwrap(),
            ServiceEvent::FavoriteChanged {
                user_id: "owner".to_owned(),
                spot_id: spot_id.clone(),
                favorite: true
            }
        );
    }
}

#[tokio::test]
async fn profile_photos_are_bounded_and_replaced_atomically() {
    let w = world();
    sign_in(&w, "u1", "Maialen").await;

    let url = w.service.update_profile_photo(jpeg(2000, 1000)).await.unwrap();
    let stored = image::load_from_memory(&w.blob_store.get(&url).unwrap()).unwrap();
    assert_eq!(stored.width().max(stored.height()), 512);

    let replacement = w.service.update_profile_photo(jpeg(300, 300)).await.unwrap();
    assert_ne!(url, replacement);
    assert_eq!(w.blob_store.len(), 1);
}
