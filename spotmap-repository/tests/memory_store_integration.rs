//! Integration tests for the repositories over the in-memory store.
//!
//! These exercise the real transaction and conflict-detection machinery end
//! to end, with no mocking inside the store.

use std::sync::Arc;

use spotmap_repository::{
    DocumentStore, MemoryDocumentStore, SpotRepository, StoreConfig, UserRepository,
    ValuationRepository,
};
use spotmap_shared::types::{SportType, Spot, SpotStatus, User};

fn store() -> Arc<dyn DocumentStore> {
    Arc::new(MemoryDocumentStore::new(StoreConfig::default()))
}

fn spot_draft(owner: &str, name: &str) -> Spot {
    Spot {
        spot_id: None,
        owner_id: owner.to_owned(),
        name: name.to_owned(),
        sport_types: vec![SportType::Surf],
        description: "Reef pass".to_owned(),
        latitude: 0.0,
        longitude: 0.0,
        photo_urls: Vec::new(),
        created_at: None,
        status: SpotStatus::Activo,
        average_rating: 0.0,
        total_ratings: 0,
    }
}

fn profile(user_id: &str) -> User {
    User {
        user_id: user_id.to_owned(),
        name: "Test User".to_owned(),
        email: "user@example.com".to_owned(),
        profile_photo_url: None,
        registered_at: 0,
        favorites: Vec::new(),
    }
}

#[tokio::test]
async fn aggregate_stays_consistent_across_many_sequential_ratings() {
    let store = store();
    let spots = SpotRepository::new(Arc::clone(&store), StoreConfig::default());
    let valuations = ValuationRepository::new(Arc::clone(&store), StoreConfig::default());

    let spot = spots.create(spot_draft("owner", "Mundaka")).await.unwrap();
    let spot_id = spot.spot_id.unwrap();

    let scores = [5, 3, 4, 1, 2, 5, 5, 4];
    for (i, score) in scores.iter().enumerate() {
        valuations
            .submit_rating(&spot_id, &format!("rater-{i}"), *score, "")
            .await
            .unwrap();
    }

    let reloaded = spots.get(&spot_id).await.unwrap().unwrap();
    assert_eq!(reloaded.total_ratings, scores.len() as i64);
    let sum: i32 = scores.iter().sum();
    let expected = f64::from(sum) / scores.len() as f64;
    assert!((reloaded.average_rating - expected).abs() < 1e-9);
    // The per-rating documents are all there, newest first.
    let history = valuations.for_spot(&spot_id).await.unwrap();
    assert_eq!(history.len(), scores.len());
    for pair in history.windows(2) {
        assert!(pair[0].rated_at >= pair[1].rated_at);
    }
}

#[tokio::test]
async fn concurrent_raters_never_lose_an_update() {
    let store = store();
    let spots = SpotRepository::new(Arc::clone(&store), StoreConfig::default());
    let valuations = Arc::new(ValuationRepository::new(
        Arc::clone(&store),
        StoreConfig::default(),
    ));

    let spot = spots.create(spot_draft("owner", "Mundaka")).await.unwrap();
    let spot_id = spot.spot_id.unwrap();

    let mut handles = Vec::new();
    for i in 0..10 {
        let valuations = Arc::clone(&valuations);
        let spot_id = spot_id.clone();
        handles.push(tokio::spawn(async move {
            valuations
                .submit_rating(&spot_id, &format!("rater-{i}"), (i % 5) + 1, "")
                .await
        }));
    }
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    let reloaded = spots.get(&spot_id).await.unwrap().unwrap();
    assert_eq!(reloaded.total_ratings, 10);
    // Scores 1..=5 twice over: mean 3 exactly.
    assert!((reloaded.average_rating - 3.0).abs() < 1e-9);
}

#[tokio::test]
async fn favorites_survive_the_chunked_batch_fetch() {
    let store = store();
    let spots = SpotRepository::new(Arc::clone(&store), StoreConfig::default());
    let users = UserRepository::new(Arc::clone(&store), StoreConfig::default());
    users.create_if_absent(profile("u1")).await.unwrap();

    let mut ids = Vec::new();
    for i in 0..65 {
        let spot = spots
            .create(spot_draft("owner", &format!("spot-{i}")))
            .await
            .unwrap();
        let id = spot.spot_id.unwrap();
        users.set_favorite("u1", &id, true).await.unwrap();
        ids.push(id);
    }

    let favorites = users.favorites("u1").await.unwrap();
    assert_eq!(favorites.len(), 65);

    let fetched = spots.get_by_ids(&favorites).await.unwrap();
    assert_eq!(fetched.len(), 65);
}

#[tokio::test]
async fn first_sign_in_race_creates_exactly_one_profile() {
    let store = store();
    let users = Arc::new(UserRepository::new(
        Arc::clone(&store),
        StoreConfig::default(),
    ));

    let mut handles = Vec::new();
    for i in 0..4 {
        let users = Arc::clone(&users);
        handles.push(tokio::spawn(async move {
            let mut user = profile("u1");
            user.name = format!("attempt-{i}");
            users.create_if_absent(user).await
        }));
    }

    let mut names = Vec::new();
    for handle in handles {
        names.push(handle.await.unwrap().unwrap().name);
    }
    // Every caller observed the same winning record.
    let stored = users.get("u1").await.unwrap().unwrap();
    assert!(names.iter().all(|n| *n == stored.name));
}

#[tokio::test]
async fn soft_delete_keeps_the_document_but_flips_the_status() {
    let store = store();
    let spots = SpotRepository::new(Arc::clone(&store), StoreConfig::default());

    let mut draft = spot_draft("owner", "Mundaka");
    draft.photo_urls = vec!["mem://spots/owner/a.jpg".to_owned()];
    let spot = spots.create(draft).await.unwrap();
    let spot_id = spot.spot_id.unwrap();

    let before = spots.mark_deleted(&spot_id).await.unwrap();
    // Photo urls are reported from the pre-transition state so the caller
    // can cascade-delete the blobs.
    assert_eq!(before.photo_urls.len(), 1);

    let after = spots.get(&spot_id).await.unwrap().unwrap();
    assert_eq!(after.status, SpotStatus::Eliminado);
}
