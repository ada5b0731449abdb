//! Domain events broadcast by the service.

use spotmap_repository::AggregateSnapshot;
use spotmap_shared::types::{SpotId, UserId};

/// A state change committed by one of the service operations.
///
/// Published on a `tokio::sync::broadcast` channel. Subscribers adapt the
/// stream to their own notification model; a lagged subscriber misses events
/// rather than backpressuring writers, which is acceptable because every
/// event only signals "reload this record".
#[derive(Debug, Clone, PartialEq)]
pub enum ServiceEvent {
    SpotCreated {
        spot_id: SpotId,
    },
    SpotDeleted {
        spot_id: SpotId,
    },
    RatingSubmitted {
        spot_id: SpotId,
        snapshot: AggregateSnapshot,
    },
    FavoriteChanged {
        user_id: UserId,
        spot_id: SpotId,
        favorite: bool,
    },
}
