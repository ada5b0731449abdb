use serde::{Deserialize, Serialize};

use crate::types::SpotId;

/// A user's contribution to the community, as shown on their profile.
///
/// Closed sum type with exhaustive matching; every variant carries the spot
/// it refers to and the contribution date (epoch millis) for sorting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Contribution {
    /// The user created this spot.
    CreatedSpot {
        spot_id: SpotId,
        spot_name: String,
        date: i64,
    },
    /// The user rated this spot.
    Rating {
        spot_id: SpotId,
        spot_name: String,
        score: i32,
        date: i64,
    },
    /// The user left a comment on this spot.
    Comment {
        spot_id: SpotId,
        spot_name: String,
        comment: String,
        date: i64,
    },
}

impl Contribution {
    /// The contribution date, used to sort feeds newest first.
    pub fn date(&self) -> i64 {
        match self {
            Contribution::CreatedSpot { date, .. }
            | Contribution::Rating { date, .. }
            | Contribution::Comment { date, .. } => *date,
        }
    }

    /// The spot this contribution refers to.
    pub fn spot_id(&self) -> &SpotId {
        match self {
            Contribution::CreatedSpot { spot_id, .. }
            | Contribution::Rating { spot_id, .. }
            | Contribution::Comment { spot_id, .. } => spot_id,
        }
    }
}
