use serde::{Deserialize, Serialize};

use crate::types::{SpotId, UserId, ValuationId};

/// One user's 1-5 rating of a spot, with an optional free-text comment.
///
/// Valuations are immutable once created: there is no update or retraction
/// path, which is what keeps `total_ratings` monotonically non-decreasing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Valuation {
    /// Document id, assigned by the store. `None` only before creation.
    #[serde(rename = "valuationId", skip_serializing_if = "Option::is_none")]
    pub valuation_id: Option<ValuationId>,
    #[serde(rename = "userId")]
    pub rater_id: UserId,
    #[serde(rename = "spotId")]
    pub spot_id: SpotId,
    /// Integer score in `[1, 5]`.
    #[serde(rename = "nota")]
    pub score: i32,
    #[serde(rename = "comentario", default)]
    pub comment: String,
    /// Epoch millis of submission.
    #[serde(rename = "fechaValoracion")]
    pub rated_at: i64,
}
