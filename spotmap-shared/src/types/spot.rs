use serde::{Deserialize, Serialize};

use crate::types::{SportType, SpotId, UserId};

/// Lifecycle status of a spot.
///
/// Deleting a spot is a soft delete: the status moves to `Eliminado` and the
/// document stays in the store, but the spot's photo assets are removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SpotStatus {
    #[serde(rename = "activo")]
    Activo,
    #[serde(rename = "inactivo")]
    Inactivo,
    #[serde(rename = "eliminado")]
    Eliminado,
}

/// A user-submitted point of interest with sport tags, description, photos
/// and the denormalized rating aggregate.
///
/// The serde renames match the field names of the `spots` collection. The
/// aggregate pair upholds the invariant that `average_rating * total_ratings`
/// equals the sum of all committed valuation scores for the spot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Spot {
    /// Document id, assigned by the store. `None` only before creation.
    #[serde(rename = "spotId", skip_serializing_if = "Option::is_none")]
    pub spot_id: Option<SpotId>,
    #[serde(rename = "userId")]
    pub owner_id: UserId,
    #[serde(rename = "nombre")]
    pub name: String,
    #[serde(rename = "tiposDeporte")]
    pub sport_types: Vec<SportType>,
    #[serde(rename = "descripcion")]
    pub description: String,
    #[serde(rename = "latitud")]
    pub latitude: f64,
    #[serde(rename = "longitud")]
    pub longitude: f64,
    #[serde(rename = "fotosUrls", default)]
    pub photo_urls: Vec<String>,
    /// Epoch millis, assigned by the store on creation (server timestamp).
    #[serde(rename = "fechaCreacion", skip_serializing_if = "Option::is_none")]
    pub created_at: Option<i64>,
    #[serde(rename = "estado", default = "SpotStatus::active")]
    pub status: SpotStatus,
    #[serde(rename = "averageRating", default)]
    pub average_rating: f64,
    #[serde(rename = "totalRatings", default)]
    pub total_ratings: i64,
}

impl SpotStatus {
    fn active() -> Self {
        SpotStatus::Activo
    }
}
