use serde::{Deserialize, Serialize};

use crate::types::{SpotId, UserId};

/// A registered user profile.
///
/// `favorites` is a set of spot ids stored as a list: insertion order is
/// irrelevant and duplicates are forbidden. The Favorites Ledger is the only
/// mutation path for it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    #[serde(rename = "userId")]
    pub user_id: UserId,
    #[serde(rename = "nombre")]
    pub name: String,
    #[serde(rename = "email")]
    pub email: String,
    #[serde(rename = "fotoPerfilUrl", skip_serializing_if = "Option::is_none")]
    pub profile_photo_url: Option<String>,
    /// Epoch millis of registration.
    #[serde(rename = "fechaRegistro")]
    pub registered_at: i64,
    #[serde(rename = "favoritos", default)]
    pub favorites: Vec<SpotId>,
}
