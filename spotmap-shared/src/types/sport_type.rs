use serde::{Deserialize, Serialize};

/// The closed set of sport disciplines a spot can be tagged with.
///
/// The serialized forms match the strings stored in the `tiposDeporte`
/// field of the `spots` collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SportType {
    #[serde(rename = "Surf")]
    Surf,
    #[serde(rename = "Surfskate")]
    Surfskate,
    #[serde(rename = "Skatepark")]
    Skatepark,
}

impl SportType {
    /// Returns the stored string form of this sport type.
    pub fn as_str(&self) -> &'static str {
        match self {
            SportType::Surf => "Surf",
            SportType::Surfskate => "Surfskate",
            SportType::Skatepark => "Skatepark",
        }
    }

    /// Parses a stored string form back into a `SportType`, if recognized.
    pub fn from_str_opt(value: &str) -> Option<Self> {
        match value {
            "Surf" => Some(SportType::Surf),
            "Surfskate" => Some(SportType::Surfskate),
            "Skatepark" => Some(SportType::Skatepark),
            _ => None,
        }
    }
}
