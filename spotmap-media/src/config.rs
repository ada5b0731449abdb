//! Configuration types for the photo asset pipeline.

use crate::types::PhotoPurpose;

/// Compression bounds per photo purpose.
///
/// Spot photos keep more detail for the gallery view; profile photos are
/// small avatars. Neither dimension of the output exceeds the purpose's
/// `max_edge`, and images already within bounds are never upscaled.
#[derive(Debug, Clone)]
pub struct MediaConfig {
    /// Long-edge bound for spot photos, pixels.
    pub spot_max_edge: u32,
    /// JPEG quality for spot photos (0-100).
    pub spot_quality: u8,
    /// Long-edge bound for profile photos, pixels.
    pub profile_max_edge: u32,
    /// JPEG quality for profile photos (0-100).
    pub profile_quality: u8,
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            spot_max_edge: 1280,
            spot_quality: 80,
            profile_max_edge: 512,
            profile_quality: 85,
        }
    }
}

impl MediaConfig {
    /// The `(max_edge, quality)` pair for a purpose.
    pub fn bounds(&self, purpose: PhotoPurpose) -> (u32, u8) {
        match purpose {
            PhotoPurpose::Spot => (self.spot_max_edge, self.spot_quality),
            PhotoPurpose::Profile => (self.profile_max_edge, self.profile_quality),
        }
    }
}
