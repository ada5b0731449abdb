//! Error types for the spot, user and valuation repositories.

use spotmap_shared::types::{SpotId, UserId};
use thiserror::Error;

use crate::errors::StoreError;

/// Errors surfaced by the repository operations.
///
/// Store transport errors are wrapped transparently; everything else is a
/// domain condition the caller can act on (correct the input, show a
/// not-found message, offer a retry after a conflict).
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// The referenced spot does not exist.
    #[error("Spot not found: {0}")]
    SpotNotFound(SpotId),

    /// The referenced user does not exist.
    #[error("User not found: {0}")]
    UserNotFound(UserId),

    /// A rating score outside the accepted `[1, 5]` range.
    #[error("Score {0} is outside the accepted range 1-5")]
    InvalidScore(i32),

    /// An operation that needs a persisted spot received one without an id.
    #[error("Spot has not been persisted yet (missing id)")]
    MissingSpotId,

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl RepositoryError {
    /// Whether a caller can safely retry the failed operation as-is.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Store(e) if e.is_retryable())
    }
}
