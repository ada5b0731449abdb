//! Result types for repository operations.

/// The committed rating aggregate of a spot, as written by one
/// `submit_rating` transaction.
///
/// A caller that wants the freshest displayable value may still reload the
/// spot afterwards; that read is non-transactional and can observe a state
/// authored by a later concurrent writer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AggregateSnapshot {
    pub average_rating: f64,
    pub total_ratings: i64,
}
