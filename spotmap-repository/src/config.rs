//! Configuration types for the document-store repositories.

/// Configuration shared by the store implementations and the repositories.
///
/// `max_batch_size` is the store-imposed bound on a single membership query
/// (30 ids for the managed backend); the batch fetcher chunks larger id
/// lists by this value rather than hard-coding the limit at call sites.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Maximum number of ids a single membership query may carry.
    pub max_batch_size: usize,
    /// Maximum attempts of an optimistic transaction before giving up
    /// with a conflict error.
    pub max_txn_attempts: u32,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            max_batch_size: 30,
            max_txn_attempts: 5,
        }
    }
}

impl StoreConfig {
    /// Create a config with a custom membership-query limit.
    pub fn with_max_batch_size(max_batch_size: usize) -> Self {
        Self {
            max_batch_size,
            ..Self::default()
        }
    }

    /// Create a config with a custom transaction attempt bound.
    pub fn with_max_txn_attempts(max_txn_attempts: u32) -> Self {
        Self {
            max_txn_attempts,
            ..Self::default()
        }
    }
}
