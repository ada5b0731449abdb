//! Request and outcome types for the photo pipeline.

use crate::errors::MediaError;

/// What an uploaded photo is for; selects the key namespace and the
/// compression bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhotoPurpose {
    /// A photo attached to a spot.
    Spot,
    /// A user's profile photo.
    Profile,
}

impl PhotoPurpose {
    /// Key prefix in the blob store.
    pub fn key_prefix(&self) -> &'static str {
        match self {
            PhotoPurpose::Spot => "spots",
            PhotoPurpose::Profile => "profile_images",
        }
    }
}

/// Outcome of a multi-photo fan-out upload.
///
/// `results[i]` is the outcome for the photo at input position `i`, so a
/// caller can retry exactly the failed subset. Decode failures never appear
/// here: they abort the whole submission before any upload starts.
#[derive(Debug)]
pub struct PhotoBatchOutcome {
    /// Per-input url or upload error, in input order.
    pub results: Vec<Result<String, MediaError>>,
}

impl PhotoBatchOutcome {
    /// Outcome of an empty submission.
    pub fn empty() -> Self {
        Self { results: Vec::new() }
    }

    /// Whether every upload succeeded.
    pub fn is_complete(&self) -> bool {
        self.results.iter().all(Result::is_ok)
    }

    /// All urls in input order, if every upload succeeded.
    pub fn urls(&self) -> Option<Vec<String>> {
        self.results
            .iter()
            .map(|r| r.as_ref().ok().cloned())
            .collect()
    }

    /// The urls that did make it, paired with their input positions.
    pub fn succeeded(&self) -> impl Iterator<Item = (usize, &str)> {
        self.results
            .iter()
            .enumerate()
            .filter_map(|(i, r)| r.as_deref().ok().map(|url| (i, url)))
    }

    /// Input positions whose upload failed and can be retried.
    pub fn failed_indices(&self) -> Vec<usize> {
        self.results
            .iter()
            .enumerate()
            .filter_map(|(i, r)| r.is_err().then_some(i))
            .collect()
    }
}

/// Outcome of a cascading photo delete.
///
/// Every url is attempted; failures are collected rather than aborting the
/// cascade, because photo cleanup is not part of the spot record's
/// correctness invariant.
#[derive(Debug)]
pub struct CascadeOutcome {
    /// How many deletes were attempted (always the full url list).
    pub attempted: usize,
    /// The urls whose delete failed, with the error.
    pub failures: Vec<(String, MediaError)>,
}

impl CascadeOutcome {
    /// Whether every delete went through.
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}
