//! Error types for the spotmap repositories.
//! Consolidates and re-exports the store-level and repository-level errors.
mod repository;
mod store;

pub use repository::RepositoryError;
pub use store::StoreError;
