//! # Spotmap Repository
//!
//! This crate provides the document-store abstraction and the repositories
//! that keep the denormalized spot state consistent: the rating aggregator,
//! the favorites ledger and the chunked spot batch fetcher. It includes an
//! in-memory store implementation with real optimistic-conflict detection
//! for tests and local development.

pub mod collections;
pub mod config;
pub mod errors;
pub mod interfaces;
pub mod memory;
pub mod spots;
pub mod transaction;
pub mod types;
pub mod users;
pub mod valuations;

pub use config::StoreConfig;
pub use errors::{RepositoryError, StoreError};
pub use interfaces::{DocumentStore, RawDocument, ReadStamp, WriteOp};
pub use memory::MemoryDocumentStore;
pub use spots::SpotRepository;
pub use transaction::{Transaction, run_transaction};
pub use types::AggregateSnapshot;
pub use users::UserRepository;
pub use valuations::ValuationRepository;
