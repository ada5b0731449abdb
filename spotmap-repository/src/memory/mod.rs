//! In-memory document store for testing and local development.
mod store;

pub use store::MemoryDocumentStore;
