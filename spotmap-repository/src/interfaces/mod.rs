//! This module defines and re-exports the interfaces for the document store.
//! It serves as a central point for accessing the storage traits.
mod document_store;

pub use document_store::{DocumentStore, RawDocument, ReadStamp, WriteOp};
