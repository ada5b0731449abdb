//! # Spotmap Service
//!
//! The composition point of the spotmap core: wires the repositories, the
//! photo pipeline and the caller's identity seam into the high-level
//! operations a UI layer invokes, and broadcasts domain events so
//! live-updating callers can refresh without polling.

pub mod errors;
pub mod events;
pub mod identity;
pub mod service;

pub use errors::ServiceError;
pub use events::ServiceEvent;
pub use identity::{FixedIdentity, IdentityProvider};
pub use service::{SpotDraft, SpotService};
