//! Names of the document-store collections the repositories operate on.

/// Spot documents.
pub const SPOTS: &str = "spots";

/// Valuation documents.
pub const VALUATIONS: &str = "valuations";

/// User profile documents.
pub const USERS: &str = "users";
