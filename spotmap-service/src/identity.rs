//! The authentication identity seam.
//!
//! The authentication flow itself lives outside this workspace; the service
//! only needs to know who, if anyone, the current caller is.

use std::sync::RwLock;

use spotmap_shared::types::UserId;

/// Supplies the identity of the current caller.
///
/// Implementations adapt whatever session mechanism the host application
/// uses. `None` means no user is signed in; identity-guarded operations then
/// fail with `ServiceError::Unauthorized`.
pub trait IdentityProvider: Send + Sync {
    /// The id of the signed-in user, if any.
    fn current_identity(&self) -> Option<UserId>;
}

/// An identity provider backed by a settable slot, for tests and local runs.
#[derive(Debug, Default)]
pub struct FixedIdentity {
    current: RwLock<Option<UserId>>,
}

impl FixedIdentity {
    /// Starts signed out.
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts signed in as the given user.
    pub fn signed_in(user_id: impl Into<UserId>) -> Self {
        Self {
            current: RwLock::new(Some(user_id.into())),
        }
    }

    /// Replaces the current identity.
    pub fn set(&self, user_id: Option<UserId>) {
        match self.current.write() {
            Ok(mut slot) => *slot = user_id,
            Err(poisoned) => *poisoned.into_inner() = user_id,
        }
    }
}

impl IdentityProvider for FixedIdentity {
    fn current_identity(&self) -> Option<UserId> {
        match self.current.read() {
            Ok(slot) => slot.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}
