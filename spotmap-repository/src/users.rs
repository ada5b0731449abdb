//! User repository: profiles and the favorites ledger.

use std::sync::Arc;

use spotmap_shared::types::User;

use crate::collections;
use crate::config::StoreConfig;
use crate::errors::{RepositoryError, StoreError};
use crate::interfaces::{DocumentStore, RawDocument, WriteOp};
use crate::transaction::run_transaction;

/// Repository for the `users` collection.
///
/// The favorites set lives denormalized on the user document; every mutation
/// of it re-reads the document inside a transaction, so the set never holds
/// duplicates no matter how calls interleave.
pub struct UserRepository {
    store: Arc<dyn DocumentStore>,
    config: StoreConfig,
}

fn corrupt(id: &str, e: serde_json::Error) -> StoreError {
    StoreError::backend(format!("corrupt user document {id}: {e}"))
}

fn user_from_value(id: &str, data: serde_json::Value) -> Result<User, serde_json::Error> {
    let mut user: User = serde_json::from_value(data)?;
    user.user_id = id.to_owned();
    Ok(user)
}

fn user_from_doc(doc: &RawDocument) -> Result<User, serde_json::Error> {
    user_from_value(&doc.id, doc.data.clone())
}

fn user_to_value(user: &User) -> Result<serde_json::Value, StoreError> {
    serde_json::to_value(user).map_err(|e| StoreError::backend(format!("encode user: {e}")))
}

impl UserRepository {
    /// Create a new repository over the given store.
    pub fn new(store: Arc<dyn DocumentStore>, config: StoreConfig) -> Self {
        Self { store, config }
    }

    /// Fetch a user profile by id.
    pub async fn get(&self, user_id: &str) -> Result<Option<User>, RepositoryError> {
        match self.store.get(collections::USERS, user_id).await? {
            Some(doc) => Ok(Some(user_from_doc(&doc).map_err(|e| corrupt(user_id, e))?)),
            None => Ok(None),
        }
    }

    /// Create the profile document on first sign-in, if it does not exist.
    ///
    /// Read-then-create inside a transaction: a concurrent first sign-in on
    /// another device cannot produce two documents or clobber an existing
    /// profile. Returns the profile that ends up in the store.
    pub async fn create_if_absent(&self, user: User) -> Result<User, RepositoryError> {
        run_transaction(&self.store, self.config.max_txn_attempts, |txn| {
            let user = user.clone();
            Box::pin(async move {
                let user_id = user.user_id.clone();
                if let Some(existing) = txn.get(collections::USERS, &user_id).await? {
                    return user_from_value(&user_id, existing)
                        .map_err(|e| corrupt(&user_id, e).into());
                }

                let mut created = user;
                created.registered_at = txn.now_millis();
                created.favorites.clear();
                txn.create(collections::USERS, user_id, user_to_value(&created)?);
                Ok(created)
            })
        })
        .await
    }

    /// Overwrite a user's profile fields. Direct write; the favorites set
    /// must be mutated through [`UserRepository::set_favorite`] instead.
    pub async fn update(&self, user: &User) -> Result<(), RepositoryError> {
        let data = user_to_value(user)?;
        self.store
            .commit(
                &[],
                vec![WriteOp::Set {
                    collection: collections::USERS,
                    id: user.user_id.clone(),
                    data,
                }],
            )
            .await?;
        Ok(())
    }

    /// Atomically toggle membership of a spot id in the user's favorites set.
    ///
    /// Idempotent: repeating the call with the same `desired` value is a
    /// successful no-op. Returns the resulting membership.
    pub async fn set_favorite(
        &self,
        user_id: &str,
        spot_id: &str,
        desired: bool,
    ) -> Result<bool, RepositoryError> {
        run_transaction(&self.store, self.config.max_txn_attempts, |txn| {
            let user_id = user_id.to_owned();
            let spot_id = spot_id.to_owned();
            Box::pin(async move {
                let data = txn
                    .get(collections::USERS, &user_id)
                    .await?
                    .ok_or_else(|| RepositoryError::UserNotFound(user_id.clone()))?;
                let mut user =
                    user_from_value(&user_id, data).map_err(|e| corrupt(&user_id, e))?;

                let present = user.favorites.iter().any(|s| s == &spot_id);
                match (desired, present) {
                    (true, false) => user.favorites.push(spot_id),
                    (false, true) => user.favorites.retain(|s| s != &spot_id),
                    // Already in the desired state: still a success, nothing
                    // to write.
                    _ => return Ok(desired),
                }

                txn.set(collections::USERS, user_id, user_to_value(&user)?);
                Ok(desired)
            })
        })
        .await
    }

    /// The user's favorite spot ids.
    pub async fn favorites(&self, user_id: &str) -> Result<Vec<String>, RepositoryError> {
        let user = self
            .get(user_id)
            .await?
            .ok_or_else(|| RepositoryError::UserNotFound(user_id.to_owned()))?;
        Ok(user.favorites)
    }

    /// Swap the profile photo url, returning the previous one so the caller
    /// can dispose of the old blob.
    pub async fn set_profile_photo_url(
        &self,
        user_id: &str,
        url: Option<String>,
    ) -> Result<Option<String>, RepositoryError> {
        run_transaction(&self.store, self.config.max_txn_attempts, |txn| {
            let user_id = user_id.to_owned();
            let url = url.clone();
            Box::pin(async move {
                let data = txn
                    .get(collections::USERS, &user_id)
                    .await?
                    .ok_or_else(|| RepositoryError::UserNotFound(user_id.clone()))?;
                let mut user =
                    user_from_value(&user_id, data).map_err(|e| corrupt(&user_id, e))?;

                let previous = std::mem::replace(&mut user.profile_photo_url, url);
                txn.set(collections::USERS, user_id, user_to_value(&user)?);
                Ok(previous)
            })
        })
        .await
    }
}
