// ============================
// crates/backend-lib/src/auth/session.rs
// ============================
//! Session snapshots kept in the cache.
//!
//! A user counts as logged in exactly while the cache holds an entry under
//! their id. The entry is the full user record serialized as JSON.
use std::{sync::Arc, time::Duration};

use elearn_common::UserId;

use crate::cache::SessionCache;
use crate::error::AppError;
use crate::storage::User;

/// Key prefix of consumed activation tickets
const ACTIVATION_PREFIX: &str = "activation:";

/// Session store layered over a [`SessionCache`]
#[derive(Clone)]
pub struct SessionStore {
    cache: Arc<dyn SessionCache>,
    ttl: Duration,
}

impl SessionStore {
    /// `ttl` should match the refresh token lifetime
    pub fn new(cache: Arc<dyn SessionCache>, ttl: Duration) -> Self {
        Self { cache, ttl }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Write (or overwrite) the snapshot of `user`, renewing its TTL
    pub async fn put(&self, user: &User) -> Result<(), AppError> {
        let value = serde_json::to_string(user)?;
        self.cache
            .set(&user.id.to_string(), value, Some(self.ttl))
            .await?;
        tracing::debug!(user_id = %user.id, "session stored");
        Ok(())
    }

    /// Read the live snapshot of a user
    pub async fn get(&self, user_id: UserId) -> Result<Option<User>, AppError> {
        self.get_by_key(&user_id.to_string()).await
    }

    /// Read a snapshot by the raw id carried in token claims
    pub async fn get_by_key(&self, key: &str) -> Result<Option<User>, AppError> {
        match self.cache.get(key).await? {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    /// Drop the snapshot; returns whether one was live
    pub async fn remove(&self, user_id: UserId) -> Result<bool, AppError> {
        let removed = self.cache.delete(&user_id.to_string()).await?;
        tracing::debug!(user_id = %user_id, removed, "session removed");
        Ok(removed)
    }

    /// Mark an activation ticket as used. Returns false if it already was.
    pub async fn claim_activation(&self, ticket_id: &str, ttl: Duration) -> Result<bool, AppError> {
        let key = format!("{ACTIVATION_PREFIX}{ticket_id}");
        self.cache
            .set_if_absent(&key, "used".to_string(), Some(ttl))
            .await
    }

    /// Undo a claim so the ticket can be presented again
    pub async fn release_activation(&self, ticket_id: &str) -> Result<(), AppError> {
        self.cache
            .delete(&format!("{ACTIVATION_PREFIX}{ticket_id}"))
            .await?;
        Ok(())
    }
}
