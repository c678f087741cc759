// ============================
// crates/backend-lib/src/cache.rs
// ============================
//! Key-value cache abstraction with an in-memory implementation.
//!
//! The cache is the authoritative "is this user logged in" record, so the
//! trait mirrors the handful of commands a networked cache offers: get, set
//! with optional TTL, set-if-absent and delete.
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use dashmap::{mapref::entry::Entry, DashMap};
use tokio::task::JoinHandle;

use crate::error::AppError;

/// Trait for cache backends
#[async_trait]
pub trait SessionCache: Send + Sync {
    /// Read a live value
    async fn get(&self, key: &str) -> Result<Option<String>, AppError>;

    /// Write a value, replacing any previous one (last write wins)
    async fn set(&self, key: &str, value: String, ttl: Option<Duration>) -> Result<(), AppError>;

    /// Write a value only if no live value exists; returns whether it was written
    async fn set_if_absent(
        &self,
        key: &str,
        value: String,
        ttl: Option<Duration>,
    ) -> Result<bool, AppError>;

    /// Remove a value; returns whether a live value was removed
    async fn delete(&self, key: &str) -> Result<bool, AppError>;
}

#[derive(Debug, Clone)]
struct CacheEntry {
    value: String,
    expires_at: Option<Instant>,
}

impl CacheEntry {
    fn new(value: String, ttl: Option<Duration>) -> Self {
        Self {
            value,
            expires_at: ttl.map(|ttl| Instant::now() + ttl),
        }
    }

    fn is_live(&self, now: Instant) -> bool {
        self.expires_at.map_or(true, |at| now < at)
    }
}

/// In-process cache backed by a concurrent map
#[derive(Debug, Clone, Default)]
pub struct MemoryCache {
    entries: Arc<DashMap<String, CacheEntry>>,
}

impl MemoryCache {
    /// Create an empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored entries, expired ones included until the next sweep
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop expired entries; returns how many were removed
    pub fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let before = self.entries.len();
        self.entries.retain(|_, entry| entry.is_live(now));
        before.saturating_sub(self.entries.len())
    }

    /// Spawn the task that periodically sweeps expired entries
    pub fn spawn_cleanup(&self, interval: Duration) -> JoinHandle<()> {
        let cache = self.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            loop {
                ticker.tick().await;
                let removed = cache.purge_expired();
                if removed > 0 {
                    tracing::debug!(removed, remaining = cache.len(), "purged expired cache entries");
                }
            }
        })
    }
}

#[async_trait]
impl SessionCache for MemoryCache {
    async fn get(&self, key: &str) -> Result<Option<String>, AppError> {
        let now = Instant::now();
        if let Some(entry) = self.entries.get(key) {
            if entry.is_live(now) {
                return Ok(Some(entry.value.clone()));
            }
        }
        // Expired: drop it eagerly so the map does not wait for the sweep
        self.entries.remove_if(key, |_, entry| !entry.is_live(now));
        Ok(None)
    }

    async fn set(&self, key: &str, value: String, ttl: Option<Duration>) -> Result<(), AppError> {
        self.entries.insert(key.to_string(), CacheEntry::new(value, ttl));
        Ok(())
    }

    async fn set_if_absent(
        &self,
        key: &str,
        value: String,
        ttl: Option<Duration>,
    ) -> Result<bool, AppError> {
        match self.entries.entry(key.to_string()) {
            Entry::Occupied(mut occupied) => {
                if occupied.get().is_live(Instant::now()) {
                    return Ok(false);
                }
                occupied.insert(CacheEntry::new(value, ttl));
                Ok(true)
            },
            Entry::Vacant(vacant) => {
                vacant.insert(CacheEntry::new(value, ttl));
                Ok(true)
            },
        }
    }

    async fn delete(&self, key: &str) -> Result<bool, AppError> {
        let now = Instant::now();
        Ok(self
            .entries
            .remove(key)
            .is_some_and(|(_, entry)| entry.is_live(now)))
    }
}
