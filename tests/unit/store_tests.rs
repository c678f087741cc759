// =========================
// tests/unit/store_tests.rs
// =========================
//! Unit tests for the credential store and session cache
use std::sync::Arc;
use std::time::Duration;

use elearn_backend_lib::auth::SessionStore;
use elearn_backend_lib::cache::{MemoryCache, SessionCache};
use elearn_backend_lib::error::AppError;
use elearn_backend_lib::storage::{FlatFileUserStore, User, UserStore};
use tempfile::tempdir;

#[tokio::test]
async fn test_flat_file_store_survives_restart() {
    let dir = tempdir().unwrap();

    let id = {
        let store = FlatFileUserStore::new(dir.path()).unwrap();
        let mut user = User::new("a", "a@x.com");
        user.password_hash = Some("$scrypt$hash".to_string());
        let user = store.create(user).await.unwrap();

        let mut renamed = user.clone();
        renamed.email = "b@x.com".to_string();
        store.update(renamed).await.unwrap();
        user.id
    };

    let reopened = FlatFileUserStore::new(dir.path()).unwrap();
    let user = reopened.find_by_id(id).await.unwrap().unwrap();
    assert_eq!(user.email, "b@x.com");
    assert_eq!(user.password_hash.as_deref(), Some("$scrypt$hash"));
    assert!(reopened.find_by_email("a@x.com").await.unwrap().is_none());

    let duplicate = reopened.create(User::new("c", "B@x.com")).await;
    assert!(matches!(duplicate, Err(AppError::DuplicateEmail)));
}

#[tokio::test]
async fn test_session_store_uses_cache_ttl() {
    let cache = MemoryCache::new();
    let sessions = SessionStore::new(Arc::new(cache.clone()), Duration::from_millis(20));
    let user = User::new("a", "a@x.com");

    sessions.put(&user).await.unwrap();
    assert!(cache.get(&user.id.to_string()).await.unwrap().is_some());

    tokio::time::sleep(Duration::from_millis(40)).await;
    assert!(sessions.get(user.id).await.unwrap().is_none());
    // Expired entries are dropped on read
    assert!(cache.is_empty());
}
