// ============================
// crates/backend-lib/src/storage.rs
// ============================
//! Credential store abstraction with in-memory and flat-file implementations.
use std::{
    fs,
    path::{Path, PathBuf},
    sync::Arc,
};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::{mapref::entry::Entry, DashMap};
use elearn_common::{Avatar, CourseRef, PublicUser, Role, UserId};
use serde::{Deserialize, Serialize};
use tokio::{fs as tokio_fs, sync::Mutex};
use uuid::Uuid;

use crate::error::AppError;

/// Persistent user record.
///
/// This is also the session snapshot kept in the cache, so it serializes
/// every field, the password hash included. API responses go through
/// [`PublicUser`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub email: String,
    /// PHC string; `None` for accounts created through social login
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password_hash: Option<String>,
    #[serde(default)]
    pub avatar: Option<Avatar>,
    #[serde(default)]
    pub role: Role,
    #[serde(default)]
    pub is_verified: bool,
    #[serde(default)]
    pub courses: Vec<CourseRef>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// New account with a fresh id and default role
    pub fn new(username: impl Into<String>, email: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            username: username.into(),
            email: normalize_email(&email.into()),
            password_hash: None,
            avatar: None,
            role: Role::default(),
            is_verified: false,
            courses: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn has_password(&self) -> bool {
        self.password_hash.is_some()
    }

    /// Bump `updated_at` after a mutation
    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

impl From<&User> for PublicUser {
    fn from(user: &User) -> Self {
        PublicUser {
            id: user.id,
            username: user.username.clone(),
            email: user.email.clone(),
            avatar: user.avatar.clone(),
            role: user.role,
            is_verified: user.is_verified,
            courses: user.courses.clone(),
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

/// Canonical form used for lookups and the uniqueness constraint
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Trait for credential store backends
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Insert a new user; fails with `DuplicateEmail` if the email is taken
    async fn create(&self, user: User) -> Result<User, AppError>;

    /// Look a user up by (normalized) email
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError>;

    /// Look a user up by id
    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, AppError>;

    /// Replace an existing user; fails with `DuplicateEmail` if the new email
    /// belongs to someone else
    async fn update(&self, user: User) -> Result<User, AppError>;
}

/// In-memory implementation of the `UserStore` trait
#[derive(Clone, Default)]
pub struct MemoryUserStore {
    users: Arc<DashMap<UserId, User>>,
    by_email: Arc<DashMap<String, UserId>>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }

    fn insert(&self, user: User) -> Result<User, AppError> {
        // The email index entry is the unique constraint
        match self.by_email.entry(user.email.clone()) {
            Entry::Occupied(_) => Err(AppError::DuplicateEmail),
            Entry::Vacant(slot) => {
                slot.insert(user.id);
                self.users.insert(user.id, user.clone());
                Ok(user)
            },
        }
    }

    fn replace(&self, user: User) -> Result<(User, User), AppError> {
        let previous = self
            .users
            .get(&user.id)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| AppError::NotFound(format!("user {}", user.id)))?;

        if previous.email != user.email {
            match self.by_email.entry(user.email.clone()) {
                Entry::Occupied(owner) if *owner.get() != user.id => {
                    return Err(AppError::DuplicateEmail);
                },
                Entry::Occupied(_) => {},
                Entry::Vacant(slot) => {
                    slot.insert(user.id);
                },
            }
            self.by_email
                .remove_if(&previous.email, |_, owner| *owner == user.id);
        }

        self.users.insert(user.id, user.clone());
        Ok((previous, user))
    }

    fn remove(&self, user: &User) {
        self.users.remove(&user.id);
        self.by_email.remove_if(&user.email, |_, owner| *owner == user.id);
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn create(&self, user: User) -> Result<User, AppError> {
        self.insert(user)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let email = normalize_email(email);
        Ok(self
            .by_email
            .get(&email)
            .and_then(|id| self.users.get(id.value()).map(|u| u.value().clone())))
    }

    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, AppError> {
        Ok(self.users.get(&id).map(|u| u.value().clone()))
    }

    async fn update(&self, user: User) -> Result<User, AppError> {
        self.replace(user).map(|(_, user)| user)
    }
}

/// Flat-file implementation of the `UserStore` trait
///
/// Each user is one JSON document under `<root>/users/`. Reads are served
/// from an in-memory index loaded at startup; writes go through a mutex so
/// the index and the files change together.
#[derive(Clone)]
pub struct FlatFileUserStore {
    root: PathBuf,
    index: MemoryUserStore,
    write_lock: Arc<Mutex<()>>,
}

impl FlatFileUserStore {
    pub fn new<P: AsRef<Path>>(root: P) -> anyhow::Result<Self> {
        let root = root.as_ref().to_path_buf();
        let users_dir = root.join("users");
        fs::create_dir_all(&users_dir)?;

        let index = MemoryUserStore::new();
        for entry in fs::read_dir(&users_dir)? {
            let path = entry?.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some("json") {
                continue;
            }
            let content = fs::read_to_string(&path)?;
            let user: User = serde_json::from_str(&content)?;
            if index.insert(user).is_err() {
                anyhow::bail!("duplicate email in {}", path.display());
            }
        }
        tracing::info!(users = index.len(), root = %root.display(), "loaded user store");

        Ok(Self {
            root,
            index,
            write_lock: Arc::new(Mutex::new(())),
        })
    }

    fn user_path(&self, id: UserId) -> PathBuf {
        self.root.join("users").join(format!("{id}.json"))
    }

    async fn write_user(&self, user: &User) -> Result<(), AppError> {
        let path = self.user_path(user.id);
        let tmp = path.with_extension("json.tmp");
        let json = serde_json::to_string_pretty(user)?;
        tokio_fs::write(&tmp, json).await?;
        tokio_fs::rename(&tmp, &path).await?;
        Ok(())
    }
}

#[async_trait]
impl UserStore for FlatFileUserStore {
    async fn create(&self, user: User) -> Result<User, AppError> {
        let _guard = self.write_lock.lock().await;
        let user = self.index.insert(user)?;
        if let Err(err) = self.write_user(&user).await {
            self.index.remove(&user);
            return Err(err);
        }
        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        self.index.find_by_email(email).await
    }

    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, AppError> {
        self.index.find_by_id(id).await
    }

    async fn update(&self, user: User) -> Result<User, AppError> {
        let _guard = self.write_lock.lock().await;
        let (previous, user) = self.index.replace(user)?;
        if let Err(err) = self.write_user(&user).await {
            // Restore the previous record; its email is still free because we hold the lock
            if let Err(rollback_err) = self.index.replace(previous) {
                tracing::error!(
                    user_id = %user.id,
                    error = %rollback_err,
                    "failed to restore user after write error"
                );
            }
            return Err(err);
        }
        Ok(user)
    }
}
