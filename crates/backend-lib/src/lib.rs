// ============================
// crates/backend-lib/src/lib.rs
// ============================
//! Core auth and session functionality for the e-learning backend.

pub mod auth;
pub mod cache;
pub mod config;
pub mod cookies;
pub mod error;
pub mod handlers;
pub mod mail;
pub mod metrics;
pub mod middleware;
pub mod router;
pub mod storage;
pub mod validation;

use std::sync::Arc;

use crate::auth::{
    ActivationFlow, AuthRateLimiter, Hasher, SessionFlow, SessionStore, TokenService,
};
use crate::cache::SessionCache;
use crate::config::Settings;
use crate::cookies::CookiePolicy;
use crate::mail::Mailer;
use crate::storage::UserStore;

pub use router::create_router;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    /// Settings the state was built from
    pub settings: Arc<Settings>,
    /// Signup and activation
    pub activation: ActivationFlow,
    /// Login session lifecycle
    pub sessions: SessionFlow,
    /// Auth cookie attributes
    pub cookies: CookiePolicy,
}

impl AppState {
    /// Create a new application state over the given backends
    pub fn new(
        store: Arc<dyn UserStore>,
        cache: Arc<dyn SessionCache>,
        mailer: Arc<dyn Mailer>,
        settings: Settings,
    ) -> anyhow::Result<Self> {
        settings.validate()?;

        let tokens = Arc::new(TokenService::new(&settings.tokens));
        let hasher = Arc::new(Hasher::new(settings.password_hash.log_n)?);
        // Session snapshots live exactly as long as the refresh token
        let session_store = SessionStore::new(cache, settings.tokens.refresh_ttl());
        let limiter = AuthRateLimiter::from_settings(&settings.login_throttle);

        let activation = ActivationFlow::new(
            Arc::clone(&store),
            session_store.clone(),
            Arc::clone(&tokens),
            mailer,
            Arc::clone(&hasher),
        );
        let sessions = SessionFlow::new(store, session_store, tokens, hasher, limiter);

        let cookies = CookiePolicy {
            secure: settings.cookies.secure,
            access_ttl: settings.tokens.access_ttl(),
            refresh_ttl: settings.tokens.refresh_ttl(),
        };

        Ok(Self {
            settings: Arc::new(settings),
            activation,
            sessions,
            cookies,
        })
    }
}
