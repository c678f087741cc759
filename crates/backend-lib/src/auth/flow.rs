// ============================
// crates/backend-lib/src/auth/flow.rs
// ============================
//! Login session lifecycle.
//!
//! A client is either anonymous or authenticated. Login (password or social)
//! moves it to authenticated, logout moves it back, refresh keeps it
//! authenticated with rotated tokens. Every transition is returned as a
//! [`SessionTransition`] so the HTTP layer can set or clear both cookies in
//! one place.
use std::sync::Arc;

use elearn_common::{
    Avatar, ChangePasswordRequest, LoginRequest, SocialLoginRequest, UpdateUserRequest,
};
use tracing::instrument;

use crate::auth::password::Hasher;
use crate::auth::rate_limit::AuthRateLimiter;
use crate::auth::session::SessionStore;
use crate::auth::token::{TokenPair, TokenService};
use crate::error::{AppError, TokenKind};
use crate::metrics::{LOGIN_FAILED, LOGIN_SUCCEEDED, SESSION_ENDED, TOKEN_REFRESHED};
use crate::storage::{normalize_email, User, UserStore};
use crate::validation::{validate_email, validate_update_user, validate_username};

/// Outcome of a session state change
#[derive(Debug, Clone)]
pub enum SessionTransition {
    /// Tokens were issued and the cache holds a fresh snapshot
    Established { user: User, tokens: TokenPair },
    /// The session was dropped; both cookies must be cleared
    Ended,
}

/// Identity of an authenticated request: the cached session snapshot
#[derive(Debug, Clone)]
pub struct AuthContext {
    pub user: User,
}

/// Login, logout, refresh and the authenticated account operations
#[derive(Clone)]
pub struct SessionFlow {
    store: Arc<dyn UserStore>,
    sessions: SessionStore,
    tokens: Arc<TokenService>,
    hasher: Arc<Hasher>,
    limiter: AuthRateLimiter,
}

impl SessionFlow {
    pub fn new(
        store: Arc<dyn UserStore>,
        sessions: SessionStore,
        tokens: Arc<TokenService>,
        hasher: Arc<Hasher>,
        limiter: AuthRateLimiter,
    ) -> Self {
        Self {
            store,
            sessions,
            tokens,
            hasher,
            limiter,
        }
    }

    pub fn limiter(&self) -> &AuthRateLimiter {
        &self.limiter
    }

    /// Issue both tokens and write the session snapshot
    async fn establish(&self, user: User) -> Result<SessionTransition, AppError> {
        let tokens = self.tokens.issue_pair(&user.id.to_string())?;
        self.sessions.put(&user).await?;
        Ok(SessionTransition::Established { user, tokens })
    }

    /// Password login. `client` identifies the caller for throttling.
    #[instrument(skip(self, request), fields(email = %request.email))]
    pub async fn login(
        &self,
        request: LoginRequest,
        client: &str,
    ) -> Result<SessionTransition, AppError> {
        if request.email.trim().is_empty() || request.password.is_empty() {
            return Err(AppError::MissingCredentials);
        }

        let email = normalize_email(&request.email);
        if !self.limiter.check_rate_limit(client, &email) {
            return Err(AppError::AuthRateLimited);
        }

        let user = self.store.find_by_email(&email).await?;
        let hash = user.as_ref().and_then(|u| u.password_hash.clone());
        // Unknown and password-less accounts still pay for one verification
        let matches = self.hasher.verify_secure(hash, request.password).await?;

        let user = match user {
            Some(user) if matches => user,
            _ => {
                self.limiter.record_failed_attempt(client, &email);
                metrics::counter!(LOGIN_FAILED).increment(1);
                tracing::info!("login rejected");
                return Err(AppError::InvalidCredentials);
            },
        };

        self.limiter.record_success(client, &email);
        let transition = self.establish(user).await?;
        metrics::counter!(LOGIN_SUCCEEDED).increment(1);
        tracing::info!("login succeeded");
        Ok(transition)
    }

    /// Login with an identity asserted by an external provider.
    /// Creates a password-less account on first use.
    #[instrument(skip(self, request), fields(email = %request.email))]
    pub async fn social_login(
        &self,
        request: SocialLoginRequest,
    ) -> Result<SessionTransition, AppError> {
        validate_email(&request.email)?;
        let email = normalize_email(&request.email);

        let user = match self.store.find_by_email(&email).await? {
            Some(user) => user,
            None => {
                validate_username(&request.username)?;
                let mut user = User::new(request.username.trim(), email);
                user.is_verified = true;
                user.avatar = request.avatar.map(|url| Avatar {
                    public_id: String::new(),
                    url,
                });
                let user = self.store.create(user).await?;
                tracing::info!(user_id = %user.id, "account created from social login");
                user
            },
        };

        let transition = self.establish(user).await?;
        metrics::counter!(LOGIN_SUCCEEDED).increment(1);
        Ok(transition)
    }

    /// Drop the session. Safe to repeat.
    #[instrument(skip_all, fields(user_id = %ctx.user.id))]
    pub async fn logout(&self, ctx: &AuthContext) -> Result<SessionTransition, AppError> {
        self.sessions.remove(ctx.user.id).await?;
        metrics::counter!(SESSION_ENDED).increment(1);
        tracing::info!("logged out");
        Ok(SessionTransition::Ended)
    }

    /// Rotate both tokens using a refresh token
    #[instrument(skip_all)]
    pub async fn refresh(&self, refresh_token: Option<&str>) -> Result<SessionTransition, AppError> {
        let token = refresh_token
            .filter(|t| !t.is_empty())
            .ok_or(AppError::NoToken)?;

        let claims = self
            .tokens
            .verify(token, TokenKind::Refresh)
            .map_err(|_| AppError::InvalidOrExpired(TokenKind::Refresh))?;

        let user = self
            .sessions
            .get_by_key(&claims.id)
            .await?
            .ok_or(AppError::SessionNotFound)?;

        let transition = self.establish(user).await?;
        metrics::counter!(TOKEN_REFRESHED).increment(1);
        tracing::debug!(user_id = %claims.id, "tokens rotated");
        Ok(transition)
    }

    /// Resolve an access token to the live session
    pub async fn authenticate(&self, access_token: Option<&str>) -> Result<AuthContext, AppError> {
        let token = access_token
            .filter(|t| !t.is_empty())
            .ok_or(AppError::NoToken)?;

        let claims = self
            .tokens
            .verify(token, TokenKind::Access)
            .map_err(|_| AppError::InvalidToken)?;

        let user = self
            .sessions
            .get_by_key(&claims.id)
            .await?
            .ok_or(AppError::SessionExpired)?;

        Ok(AuthContext { user })
    }

    /// The cached snapshot of the caller
    pub fn me(&self, ctx: &AuthContext) -> User {
        ctx.user.clone()
    }

    /// Change username and/or email
    #[instrument(skip(self, ctx, request), fields(user_id = %ctx.user.id))]
    pub async fn update_profile(
        &self,
        ctx: &AuthContext,
        request: UpdateUserRequest,
    ) -> Result<User, AppError> {
        validate_update_user(&request)?;

        let mut user = self.current_record(ctx).await?;

        if let Some(email) = request.email {
            let email = normalize_email(&email);
            if email != user.email {
                if self.store.find_by_email(&email).await?.is_some() {
                    return Err(AppError::DuplicateEmail);
                }
                user.email = email;
            }
        }
        if let Some(username) = request.username {
            user.username = username.trim().to_string();
        }
        user.touch();

        let user = self.store.update(user).await?;
        self.sessions.put(&user).await?;
        tracing::info!("profile updated");
        Ok(user)
    }

    /// Replace the password after checking the old one
    #[instrument(skip(self, ctx, request), fields(user_id = %ctx.user.id))]
    pub async fn change_password(
        &self,
        ctx: &AuthContext,
        request: ChangePasswordRequest,
    ) -> Result<User, AppError> {
        if request.old_password.is_empty() || request.new_password.is_empty() {
            return Err(AppError::MissingCredentials);
        }

        let mut user = self.current_record(ctx).await?;

        let matches = self
            .hasher
            .verify_secure(user.password_hash.clone(), request.old_password)
            .await?;
        if !matches {
            return Err(AppError::InvalidOldPassword);
        }

        user.password_hash = Some(self.hasher.hash_secure(request.new_password).await?);
        user.touch();

        let user = self.store.update(user).await?;
        self.sessions.put(&user).await?;
        tracing::info!("password changed");
        Ok(user)
    }

    /// Stored record of the caller; mutations start from it, not the snapshot
    async fn current_record(&self, ctx: &AuthContext) -> Result<User, AppError> {
        self.store
            .find_by_id(ctx.user.id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("user {}", ctx.user.id)))
    }
}
