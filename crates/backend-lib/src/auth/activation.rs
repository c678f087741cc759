// ============================
// crates/backend-lib/src/auth/activation.rs
// ============================
//! Two-step signup: request an activation code, then confirm it.
//!
//! Nothing is persisted until confirmation. Between the two steps the pending
//! account lives only inside the signed activation token.
use std::sync::Arc;

use elearn_common::{ActivationRequest, SignupRequest};
use subtle::ConstantTimeEq;
use tracing::instrument;

use crate::auth::password::Hasher;
use crate::auth::session::SessionStore;
use crate::auth::token::{PendingUser, TokenService};
use crate::error::{AppError, TokenKind};
use crate::mail::{activation_message, Mailer};
use crate::metrics::{SIGNUP_REQUESTED, USER_ACTIVATED};
use crate::storage::{normalize_email, User, UserStore};
use crate::validation::validate_signup;

/// Result of a signup request
#[derive(Debug, Clone)]
pub struct SignupOutcome {
    /// Token the client resubmits together with the mailed code
    pub activation_token: String,
    /// Normalized address the code was sent to
    pub email: String,
}

/// Signup and activation service
#[derive(Clone)]
pub struct ActivationFlow {
    store: Arc<dyn UserStore>,
    sessions: SessionStore,
    tokens: Arc<TokenService>,
    mailer: Arc<dyn Mailer>,
    hasher: Arc<Hasher>,
}

impl ActivationFlow {
    pub fn new(
        store: Arc<dyn UserStore>,
        sessions: SessionStore,
        tokens: Arc<TokenService>,
        mailer: Arc<dyn Mailer>,
        hasher: Arc<Hasher>,
    ) -> Self {
        Self {
            store,
            sessions,
            tokens,
            mailer,
            hasher,
        }
    }

    /// Start a signup: mint an activation ticket and mail its code
    #[instrument(skip(self, request), fields(email = %request.email))]
    pub async fn signup(&self, request: SignupRequest) -> Result<SignupOutcome, AppError> {
        validate_signup(&request)?;
        let email = normalize_email(&request.email);

        if self.store.find_by_email(&email).await?.is_some() {
            return Err(AppError::DuplicateEmail);
        }

        let pending = PendingUser {
            username: request.username.trim().to_string(),
            email: email.clone(),
            password: request.password,
        };
        let username = pending.username.clone();
        let ticket = self.tokens.issue_activation_token(pending)?;

        self.mailer
            .send(activation_message(
                &username,
                &email,
                &ticket.code,
                self.tokens.ttl(TokenKind::Activation),
            ))
            .await?;

        metrics::counter!(SIGNUP_REQUESTED).increment(1);
        tracing::info!("activation code sent");

        Ok(SignupOutcome {
            activation_token: ticket.token,
            email,
        })
    }

    /// Confirm a signup and create the account
    #[instrument(skip_all)]
    pub async fn activate(&self, request: ActivationRequest) -> Result<User, AppError> {
        let claims = self
            .tokens
            .verify_activation_token(&request.activation_token)
            .map_err(|_| AppError::InvalidOrExpired(TokenKind::Activation))?;

        let code_matches: bool = claims
            .activation_code
            .as_bytes()
            .ct_eq(request.activation_code.trim().as_bytes())
            .into();
        if !code_matches {
            tracing::debug!(email = %claims.user.email, "activation code mismatch");
            return Err(AppError::CodeMismatch);
        }

        let pending = claims.user;
        if self.store.find_by_email(&pending.email).await?.is_some() {
            return Err(AppError::DuplicateEmail);
        }

        let ticket_ttl = self.tokens.ttl(TokenKind::Activation);
        if !self.sessions.claim_activation(&claims.jti, ticket_ttl).await? {
            tracing::warn!(email = %pending.email, "activation ticket replayed");
            return Err(AppError::InvalidOrExpired(TokenKind::Activation));
        }

        let user = match self.create_account(pending).await {
            Ok(user) => user,
            Err(err) => {
                // A lost race on the email keeps the ticket spent
                if !matches!(err, AppError::DuplicateEmail) {
                    let released = self.sessions.release_activation(&claims.jti).await;
                    if let Err(release_err) = released {
                        tracing::error!(error = %release_err, "failed to release activation ticket");
                    }
                }
                return Err(err);
            },
        };

        metrics::counter!(USER_ACTIVATED).increment(1);
        tracing::info!(user_id = %user.id, email = %user.email, "account activated");
        Ok(user)
    }

    async fn create_account(&self, pending: PendingUser) -> Result<User, AppError> {
        let mut user = User::new(pending.username, pending.email);
        user.password_hash = Some(self.hasher.hash_secure(pending.password).await?);
        user.is_verified = true;
        self.store.create(user).await
    }
}
