// ============================
// crates/backend-lib/src/auth/token.rs
// ============================
//! Signed, self-contained tokens.
//!
//! Three kinds share one format (HS256 JWT) but never a secret:
//! - activation: pending signup snapshot plus the one-time code
//! - access: user id, short lived
//! - refresh: user id, long lived
use std::time::Duration;

use chrono::{DateTime, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use thiserror::Error;

use crate::auth::token_generator::{generate_activation_code, generate_secure_token};
use crate::config::TokenSettings;
use crate::error::{AppError, TokenKind};

/// Verification failures
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenError {
    /// Malformed, wrong secret or tampered
    #[error("invalid token signature")]
    InvalidSignature,

    #[error("token expired")]
    Expired,
}

/// Signup data carried by an activation token until the account exists
#[derive(Clone, Serialize, Deserialize)]
pub struct PendingUser {
    pub username: String,
    pub email: String,
    pub password: String,
}

impl std::fmt::Debug for PendingUser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PendingUser")
            .field("username", &self.username)
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Claims of an activation token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivationClaims {
    pub user: PendingUser,
    pub activation_code: String,
    /// Ticket id, claimed once on confirmation
    pub jti: String,
    pub iat: i64,
    pub exp: i64,
}

/// Claims of access and refresh tokens
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    /// User id
    pub id: String,
    /// Makes every issued token unique
    pub jti: String,
    pub iat: i64,
    pub exp: i64,
}

/// Activation token plus the code to deliver out-of-band
#[derive(Debug, Clone)]
pub struct ActivationTicket {
    pub token: String,
    pub code: String,
}

/// Freshly issued access and refresh tokens
#[derive(Debug, Clone)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

struct SigningKey {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl SigningKey {
    fn new(secret: &str, ttl: Duration) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl,
        }
    }

    fn expiry(&self, issued_at: DateTime<Utc>) -> i64 {
        issued_at.timestamp() + self.ttl.as_secs() as i64
    }
}

/// Issues and verifies the three token kinds
pub struct TokenService {
    activation: SigningKey,
    access: SigningKey,
    refresh: SigningKey,
    validation: Validation,
}

impl TokenService {
    pub fn new(settings: &TokenSettings) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // Lifetimes are short; no clock skew allowance
        validation.leeway = 0;

        Self {
            activation: SigningKey::new(&settings.activation_secret, settings.activation_ttl()),
            access: SigningKey::new(&settings.access_secret, settings.access_ttl()),
            refresh: SigningKey::new(&settings.refresh_secret, settings.refresh_ttl()),
            validation,
        }
    }

    fn key(&self, kind: TokenKind) -> &SigningKey {
        match kind {
            TokenKind::Activation => &self.activation,
            TokenKind::Access => &self.access,
            TokenKind::Refresh => &self.refresh,
        }
    }

    /// Lifetime of a token kind
    pub fn ttl(&self, kind: TokenKind) -> Duration {
        self.key(kind).ttl
    }

    fn sign<T: Serialize>(&self, kind: TokenKind, claims: &T) -> Result<String, AppError> {
        encode(&Header::new(Algorithm::HS256), claims, &self.key(kind).encoding)
            .map_err(|e| AppError::Internal(format!("failed to sign {kind} token: {e}")))
    }

    fn decode<T: DeserializeOwned>(&self, token: &str, kind: TokenKind) -> Result<T, TokenError> {
        decode::<T>(token, &self.key(kind).decoding, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| {
                tracing::debug!(%kind, error = %e, "token verification failed");
                match e.kind() {
                    ErrorKind::ExpiredSignature => TokenError::Expired,
                    _ => TokenError::InvalidSignature,
                }
            })
    }

    /// Mint an activation token and its code
    pub fn issue_activation_token(&self, pending: PendingUser) -> Result<ActivationTicket, AppError> {
        self.issue_activation_token_at(pending, Utc::now())
    }

    pub fn issue_activation_token_at(
        &self,
        pending: PendingUser,
        issued_at: DateTime<Utc>,
    ) -> Result<ActivationTicket, AppError> {
        let code = generate_activation_code();
        let claims = ActivationClaims {
            user: pending,
            activation_code: code.clone(),
            jti: generate_secure_token(),
            iat: issued_at.timestamp(),
            exp: self.activation.expiry(issued_at),
        };
        let token = self.sign(TokenKind::Activation, &claims)?;
        Ok(ActivationTicket { token, code })
    }

    pub fn verify_activation_token(&self, token: &str) -> Result<ActivationClaims, TokenError> {
        self.decode(token, TokenKind::Activation)
    }

    pub fn issue_access_token(&self, user_id: &str) -> Result<String, AppError> {
        self.issue_session_token(TokenKind::Access, user_id, Utc::now())
    }

    pub fn issue_refresh_token(&self, user_id: &str) -> Result<String, AppError> {
        self.issue_session_token(TokenKind::Refresh, user_id, Utc::now())
    }

    /// Access and refresh token issued together
    pub fn issue_pair(&self, user_id: &str) -> Result<TokenPair, AppError> {
        let now = Utc::now();
        Ok(TokenPair {
            access_token: self.issue_session_token(TokenKind::Access, user_id, now)?,
            refresh_token: self.issue_session_token(TokenKind::Refresh, user_id, now)?,
        })
    }

    /// Issue an access or refresh token as of `issued_at`
    pub fn issue_session_token(
        &self,
        kind: TokenKind,
        user_id: &str,
        issued_at: DateTime<Utc>,
    ) -> Result<String, AppError> {
        debug_assert!(kind != TokenKind::Activation);
        let claims = SessionClaims {
            id: user_id.to_string(),
            jti: generate_secure_token(),
            iat: issued_at.timestamp(),
            exp: self.key(kind).expiry(issued_at),
        };
        self.sign(kind, &claims)
    }

    /// Verify an access or refresh token with the secret of `kind`
    pub fn verify(&self, token: &str, kind: TokenKind) -> Result<SessionClaims, TokenError> {
        self.decode(token, kind)
    }
}
