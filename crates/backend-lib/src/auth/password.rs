// ============================
// crates/backend-lib/src/auth/password.rs
// ============================
//! Password hashing and verification.
use std::sync::Arc;

use scrypt::{
    password_hash::{
        rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString,
    },
    Params, Scrypt,
};
use zeroize::Zeroize;

use crate::error::AppError;

/// scrypt block size
const SCRYPT_R: u32 = 8;
/// scrypt parallelism
const SCRYPT_P: u32 = 1;

/// Hash a password using scrypt with the given parameters
pub fn hash_password(plain: &str, params: Params) -> anyhow::Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Scrypt
        .hash_password_customized(plain.as_bytes(), None, None, params, &salt)?
        .to_string();
    Ok(hash)
}

/// Verify a password against a hash. Parameters are read from the hash.
pub fn verify_password(hash: &str, plain: &str) -> bool {
    let parsed_hash = match PasswordHash::new(hash) {
        Ok(h) => h,
        Err(_) => return false,
    };
    Scrypt.verify_password(plain.as_bytes(), &parsed_hash).is_ok()
}

/// Password hasher bound to one cost setting.
///
/// Keeps a hash of a random password so that checks against a missing
/// account cost the same as checks against a real one.
pub struct Hasher {
    params: Params,
    dummy_hash: String,
}

impl Hasher {
    pub fn new(log_n: u8) -> anyhow::Result<Self> {
        let params = Params::new(log_n, SCRYPT_R, SCRYPT_P, Params::RECOMMENDED_LEN)
            .map_err(|e| anyhow::anyhow!("invalid scrypt parameters: {e}"))?;
        let dummy_hash = hash_password(&crate::auth::token_generator::generate_secure_token(), params)?;
        Ok(Self { params, dummy_hash })
    }

    pub fn hash(&self, plain: &str) -> anyhow::Result<String> {
        hash_password(plain, self.params)
    }

    /// Verify `plain` against `hash`; a missing hash always fails after doing the same work
    pub fn verify(&self, hash: Option<&str>, plain: &str) -> bool {
        match hash {
            Some(hash) => verify_password(hash, plain),
            None => {
                let _ = verify_password(&self.dummy_hash, plain);
                false
            },
        }
    }

    /// Hash off the async runtime, consuming and wiping the plaintext
    pub async fn hash_secure(self: &Arc<Self>, mut plain: String) -> Result<String, AppError> {
        let hasher = Arc::clone(self);
        tokio::task::spawn_blocking(move || {
            let hash = hasher.hash(&plain);
            plain.zeroize();
            hash
        })
        .await
        .map_err(|e| AppError::Internal(format!("hashing task failed: {e}")))?
        .map_err(|e| AppError::Internal(format!("password hashing failed: {e}")))
    }

    /// Verify off the async runtime, consuming and wiping the plaintext
    pub async fn verify_secure(
        self: &Arc<Self>,
        hash: Option<String>,
        mut plain: String,
    ) -> Result<bool, AppError> {
        let hasher = Arc::clone(self);
        tokio::task::spawn_blocking(move || {
            let matches = hasher.verify(hash.as_deref(), &plain);
            plain.zeroize();
            matches
        })
        .await
        .map_err(|e| AppError::Internal(format!("verification task failed: {e}")))
    }
}
