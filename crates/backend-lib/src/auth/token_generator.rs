// ============================
// crates/backend-lib/src/auth/token_generator.rs
// ============================
//! Random material for tokens.
//!
//! Provides the random identifiers embedded in signed tokens and the short
//! numeric activation codes sent by mail.
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use rand::{Rng, RngCore};

/// Default token size in bytes (16 bytes = 128 bits of entropy)
const DEFAULT_TOKEN_BYTES: usize = 16;

/// Smallest and largest 4-digit activation code
const ACTIVATION_CODE_RANGE: std::ops::RangeInclusive<u32> = 1000..=9999;

/** Generate a random token identifier
# Returns
A base64 URL-safe encoded string without padding */
pub fn generate_secure_token() -> String {
    generate_secure_token_with_size(DEFAULT_TOKEN_BYTES)
}

/** Generate a random token identifier with specified size
# Arguments
* `bytes` - The size of the random token in bytes */
pub fn generate_secure_token_with_size(bytes: usize) -> String {
    let mut buffer = vec![0u8; bytes];
    rand::rng().fill_bytes(&mut buffer);
    URL_SAFE_NO_PAD.encode(buffer)
}

/// Generate a 4-digit activation code
pub fn generate_activation_code() -> String {
    rand::rng().random_range(ACTIVATION_CODE_RANGE).to_string()
}
