// ============================
// crates/backend-lib/src/auth/rate_limit.rs
// ============================
//! Rate limiting for login attempts.
//!
//! Failures are counted per client and account pair, so one client hammering
//! an address cannot lock its owner out from elsewhere.

use dashmap::DashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::config::LoginThrottleSettings;
use crate::metrics::LOGIN_LOCKED;
use crate::storage::normalize_email;

/// Entries untouched for this long are dropped by `cleanup`
const STALE_AFTER: Duration = Duration::from_secs(24 * 60 * 60);

/// Entry in the rate limit map
#[derive(Debug, Clone)]
struct RateLimitEntry {
    /// Number of failed attempts
    failed_attempts: u32,
    /// Time of the last failed attempt
    last_failure: Instant,
    /// When the lockout expires, if locked
    lockout_expiry: Option<Instant>,
}

/// Throttle key for a client address and account
fn attempt_key(client: &str, email: &str) -> String {
    format!("{client}|{}", normalize_email(email))
}

/// Rate limiter for login attempts, keyed by client and normalized email
#[derive(Debug, Clone)]
pub struct AuthRateLimiter {
    attempts: Arc<DashMap<String, RateLimitEntry>>,
    /// Maximum number of failed attempts before lockout
    max_attempts: u32,
    /// Duration of lockout period
    lockout_duration: Duration,
}

impl Default for AuthRateLimiter {
    fn default() -> Self {
        Self::from_settings(&LoginThrottleSettings::default())
    }
}

impl AuthRateLimiter {
    pub fn new(max_attempts: u32, lockout_duration: Duration) -> Self {
        Self {
            attempts: Arc::new(DashMap::new()),
            max_attempts,
            lockout_duration,
        }
    }

    pub fn from_settings(settings: &LoginThrottleSettings) -> Self {
        Self::new(
            settings.max_attempts,
            Duration::from_secs(settings.lockout_secs),
        )
    }

    /// Record a failed login
    pub fn record_failed_attempt(&self, client: &str, email: &str) {
        let now = Instant::now();
        let key = attempt_key(client, email);

        let mut entry = self.attempts.entry(key).or_insert_with(|| RateLimitEntry {
            failed_attempts: 0,
            last_failure: now,
            lockout_expiry: None,
        });

        // An expired lockout starts a fresh window
        if entry.lockout_expiry.is_some_and(|expiry| now >= expiry) {
            entry.failed_attempts = 0;
            entry.lockout_expiry = None;
        }

        entry.failed_attempts += 1;
        entry.last_failure = now;

        if entry.failed_attempts >= self.max_attempts && entry.lockout_expiry.is_none() {
            entry.lockout_expiry = Some(now + self.lockout_duration);
            metrics::counter!(LOGIN_LOCKED).increment(1);
            tracing::warn!(
                key = %entry.key(),
                lockout_secs = self.lockout_duration.as_secs(),
                "login locked out after repeated failures"
            );
        }
    }

    /// Record a successful login
    pub fn record_success(&self, client: &str, email: &str) {
        self.attempts.remove(&attempt_key(client, email));
    }

    /// Check if a client may attempt to log in to an account
    pub fn check_rate_limit(&self, client: &str, email: &str) -> bool {
        match self.attempts.get(&attempt_key(client, email)) {
            Some(entry) => entry
                .lockout_expiry
                .map_or(true, |expiry| Instant::now() >= expiry),
            None => true,
        }
    }

    /// Remove expired lockouts and stale counters
    pub fn cleanup(&self) {
        let now = Instant::now();

        self.attempts.retain(|_, entry| match entry.lockout_expiry {
            Some(expiry) => now < expiry,
            None => now.duration_since(entry.last_failure) < STALE_AFTER,
        });
    }

    /// Number of tracked client and account pairs
    pub fn tracked(&self) -> usize {
        self.attempts.len()
    }
}
