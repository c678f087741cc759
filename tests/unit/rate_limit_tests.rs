// ==============================
// tests/unit/rate_limit_tests.rs
// ==============================
//! This test suite is designed to validate the functionality of the `AuthRateLimiter`
use elearn_backend_lib::auth::AuthRateLimiter;
use std::time::Duration;

const CLIENT: &str = "192.0.2.1";

#[test]
fn test_rate_limiter_allows_initial_attempts() {
    let rate_limiter = AuthRateLimiter::default();
    assert!(rate_limiter.check_rate_limit(CLIENT, "a@x.com"));
}

#[test]
fn test_rate_limiter_blocks_after_max_attempts() {
    let rate_limiter = AuthRateLimiter::default();

    // Default max is 5
    for _ in 0..5 {
        rate_limiter.record_failed_attempt(CLIENT, "a@x.com");
    }

    assert!(!rate_limiter.check_rate_limit(CLIENT, "a@x.com"));
    // Other accounts and other clients are unaffected
    assert!(rate_limiter.check_rate_limit(CLIENT, "b@x.com"));
    assert!(rate_limiter.check_rate_limit("192.0.2.2", "a@x.com"));
}

#[test]
fn test_rate_limiter_resets_after_success() {
    let rate_limiter = AuthRateLimiter::default();

    for _ in 0..3 {
        rate_limiter.record_failed_attempt(CLIENT, "a@x.com");
    }
    assert!(rate_limiter.check_rate_limit(CLIENT, "a@x.com"));

    rate_limiter.record_success(CLIENT, "a@x.com");

    // Can make 4 more attempts without lockout
    for _ in 0..4 {
        rate_limiter.record_failed_attempt(CLIENT, "a@x.com");
    }
    assert!(rate_limiter.check_rate_limit(CLIENT, "a@x.com"));
}

#[test]
fn test_rate_limiter_cleanup() {
    let rate_limiter = AuthRateLimiter::new(1, Duration::from_millis(10));
    rate_limiter.record_failed_attempt(CLIENT, "a@x.com");
    assert_eq!(rate_limiter.tracked(), 1);

    std::thread::sleep(Duration::from_millis(30));
    rate_limiter.cleanup();
    assert_eq!(rate_limiter.tracked(), 0);
}
