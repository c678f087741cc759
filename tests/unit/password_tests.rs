// ============================
// tests/unit/password_tests.rs
// ============================
//! Unit tests for password hashing
use elearn_backend_lib::auth::{hash_password, verify_password, Hasher};
use scrypt::Params;

#[test]
fn test_password_hashing_and_verification() {
    let params = Params::new(4, 8, 1, Params::RECOMMENDED_LEN).unwrap();
    let password = "SecureP@ssw0rd";
    let hash = hash_password(password, params).unwrap();

    assert_ne!(password, hash);
    assert!(verify_password(&hash, password));
    assert!(!verify_password(&hash, "WrongPassword"));
}

#[test]
fn test_hasher_treats_missing_hash_as_mismatch() {
    let hasher = Hasher::new(4).unwrap();
    assert!(!hasher.verify(None, "p1"));

    let hash = hasher.hash("p1").unwrap();
    assert!(hasher.verify(Some(&hash), "p1"));
}
