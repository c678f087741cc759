// ==============
// crates/backend-lib/src/metrics.rs

//! Central place for metric keys
pub const SIGNUP_REQUESTED: &str = "auth.signup.requested";
pub const USER_ACTIVATED: &str = "auth.user.activated";
pub const LOGIN_SUCCEEDED: &str = "auth.login.succeeded";
pub const LOGIN_FAILED: &str = "auth.login.failed";
pub const LOGIN_LOCKED: &str = "auth.login.locked";
pub const TOKEN_REFRESHED: &str = "auth.token.refreshed";
pub const SESSION_ENDED: &str = "auth.session.ended";
