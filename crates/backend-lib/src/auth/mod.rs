// ============================
// crates/backend-lib/src/auth/mod.rs
// ============================
//! Authentication module.

pub mod activation;
pub mod flow;
pub mod password;
pub mod rate_limit;
pub mod session;
pub mod token;
pub mod token_generator;

pub use activation::{ActivationFlow, SignupOutcome};
pub use flow::{AuthContext, SessionFlow, SessionTransition};
pub use password::{hash_password, verify_password, Hasher};
pub use rate_limit::AuthRateLimiter;
pub use session::SessionStore;
pub use token::{TokenError, TokenPair, TokenService};
