// crates/backend-lib/src/middleware/mod.rs

//! Request extractors and middleware for the auth API.

pub mod authenticate;
pub mod client_addr;
pub mod json;

pub use authenticate::read_access_token;
pub use client_addr::ClientAddr;
pub use json::AppJson;
