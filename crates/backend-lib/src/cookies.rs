// ============================
// crates/backend-lib/src/cookies.rs
// ============================
//! Auth cookie headers.
//!
//! Both tokens travel as `HttpOnly` cookies. They are always set and cleared
//! together.
use std::time::Duration;

use axum::http::{
    header::{COOKIE, SET_COOKIE},
    HeaderMap, HeaderValue,
};

use crate::auth::SessionTransition;
use crate::error::AppError;

pub const ACCESS_COOKIE: &str = "access_token";
pub const REFRESH_COOKIE: &str = "refresh_token";

/// Cookie attributes shared by both auth cookies
#[derive(Debug, Clone, Copy)]
pub struct CookiePolicy {
    pub secure: bool,
    pub access_ttl: Duration,
    pub refresh_ttl: Duration,
}

fn build(name: &str, value: &str, max_age: u64, secure: bool) -> Result<HeaderValue, AppError> {
    let mut cookie = format!("{name}={value}; Path=/; HttpOnly; SameSite=Lax; Max-Age={max_age}");
    if secure {
        cookie.push_str("; Secure");
    }
    HeaderValue::from_str(&cookie)
        .map_err(|e| AppError::Internal(format!("invalid {name} cookie: {e}")))
}

/// `Set-Cookie` value carrying a token
pub fn auth_cookie(
    name: &str,
    token: &str,
    ttl: Duration,
    secure: bool,
) -> Result<HeaderValue, AppError> {
    build(name, token, ttl.as_secs(), secure)
}

/// `Set-Cookie` value that makes the browser drop the cookie
pub fn clear_cookie(name: &str, secure: bool) -> Result<HeaderValue, AppError> {
    build(name, "", 0, secure)
}

/// Read a cookie from the request headers
pub fn read_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| key.trim() == name)
        .map(|(_, value)| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// `Set-Cookie` headers for a session transition
pub fn transition_cookies(
    transition: &SessionTransition,
    policy: &CookiePolicy,
) -> Result<HeaderMap, AppError> {
    let mut headers = HeaderMap::new();
    match transition {
        SessionTransition::Established { tokens, .. } => {
            headers.append(
                SET_COOKIE,
                auth_cookie(ACCESS_COOKIE, &tokens.access_token, policy.access_ttl, policy.secure)?,
            );
            headers.append(
                SET_COOKIE,
                auth_cookie(
                    REFRESH_COOKIE,
                    &tokens.refresh_token,
                    policy.refresh_ttl,
                    policy.secure,
                )?,
            );
        },
        SessionTransition::Ended => {
            headers.append(SET_COOKIE, clear_cookie(ACCESS_COOKIE, policy.secure)?);
            headers.append(SET_COOKIE, clear_cookie(REFRESH_COOKIE, policy.secure)?);
        },
    }
    Ok(headers)
}
