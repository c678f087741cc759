// ============================
// crates/backend-lib/src/middleware/authenticate.rs
// ============================
//! The authentication gate.
//!
//! Handlers that take an [`AuthContext`] argument only run for requests with
//! a valid access cookie and a live session; everything else is rejected
//! with the matching [`AppError`].
use std::sync::Arc;

use axum::{extract::FromRequestParts, http::request::Parts, http::HeaderMap};

use crate::auth::AuthContext;
use crate::cookies::{read_cookie, ACCESS_COOKIE};
use crate::error::AppError;
use crate::AppState;

/// Access token carried by the request, if any
pub fn read_access_token(headers: &HeaderMap) -> Option<String> {
    read_cookie(headers, ACCESS_COOKIE)
}

impl FromRequestParts<Arc<AppState>> for AuthContext {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let token = read_access_token(&parts.headers);
        let ctx = state.sessions.authenticate(token.as_deref()).await?;
        tracing::debug!(user_id = %ctx.user.id, "request authenticated");
        Ok(ctx)
    }
}
