// ============================
// crates/backend-lib/src/middleware/client_addr.rs
// ============================
//! Caller address used to scope login throttling.
use std::{convert::Infallible, net::SocketAddr, sync::Arc};

use axum::{
    extract::{ConnectInfo, FromRequestParts},
    http::request::Parts,
};

use crate::AppState;

/// Header set by the fronting proxy
pub const REAL_IP_HEADER: &str = "x-real-ip";

/// Address of the calling client, or `unknown` when the server runs
/// without connection info
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientAddr(pub String);

impl ClientAddr {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromRequestParts<Arc<AppState>> for ClientAddr {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        if state.settings.login_throttle.trust_proxy_header {
            let forwarded = parts
                .headers
                .get(REAL_IP_HEADER)
                .and_then(|h| h.to_str().ok())
                .map(str::trim)
                .filter(|ip| !ip.is_empty());
            if let Some(ip) = forwarded {
                return Ok(Self(ip.to_string()));
            }
        }

        let addr = parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| addr.ip().to_string())
            .unwrap_or_else(|| "unknown".to_string());
        Ok(Self(addr))
    }
}
