// ============================
// crates/backend-lib/src/router.rs
// ============================
//! HTTP router.
use std::sync::Arc;

use axum::{
    http::{header, HeaderValue, Method},
    routing::{get, post, put},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::handlers::user;
use crate::AppState;

/// Prefix of every API route
pub const API_PREFIX: &str = "/api/v1";

/// Create the API router
pub fn create_router(state: Arc<AppState>) -> Router {
    let api = Router::new()
        .route("/signup", post(user::signup))
        .route("/activate-user", post(user::activate_user))
        .route("/login", post(user::login))
        .route("/logout", get(user::logout))
        .route("/refresh-token", get(user::refresh_token))
        .route("/me", get(user::me))
        .route("/social-login", post(user::social_login))
        .route("/update-user", put(user::update_user))
        .route("/change-password", put(user::change_password));

    let mut app = Router::new()
        .nest(API_PREFIX, api)
        .layer(TraceLayer::new_for_http());

    if let Some(cors) = cors_layer(state.settings.cors_origin.as_deref()) {
        app = app.layer(cors);
    }

    app.with_state(state)
}

/// Credentialed CORS for the configured frontend origin
fn cors_layer(origin: Option<&str>) -> Option<CorsLayer> {
    let origin = origin?;
    match HeaderValue::from_str(origin) {
        Ok(origin) => Some(
            CorsLayer::new()
                .allow_origin(origin)
                .allow_credentials(true)
                .allow_methods([Method::GET, Method::POST, Method::PUT])
                .allow_headers([header::CONTENT_TYPE]),
        ),
        Err(e) => {
            tracing::warn!(origin, error = %e, "ignoring invalid CORS origin");
            None
        },
    }
}
