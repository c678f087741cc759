// ============================
// crates/backend-lib/src/handlers/user.rs
// ============================
//! Account and session endpoints.
//!
//! Handlers only translate between HTTP and the auth flows: they parse the
//! body, call one flow operation and turn the result into a response with
//! the right status and cookies.
use std::sync::Arc;

use axum::{extract::State, http::HeaderMap, http::StatusCode, response::IntoResponse, Json};
use elearn_common::{
    Ack, ActivationRequest, ChangePasswordRequest, LoginRequest, LoginResponse, PublicUser,
    RefreshResponse, SignupRequest, SignupResponse, SocialLoginRequest, UpdateUserRequest,
    UserResponse,
};

use crate::auth::{AuthContext, SessionTransition};
use crate::cookies::{read_cookie, transition_cookies, REFRESH_COOKIE};
use crate::error::AppError;
use crate::middleware::{AppJson, ClientAddr};
use crate::AppState;

/// Split an established transition into its cookies and the public user
fn established(
    state: &AppState,
    transition: SessionTransition,
) -> Result<(HeaderMap, PublicUser, String), AppError> {
    let headers = transition_cookies(&transition, &state.cookies)?;
    match transition {
        SessionTransition::Established { user, tokens } => {
            Ok((headers, PublicUser::from(&user), tokens.access_token))
        },
        SessionTransition::Ended => Err(AppError::Internal(
            "expected an established session".to_string(),
        )),
    }
}

/// `POST /signup`
pub async fn signup(
    State(state): State<Arc<AppState>>,
    AppJson(request): AppJson<SignupRequest>,
) -> Result<impl IntoResponse, AppError> {
    let outcome = state.activation.signup(request).await?;

    Ok((
        StatusCode::CREATED,
        Json(SignupResponse {
            success: true,
            message: format!(
                "Please check your email: {} to activate your account",
                outcome.email
            ),
            activation_token: outcome.activation_token,
        }),
    ))
}

/// `POST /activate-user`
pub async fn activate_user(
    State(state): State<Arc<AppState>>,
    AppJson(request): AppJson<ActivationRequest>,
) -> Result<impl IntoResponse, AppError> {
    state.activation.activate(request).await?;

    Ok((
        StatusCode::CREATED,
        Json(Ack {
            success: true,
            message: None,
        }),
    ))
}

/// `POST /login`
pub async fn login(
    State(state): State<Arc<AppState>>,
    client: ClientAddr,
    AppJson(request): AppJson<LoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    let transition = state.sessions.login(request, client.as_str()).await?;
    let (headers, user, access_token) = established(&state, transition)?;

    Ok((
        StatusCode::OK,
        headers,
        Json(LoginResponse {
            success: true,
            user,
            access_token,
        }),
    ))
}

/// `POST /social-login`
pub async fn social_login(
    State(state): State<Arc<AppState>>,
    AppJson(request): AppJson<SocialLoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    let transition = state.sessions.social_login(request).await?;
    let (headers, user, access_token) = established(&state, transition)?;

    Ok((
        StatusCode::OK,
        headers,
        Json(LoginResponse {
            success: true,
            user,
            access_token,
        }),
    ))
}

/// `GET /logout`
pub async fn logout(
    State(state): State<Arc<AppState>>,
    ctx: AuthContext,
) -> Result<impl IntoResponse, AppError> {
    let transition = state.sessions.logout(&ctx).await?;
    let headers = transition_cookies(&transition, &state.cookies)?;

    Ok((
        StatusCode::OK,
        headers,
        Json(Ack {
            success: true,
            message: Some("Logged out successfully".to_string()),
        }),
    ))
}

/// `GET /refresh-token`
pub async fn refresh_token(
    State(state): State<Arc<AppState>>,
    request_headers: HeaderMap,
) -> Result<impl IntoResponse, AppError> {
    let token = read_cookie(&request_headers, REFRESH_COOKIE);
    let transition = state.sessions.refresh(token.as_deref()).await?;
    let (headers, _, access_token) = established(&state, transition)?;

    Ok((
        StatusCode::OK,
        headers,
        Json(RefreshResponse {
            status: "success".to_string(),
            access_token,
        }),
    ))
}

/// `GET /me`
pub async fn me(
    State(state): State<Arc<AppState>>,
    ctx: AuthContext,
) -> Result<impl IntoResponse, AppError> {
    let user = state.sessions.me(&ctx);

    Ok((
        StatusCode::OK,
        Json(UserResponse {
            success: true,
            user: PublicUser::from(&user),
        }),
    ))
}

/// `PUT /update-user`
pub async fn update_user(
    State(state): State<Arc<AppState>>,
    ctx: AuthContext,
    AppJson(request): AppJson<UpdateUserRequest>,
) -> Result<impl IntoResponse, AppError> {
    let user = state.sessions.update_profile(&ctx, request).await?;

    Ok((
        StatusCode::CREATED,
        Json(UserResponse {
            success: true,
            user: PublicUser::from(&user),
        }),
    ))
}

/// `PUT /change-password`
pub async fn change_password(
    State(state): State<Arc<AppState>>,
    ctx: AuthContext,
    AppJson(request): AppJson<ChangePasswordRequest>,
) -> Result<impl IntoResponse, AppError> {
    let user = state.sessions.change_password(&ctx, request).await?;

    Ok((
        StatusCode::CREATED,
        Json(UserResponse {
            success: true,
            user: PublicUser::from(&user),
        }),
    ))
}
