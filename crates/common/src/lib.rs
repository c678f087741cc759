// ================
// crates/common/src/lib.rs
// ================
//! Common types and structures
//! used for communication between the e-learning clients and the auth server.
//! This module defines the JSON bodies of the `/api/v1` user endpoints.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifier of a user record
pub type UserId = Uuid;

/// Role of a user account
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    User,
    Admin,
}

/// Avatar stored with the object storage collaborator
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
pub struct Avatar {
    pub public_id: String,
    pub url: String,
}

/// Reference to a course owned by a user
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CourseRef {
    pub course_id: String,
}

/// User as exposed by the API. Never carries the password hash.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PublicUser {
    pub id: UserId,
    pub username: String,
    pub email: String,
    pub avatar: Option<Avatar>,
    pub role: Role,
    pub is_verified: bool,
    pub courses: Vec<CourseRef>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// `POST /signup`
/// # Fields
/// * `username` - Display name of the pending account
/// * `email` - Address the activation code is sent to
/// * `password` - Plaintext password, hashed only once the account is activated
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct SignupRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// `POST /activate-user`
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct ActivationRequest {
    #[serde(default)]
    pub activation_token: String,
    #[serde(default)]
    pub activation_code: String,
}

/// `POST /login`
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// `POST /social-login`
///
/// The identity assertion is verified upstream; this body is trusted as-is.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct SocialLoginRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub avatar: Option<String>,
}

/// `PUT /update-user`
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct UpdateUserRequest {
    pub username: Option<String>,
    pub email: Option<String>,
}

/// `PUT /change-password`
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    #[serde(default)]
    pub old_password: String,
    #[serde(default)]
    pub new_password: String,
}

/// Response to a signup request
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct SignupResponse {
    pub success: bool,
    pub message: String,
    pub activation_token: String,
}

/// Plain acknowledgement, optionally with a message
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Ack {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Response carrying a user and a fresh access token (login, social login)
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub success: bool,
    pub user: PublicUser,
    pub access_token: String,
}

/// Response to a refresh request
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct RefreshResponse {
    pub status: String,
    pub access_token: String,
}

/// Response carrying the current user (me, update-user, change-password)
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct UserResponse {
    pub success: bool,
    pub user: PublicUser,
}

/// Error body returned by every failing endpoint
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
}
