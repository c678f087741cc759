// ============================
// crates/backend-lib/src/validation/mod.rs
// ============================
//! Request validation module.

use crate::error::AppError;
use elearn_common::{SignupRequest, UpdateUserRequest};
use regex::Regex;
use std::sync::LazyLock;
use thiserror::Error;

const MAX_USERNAME_LENGTH: usize = 100;
const MAX_PASSWORD_LENGTH: usize = 128;
const MAX_EMAIL_LENGTH: usize = 254; // RFC 5321 SMTP limit

static EMAIL_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").unwrap());

/// Possible validation errors
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Invalid username: {0}")]
    InvalidUsername(String),

    #[error("Invalid password: {0}")]
    InvalidPassword(String),

    #[error("Invalid email: {0}")]
    InvalidEmail(String),
}

/// Result type for validation operations
pub type ValidationResult<T> = Result<T, ValidationError>;

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        AppError::InvalidInput(err.to_string())
    }
}

/// Validate a display name
pub fn validate_username(username: &str) -> ValidationResult<&str> {
    if username.trim().is_empty() {
        return Err(ValidationError::InvalidUsername(
            "Username must not be empty".to_string(),
        ));
    }

    if username.chars().count() > MAX_USERNAME_LENGTH {
        return Err(ValidationError::InvalidUsername(format!(
            "Username cannot exceed {MAX_USERNAME_LENGTH} characters"
        )));
    }

    Ok(username)
}

/// Validate a password. Strength rules are left to the client.
pub fn validate_password(password: &str) -> ValidationResult<&str> {
    if password.is_empty() {
        return Err(ValidationError::InvalidPassword(
            "Password must not be empty".to_string(),
        ));
    }

    if password.chars().count() > MAX_PASSWORD_LENGTH {
        return Err(ValidationError::InvalidPassword(format!(
            "Password cannot exceed {MAX_PASSWORD_LENGTH} characters"
        )));
    }

    Ok(password)
}

/// Validate an email address
pub fn validate_email(email: &str) -> ValidationResult<&str> {
    let email = email.trim();

    if email.is_empty() {
        return Err(ValidationError::InvalidEmail(
            "Email address cannot be empty".to_string(),
        ));
    }

    if email.len() > MAX_EMAIL_LENGTH {
        return Err(ValidationError::InvalidEmail(format!(
            "Email address cannot exceed {MAX_EMAIL_LENGTH} characters"
        )));
    }

    if !EMAIL_REGEX.is_match(email) {
        return Err(ValidationError::InvalidEmail(
            "Invalid email address format".to_string(),
        ));
    }

    Ok(email)
}

/// Validate a signup form
pub fn validate_signup(request: &SignupRequest) -> ValidationResult<()> {
    validate_username(&request.username)?;
    validate_email(&request.email)?;
    validate_password(&request.password)?;
    Ok(())
}

/// Validate the fields present in a profile update
pub fn validate_update_user(request: &UpdateUserRequest) -> ValidationResult<()> {
    if let Some(username) = &request.username {
        validate_username(username)?;
    }
    if let Some(email) = &request.email {
        validate_email(email)?;
    }
    Ok(())
}
