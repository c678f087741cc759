// crates/backend-lib/src/error.rs

//! Central error type + Axum integration.
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

/// Kind of signed token an error refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Activation,
    Access,
    Refresh,
}

impl std::fmt::Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            TokenKind::Activation => "activation",
            TokenKind::Access => "access",
            TokenKind::Refresh => "refresh",
        };
        f.write_str(name)
    }
}

/// Application error types with error codes and context
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Please enter email and password")]
    MissingCredentials,

    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Invalid old password")]
    InvalidOldPassword,

    #[error("Authentication rate limit exceeded")]
    AuthRateLimited,

    #[error("Email already exist")]
    DuplicateEmail,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid or expired {0} token")]
    InvalidOrExpired(TokenKind),

    #[error("Invalid activation code")]
    CodeMismatch,

    #[error("Please login to access this resource")]
    NoToken,

    #[error("Access token is not valid")]
    InvalidToken,

    #[error("Session expired, please login again")]
    SessionExpired,

    #[error("Could not refresh token: no active session")]
    SessionNotFound,

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl AppError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::InvalidInput(_)
            | AppError::MissingCredentials
            | AppError::InvalidOldPassword
            | AppError::CodeMismatch
            | AppError::InvalidOrExpired(TokenKind::Activation) => StatusCode::BAD_REQUEST,
            AppError::InvalidCredentials
            | AppError::InvalidOrExpired(_)
            | AppError::NoToken
            | AppError::InvalidToken
            | AppError::SessionExpired => StatusCode::UNAUTHORIZED,
            AppError::SessionNotFound => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::DuplicateEmail => StatusCode::CONFLICT,
            AppError::AuthRateLimited => StatusCode::TOO_MANY_REQUESTS,
            AppError::Internal(_) | AppError::Io(_) | AppError::Json(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            },
        }
    }

    /// Get the error code for this error
    pub fn error_code(&self) -> &'static str {
        match self {
            AppError::InvalidInput(_) => "VAL_001",
            AppError::MissingCredentials => "AUTH_001",
            AppError::InvalidCredentials => "AUTH_002",
            AppError::InvalidOldPassword => "AUTH_003",
            AppError::AuthRateLimited => "AUTH_004",
            AppError::DuplicateEmail => "USER_001",
            AppError::NotFound(_) => "NF_001",
            AppError::InvalidOrExpired(_) => "TOKEN_001",
            AppError::CodeMismatch => "TOKEN_002",
            AppError::NoToken => "TOKEN_003",
            AppError::InvalidToken => "TOKEN_004",
            AppError::SessionExpired => "SESSION_001",
            AppError::SessionNotFound => "SESSION_002",
            AppError::Internal(_) => "INT_001",
            AppError::Io(_) => "IO_001",
            AppError::Json(_) => "JSON_001",
        }
    }

    /// Whether the error comes from our own infrastructure rather than the caller
    pub fn is_internal(&self) -> bool {
        matches!(self, AppError::Internal(_) | AppError::Io(_) | AppError::Json(_))
    }

    /// Get a sanitized message suitable for production use
    pub fn sanitized_message(&self) -> String {
        match self {
            AppError::InvalidInput(_) => "Invalid input provided".to_string(),
            AppError::MissingCredentials => "Please enter email and password".to_string(),
            AppError::InvalidCredentials => "Invalid email or password".to_string(),
            AppError::InvalidOldPassword => "Invalid old password".to_string(),
            AppError::AuthRateLimited => {
                "Too many authentication attempts, please try again later".to_string()
            },
            AppError::DuplicateEmail => "Email already exist".to_string(),
            AppError::NotFound(_) => "Resource not found".to_string(),
            AppError::InvalidOrExpired(_) | AppError::InvalidToken => {
                "Token is invalid or has expired".to_string()
            },
            AppError::CodeMismatch => "Invalid activation code".to_string(),
            AppError::NoToken => "Please login to access this resource".to_string(),
            AppError::SessionExpired | AppError::SessionNotFound => {
                "Session expired, please login again".to_string()
            },
            AppError::Internal(_) | AppError::Io(_) | AppError::Json(_) => {
                "An internal server error occurred".to_string()
            },
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let error_code = self.error_code();

        // Infrastructure failures never reach the client in detail
        let message = if self.is_internal() {
            tracing::error!(code = error_code, error = %self, "request failed");
            self.sanitized_message()
        } else if cfg!(debug_assertions) {
            self.to_string()
        } else {
            self.sanitized_message()
        };

        let body = serde_json::json!({
            "error": {
                "code": error_code,
                "message": message,
            }
        });

        (status, axum::Json(body)).into_response()
    }
}

impl From<String> for AppError {
    fn from(msg: String) -> Self {
        AppError::Internal(msg)
    }
}

impl From<&str> for AppError {
    fn from(msg: &str) -> Self {
        AppError::Internal(msg.to_string())
    }
}
