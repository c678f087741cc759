// ============================
// crates/backend-lib/src/middleware/json.rs
// ============================
//! JSON body extractor that rejects with the API error envelope.
use axum::{extract::rejection::JsonRejection, extract::FromRequest};

use crate::error::AppError;

/// `Json` whose rejections render as [`AppError::InvalidInput`]
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct AppJson<T>(pub T);

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::InvalidInput(rejection.body_text())
    }
}
