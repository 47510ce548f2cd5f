//! JSON body extractor whose rejections use the envelope format.

use axum::extract::rejection::JsonRejection;
use axum::extract::FromRequest;

use crate::http::error::AppError;

/// Like `axum::Json`, but a malformed body becomes `VALIDATION_ERROR`.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct ApiJson<T>(pub T);

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}
