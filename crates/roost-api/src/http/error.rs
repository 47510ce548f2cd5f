//! Application error type mapping to HTTP status codes and envelope format.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use roost_types::error::ChatError;

use crate::http::response::ApiResponse;

/// Application-level error that maps to HTTP responses.
#[derive(Debug)]
pub enum AppError {
    /// Messaging domain errors.
    Chat(ChatError),
    /// Request body or parameters could not be understood.
    Validation(String),
    /// Generic internal error.
    Internal(String),
}

impl From<ChatError> for AppError {
    fn from(e: ChatError) -> Self {
        AppError::Chat(e)
    }
}

impl AppError {
    /// Status, stable machine code, and message for this error.
    pub fn parts(&self) -> (StatusCode, &'static str, String) {
        match self {
            AppError::Chat(ChatError::Unauthenticated) => (
                StatusCode::UNAUTHORIZED,
                "UNAUTHENTICATED",
                "Missing or invalid credentials. Provide 'Authorization: Bearer <token>' or a 'token' cookie.".to_string(),
            ),
            AppError::Chat(ChatError::Forbidden) => (
                StatusCode::FORBIDDEN,
                "FORBIDDEN",
                "You are not a participant of this chat".to_string(),
            ),
            AppError::Chat(ChatError::NotFound) => {
                (StatusCode::NOT_FOUND, "CHAT_NOT_FOUND", "Chat not found".to_string())
            }
            AppError::Chat(ChatError::UserNotFound) => {
                (StatusCode::NOT_FOUND, "USER_NOT_FOUND", "User not found".to_string())
            }
            AppError::Chat(ChatError::BadRequest(msg)) | AppError::Validation(msg) => {
                (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
            }
            AppError::Chat(ChatError::Conflict(msg)) => {
                (StatusCode::CONFLICT, "CHAT_CONFLICT", msg.clone())
            }
            AppError::Chat(ChatError::Storage(msg)) | AppError::Internal(msg) => {
                tracing::error!(error = %msg, "request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "Internal server error".to_string(),
                )
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = self.parts();
        let body = ApiResponse::error(code, &message, String::new(), 0);
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chat_errors_map_to_distinct_codes() {
        let cases = [
            (ChatError::Unauthenticated, StatusCode::UNAUTHORIZED, "UNAUTHENTICATED"),
            (ChatError::Forbidden, StatusCode::FORBIDDEN, "FORBIDDEN"),
            (ChatError::NotFound, StatusCode::NOT_FOUND, "CHAT_NOT_FOUND"),
            (ChatError::UserNotFound, StatusCode::NOT_FOUND, "USER_NOT_FOUND"),
            (
                ChatError::BadRequest("empty".into()),
                StatusCode::BAD_REQUEST,
                "VALIDATION_ERROR",
            ),
            (
                ChatError::Conflict("race".into()),
                StatusCode::CONFLICT,
                "CHAT_CONFLICT",
            ),
            (
                ChatError::Storage("disk".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
            ),
        ];

        for (err, status, code) in cases {
            let (got_status, got_code, _) = AppError::from(err).parts();
            assert_eq!(got_status, status);
            assert_eq!(got_code, code);
        }
    }

    #[test]
    fn storage_details_are_not_exposed() {
        let (_, _, message) = AppError::from(ChatError::Storage("secret path".into())).parts();
        assert!(!message.contains("secret path"));
    }
}
