//! Message posting handler.

use std::time::Instant;

use axum::extract::State;
use axum::Json;

use roost_types::chat::{Message, PostMessageRequest};

use crate::http::error::AppError;
use crate::http::extractors::auth::CurrentUser;
use crate::http::extractors::json::ApiJson;
use crate::http::response::ApiResponse;
use crate::state::AppState;

/// POST /api/v1/messages - Post a message into one of the caller's chats.
pub async fn post_message(
    State(state): State<AppState>,
    CurrentUser(caller): CurrentUser,
    ApiJson(body): ApiJson<PostMessageRequest>,
) -> Result<Json<ApiResponse<Message>>, AppError> {
    let start = Instant::now();
    let request_id = uuid::Uuid::now_v7().to_string();

    let message = state
        .messaging
        .post_message(&caller, &body.chat_id, body.content)
        .await?;
    let elapsed = start.elapsed().as_millis() as u64;

    let chat_link = format!("/api/v1/chats/{}", message.chat_id);
    Ok(Json(
        ApiResponse::success(message, request_id, elapsed).with_link("chat", &chat_link),
    ))
}
