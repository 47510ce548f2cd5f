//! Chat handlers: list, open, start, and mark read.

use std::time::Instant;

use axum::extract::{Path, State};
use axum::Json;

use roost_types::chat::{ChatDetail, ChatSummary, CreateChatRequest};

use crate::http::error::AppError;
use crate::http::extractors::auth::CurrentUser;
use crate::http::extractors::json::ApiJson;
use crate::http::handlers::parse_chat_id;
use crate::http::response::ApiResponse;
use crate::state::AppState;

/// GET /api/v1/chats - The caller's chats, newest first.
pub async fn list_chats(
    State(state): State<AppState>,
    CurrentUser(caller): CurrentUser,
) -> Result<Json<ApiResponse<Vec<ChatSummary>>>, AppError> {
    let start = Instant::now();
    let request_id = uuid::Uuid::now_v7().to_string();

    let chats = state.messaging.list_chats(&caller).await?;
    let elapsed = start.elapsed().as_millis() as u64;

    Ok(Json(
        ApiResponse::success(chats, request_id, elapsed).with_link("self", "/api/v1/chats"),
    ))
}

/// POST /api/v1/chats - Get or create the chat with `receiver_id`.
pub async fn create_chat(
    State(state): State<AppState>,
    CurrentUser(caller): CurrentUser,
    ApiJson(body): ApiJson<CreateChatRequest>,
) -> Result<Json<ApiResponse<ChatDetail>>, AppError> {
    let start = Instant::now();
    let request_id = uuid::Uuid::now_v7().to_string();

    let detail = state
        .messaging
        .get_or_create_chat(&caller, &body.receiver_id)
        .await?;
    let elapsed = start.elapsed().as_millis() as u64;

    let self_link = format!("/api/v1/chats/{}", detail.chat.id);
    Ok(Json(
        ApiResponse::success(detail, request_id, elapsed).with_link("self", &self_link),
    ))
}

/// GET /api/v1/chats/{id} - Open a chat; marks it seen by the caller.
pub async fn get_chat(
    State(state): State<AppState>,
    CurrentUser(caller): CurrentUser,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<ChatDetail>>, AppError> {
    let start = Instant::now();
    let request_id = uuid::Uuid::now_v7().to_string();

    let chat_id = parse_chat_id(&id)?;
    let detail = state.messaging.get_chat(&caller, &chat_id).await?;
    let elapsed = start.elapsed().as_millis() as u64;

    Ok(Json(
        ApiResponse::success(detail, request_id, elapsed)
            .with_link("self", &format!("/api/v1/chats/{chat_id}"))
            .with_link("messages", "/api/v1/messages"),
    ))
}

/// POST /api/v1/chats/{id}/read - Mark a chat read without fetching history.
pub async fn mark_read(
    State(state): State<AppState>,
    CurrentUser(caller): CurrentUser,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<ChatSummary>>, AppError> {
    let start = Instant::now();
    let request_id = uuid::Uuid::now_v7().to_string();

    let chat_id = parse_chat_id(&id)?;
    let summary = state.messaging.mark_read(&caller, &chat_id).await?;
    let elapsed = start.elapsed().as_millis() as u64;

    Ok(Json(
        ApiResponse::success(summary, request_id, elapsed)
            .with_link("chat", &format!("/api/v1/chats/{chat_id}")),
    ))
}
