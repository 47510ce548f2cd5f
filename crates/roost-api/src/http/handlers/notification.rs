//! Unread-chat badge count.

use std::time::Instant;

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::http::error::AppError;
use crate::http::extractors::auth::CurrentUser;
use crate::http::response::ApiResponse;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct UnreadCount {
    pub unread: u64,
}

/// GET /api/v1/notifications/unread - Number of chats with unseen activity.
pub async fn unread_count(
    State(state): State<AppState>,
    CurrentUser(caller): CurrentUser,
) -> Result<Json<ApiResponse<UnreadCount>>, AppError> {
    let start = Instant::now();
    let request_id = uuid::Uuid::now_v7().to_string();

    let unread = state.messaging.unread_count(&caller).await?;
    let elapsed = start.elapsed().as_millis() as u64;

    Ok(Json(
        ApiResponse::success(UnreadCount { unread }, request_id, elapsed)
            .with_link("chats", "/api/v1/chats"),
    ))
}
