//! HTTP request handlers for the REST API.

pub mod chat;
pub mod message;
pub mod notification;

use roost_types::chat::ChatId;
use roost_types::error::ChatError;

use crate::http::error::AppError;

/// Parse a chat id path segment. Malformed ids cannot name a chat.
pub(crate) fn parse_chat_id(raw: &str) -> Result<ChatId, AppError> {
    raw.parse().map_err(|_| AppError::Chat(ChatError::NotFound))
}
