//! Message repository trait definition.

use roost_types::chat::{ChatId, Message};
use roost_types::error::RepositoryError;

/// Repository trait for chat message persistence.
///
/// Messages are append-only: there is no update or delete.
pub trait MessageRepository: Send + Sync {
    /// Append a message to its chat.
    ///
    /// Returns `NotFound` if the chat does not exist and `NotParticipant`
    /// if the sender is not one of its participants.
    fn append(
        &self,
        message: &Message,
    ) -> impl std::future::Future<Output = Result<Message, RepositoryError>> + Send;

    /// Messages of a chat ordered by created_at ASC, insertion order on ties.
    fn list(
        &self,
        chat_id: &ChatId,
    ) -> impl std::future::Future<Output = Result<Vec<Message>, RepositoryError>> + Send;
}
