//! ChatRepository trait definition.
//!
//! Owns two-party chats and their seen-state. Every seen-state mutation is a
//! single atomic operation in the store; callers never read `seen_by`,
//! modify it, and write it back.

use roost_types::chat::{Chat, ChatId, ParticipantPair};
use roost_types::error::RepositoryError;
use roost_types::user::UserId;

/// Repository trait for chat persistence.
///
/// Implementations live in roost-infra (e.g., `SqliteChatRepository`).
/// Uses native async fn in traits (RPITIT, Rust 2024 edition).
pub trait ChatRepository: Send + Sync {
    /// All chats the user participates in, newest first.
    fn list_for_user(
        &self,
        user_id: &UserId,
    ) -> impl std::future::Future<Output = Result<Vec<Chat>, RepositoryError>> + Send;

    /// Look up the chat for an unordered pair of users.
    fn find_by_pair(
        &self,
        pair: &ParticipantPair,
    ) -> impl std::future::Future<Output = Result<Option<Chat>, RepositoryError>> + Send;

    /// Insert a new chat. Returns `Conflict` if the pair already has one.
    fn create(
        &self,
        chat: &Chat,
    ) -> impl std::future::Future<Output = Result<Chat, RepositoryError>> + Send;

    /// Get a chat only if `requester` is one of its participants.
    ///
    /// A chat the requester cannot see is indistinguishable from a missing one.
    fn get_for_participant(
        &self,
        chat_id: &ChatId,
        requester: &UserId,
    ) -> impl std::future::Future<Output = Result<Option<Chat>, RepositoryError>> + Send;

    /// Add `user_id` to `seen_by` if it is a participant. Idempotent; never
    /// removes other entries. Returns the updated chat, or `None` if the
    /// chat is missing or hidden from the user.
    fn mark_seen(
        &self,
        chat_id: &ChatId,
        user_id: &UserId,
    ) -> impl std::future::Future<Output = Result<Option<Chat>, RepositoryError>> + Send;

    /// Replace `seen_by` with exactly `{user_id}`.
    fn reset_seen(
        &self,
        chat_id: &ChatId,
        user_id: &UserId,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;

    /// Number of the user's chats whose `seen_by` does not contain them.
    fn count_unseen(
        &self,
        user_id: &UserId,
    ) -> impl std::future::Future<Output = Result<u64, RepositoryError>> + Send;
}
