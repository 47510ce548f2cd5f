//! Messaging service orchestrating chats, messages, and read receipts.
//!
//! MessagingService coordinates the ChatRepository, MessageRepository and
//! UserDirectory to implement the pairwise messaging use cases. Callers
//! pass an already-resolved caller id; identity resolution happens at the
//! request boundary.
//!
//! Read-state has exactly two transitions: viewing a chat adds the viewer
//! to `seen_by`, and posting a message resets `seen_by` to the sender.

use roost_types::chat::{Chat, ChatDetail, ChatId, ChatSummary, Message, ParticipantPair};
use roost_types::error::{ChatError, RepositoryError};
use roost_types::user::{Receiver, UserId};
use tracing::{debug, info, warn};

use crate::repository::chat::ChatRepository;
use crate::repository::message::MessageRepository;
use crate::repository::user::UserDirectory;

/// Orchestrates the two-party messaging use cases.
///
/// Generic over its ports so roost-core never depends on roost-infra.
pub struct MessagingService<C: ChatRepository, M: MessageRepository, U: UserDirectory> {
    chat_repo: C,
    message_repo: M,
    users: U,
}

impl<C: ChatRepository, M: MessageRepository, U: UserDirectory> MessagingService<C, M, U> {
    pub fn new(chat_repo: C, message_repo: M, users: U) -> Self {
        Self {
            chat_repo,
            message_repo,
            users,
        }
    }

    /// List the caller's chats, newest first, each with its receiver attached.
    ///
    /// A receiver that cannot be resolved is reported as `None` rather than
    /// failing the whole listing.
    pub async fn list_chats(&self, caller: &UserId) -> Result<Vec<ChatSummary>, ChatError> {
        let chats = self.chat_repo.list_for_user(caller).await?;

        let mut summaries = Vec::with_capacity(chats.len());
        for chat in chats {
            let receiver = self.resolve_receiver(caller, &chat).await;
            summaries.push(ChatSummary { chat, receiver });
        }

        Ok(summaries)
    }

    /// Open a chat: returns its history and marks it seen by the caller.
    pub async fn get_chat(
        &self,
        caller: &UserId,
        chat_id: &ChatId,
    ) -> Result<ChatDetail, ChatError> {
        let mut chat = self
            .chat_repo
            .get_for_participant(chat_id, caller)
            .await?
            .ok_or(ChatError::NotFound)?;

        // Mark before reading history: a message appended after the mark
        // resets the caller out of seen_by, one appended before is listed.
        if !chat.has_seen(caller) {
            chat = self
                .chat_repo
                .mark_seen(chat_id, caller)
                .await?
                .ok_or(ChatError::NotFound)?;
            debug!(chat_id = %chat_id, user_id = %caller, "Chat marked seen on open");
        }

        let messages = self.message_repo.list(chat_id).await?;
        let receiver = self.resolve_receiver(caller, &chat).await;

        Ok(ChatDetail {
            chat,
            messages,
            receiver,
        })
    }

    /// Return the chat between the caller and `receiver_id`, creating it on
    /// first contact.
    ///
    /// Concurrent first contacts race on the store's pair-uniqueness
    /// constraint; the loser re-reads once and adopts the winner's chat.
    pub async fn get_or_create_chat(
        &self,
        caller: &UserId,
        receiver_id: &UserId,
    ) -> Result<ChatDetail, ChatError> {
        let pair = ParticipantPair::new(*caller, *receiver_id).ok_or_else(|| {
            ChatError::BadRequest("cannot start a chat with yourself".to_string())
        })?;

        let receiver = self
            .users
            .lookup(receiver_id)
            .await?
            .ok_or(ChatError::UserNotFound)?;

        let chat = match self.chat_repo.find_by_pair(&pair).await? {
            Some(chat) => chat,
            None => self.create_or_adopt(pair).await?,
        };

        let messages = self.message_repo.list(&chat.id).await?;

        Ok(ChatDetail {
            chat,
            messages,
            receiver: Some(Receiver::from(receiver)),
        })
    }

    async fn create_or_adopt(&self, pair: ParticipantPair) -> Result<Chat, ChatError> {
        match self.chat_repo.create(&Chat::new(pair)).await {
            Ok(chat) => {
                info!(chat_id = %chat.id, "Chat created");
                Ok(chat)
            }
            Err(RepositoryError::Conflict(msg)) => {
                info!(
                    low = %pair.low(),
                    high = %pair.high(),
                    "Lost chat creation race, adopting existing chat"
                );
                self.chat_repo
                    .find_by_pair(&pair)
                    .await?
                    .ok_or(ChatError::Conflict(msg))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Mark a chat as read by the caller without fetching its history.
    pub async fn mark_read(
        &self,
        caller: &UserId,
        chat_id: &ChatId,
    ) -> Result<ChatSummary, ChatError> {
        let chat = self
            .chat_repo
            .mark_seen(chat_id, caller)
            .await?
            .ok_or(ChatError::NotFound)?;

        let receiver = self.resolve_receiver(caller, &chat).await;
        Ok(ChatSummary { chat, receiver })
    }

    /// Post a message into a chat. Afterwards only the sender has seen it.
    pub async fn post_message(
        &self,
        caller: &UserId,
        chat_id: &ChatId,
        content: String,
    ) -> Result<Message, ChatError> {
        if content.trim().is_empty() {
            return Err(ChatError::BadRequest(
                "message content cannot be empty".to_string(),
            ));
        }

        let message = self
            .message_repo
            .append(&Message::new(*chat_id, *caller, content))
            .await?;

        self.chat_repo.reset_seen(chat_id, caller).await?;

        debug!(chat_id = %chat_id, message_id = %message.id, "Message posted");
        Ok(message)
    }

    /// Number of the caller's chats with something they have not seen.
    pub async fn unread_count(&self, caller: &UserId) -> Result<u64, ChatError> {
        Ok(self.chat_repo.count_unseen(caller).await?)
    }

    async fn resolve_receiver(&self, caller: &UserId, chat: &Chat) -> Option<Receiver> {
        let other = chat.counterpart(caller)?;
        match self.users.lookup(&other).await {
            Ok(Some(profile)) => Some(Receiver::from(profile)),
            Ok(None) => {
                warn!(chat_id = %chat.id, user_id = %other, "Receiver profile missing");
                None
            }
            Err(e) => {
                warn!(chat_id = %chat.id, user_id = %other, error = %e, "Receiver lookup failed");
                None
            }
        }
    }
}
