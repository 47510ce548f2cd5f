//! Two-party chat and message types for Roost.
//!
//! A [`Chat`] is a conversation thread between exactly two users. Its
//! participants are stored as a canonical [`ParticipantPair`] so that the
//! unordered pair (A, B) and (B, A) map to the same thread. Read receipts
//! live in `seen_by`, which is always a subset of the participants.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::user::{Receiver, UserId};

/// Unique identifier for a chat (UUID v7).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChatId(pub Uuid);

impl ChatId {
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl Default for ChatId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ChatId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ChatId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// Unique identifier for a message (UUID v7).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageId(pub Uuid);

impl MessageId {
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl Default for MessageId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The two distinct members of a chat, kept in ascending order.
///
/// Serialized as a two-element array `[low, high]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "[UserId; 2]", into = "[UserId; 2]")]
pub struct ParticipantPair {
    low: UserId,
    high: UserId,
}

impl ParticipantPair {
    /// Build the canonical pair for two users. Returns `None` when both ids
    /// are the same user.
    pub fn new(a: UserId, b: UserId) -> Option<Self> {
        match a.cmp(&b) {
            std::cmp::Ordering::Less => Some(Self { low: a, high: b }),
            std::cmp::Ordering::Greater => Some(Self { low: b, high: a }),
            std::cmp::Ordering::Equal => None,
        }
    }

    pub fn low(&self) -> UserId {
        self.low
    }

    pub fn high(&self) -> UserId {
        self.high
    }

    pub fn contains(&self, user: &UserId) -> bool {
        self.low == *user || self.high == *user
    }

    /// The other member of the pair, or `None` if `user` is not a member.
    pub fn other(&self, user: &UserId) -> Option<UserId> {
        if self.low == *user {
            Some(self.high)
        } else if self.high == *user {
            Some(self.low)
        } else {
            None
        }
    }
}

impl TryFrom<[UserId; 2]> for ParticipantPair {
    type Error = String;

    fn try_from([a, b]: [UserId; 2]) -> Result<Self, Self::Error> {
        Self::new(a, b).ok_or_else(|| format!("chat participants must be distinct, got {a} twice"))
    }
}

impl From<ParticipantPair> for [UserId; 2] {
    fn from(pair: ParticipantPair) -> Self {
        [pair.low, pair.high]
    }
}

/// A conversation thread between two users.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chat {
    pub id: ChatId,
    #[serde(rename = "participant_ids")]
    pub participants: ParticipantPair,
    /// Participants who have seen the chat since its last new message.
    pub seen_by: BTreeSet<UserId>,
    pub created_at: DateTime<Utc>,
}

impl Chat {
    /// A fresh chat with nobody in `seen_by`.
    pub fn new(participants: ParticipantPair) -> Self {
        Self {
            id: ChatId::new(),
            participants,
            seen_by: BTreeSet::new(),
            created_at: Utc::now().trunc_subsecs(6),
        }
    }

    pub fn is_participant(&self, user: &UserId) -> bool {
        self.participants.contains(user)
    }

    pub fn has_seen(&self, user: &UserId) -> bool {
        self.seen_by.contains(user)
    }

    /// The other participant from `viewer`'s point of view.
    pub fn counterpart(&self, viewer: &UserId) -> Option<UserId> {
        self.participants.other(viewer)
    }
}

/// A single message within a chat. Messages are ordered by `created_at`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: MessageId,
    pub chat_id: ChatId,
    pub sender_id: UserId,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl Message {
    pub fn new(chat_id: ChatId, sender_id: UserId, content: String) -> Self {
        Self {
            id: MessageId::new(),
            chat_id,
            sender_id,
            content,
            created_at: Utc::now().trunc_subsecs(6),
        }
    }
}

/// A chat as listed for a caller, with the counterpart's profile attached.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatSummary {
    #[serde(flatten)]
    pub chat: Chat,
    /// `None` when the counterpart's profile could not be resolved.
    pub receiver: Option<Receiver>,
}

/// A chat with its full message history, oldest first.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatDetail {
    #[serde(flatten)]
    pub chat: Chat,
    pub messages: Vec<Message>,
    pub receiver: Option<Receiver>,
}

/// Body of `POST /chats`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateChatRequest {
    pub receiver_id: UserId,
}

/// Body of `POST /messages`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostMessageRequest {
    pub chat_id: ChatId,
    pub content: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pair_is_order_independent() {
        let a = UserId::new();
        let b = UserId::new();
        assert_eq!(ParticipantPair::new(a, b), ParticipantPair::new(b, a));
    }

    #[test]
    fn test_pair_rejects_self() {
        let a = UserId::new();
        assert!(ParticipantPair::new(a, a).is_none());
    }

    #[test]
    fn test_pair_other() {
        let a = UserId::new();
        let b = UserId::new();
        let pair = ParticipantPair::new(a, b).unwrap();
        assert_eq!(pair.other(&a), Some(b));
        assert_eq!(pair.other(&b), Some(a));
        assert_eq!(pair.other(&UserId::new()), None);
    }

    #[test]
    fn test_pair_deserialize_rejects_duplicates() {
        let a = UserId::new();
        let json = format!("[\"{a}\",\"{a}\"]");
        let err = serde_json::from_str::<ParticipantPair>(&json).unwrap_err();
        assert!(err.to_string().contains("distinct"));
    }

    #[test]
    fn test_chat_summary_flattens_chat() {
        let a = UserId::new();
        let b = UserId::new();
        let mut chat = Chat::new(ParticipantPair::new(a, b).unwrap());
        chat.seen_by.insert(a);

        let summary = ChatSummary {
            chat: chat.clone(),
            receiver: None,
        };
        let json = serde_json::to_value(&summary).unwrap();

        assert_eq!(json["id"], serde_json::json!(chat.id.0.to_string()));
        assert_eq!(json["participant_ids"].as_array().unwrap().len(), 2);
        assert_eq!(json["seen_by"], serde_json::json!([a.0.to_string()]));
        assert!(json["receiver"].is_null());
    }

    #[test]
    fn test_new_chat_has_empty_seen_by() {
        let chat = Chat::new(ParticipantPair::new(UserId::new(), UserId::new()).unwrap());
        assert!(chat.seen_by.is_empty());
    }
}
