//! User identity and profile projections.
//!
//! Users are owned by the profile service; the messaging layer only ever
//! references them by [`UserId`] and reads minimal profile data.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use std::fmt;
use std::str::FromStr;

/// Unique identifier for a user, wrapping a UUID v7 (time-sortable).
///
/// Ordered so that a pair of users has a canonical (low, high) form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub Uuid);

impl UserId {
    /// Create a new UserId using UUID v7.
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    /// Create a UserId from an existing UUID.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl Default for UserId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for UserId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// Full profile as returned by the user directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: UserId,
    pub phone: String,
    pub avatar: Option<String>,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

/// The counterpart of a chat, as shown to the caller.
///
/// Deliberately narrower than [`UserProfile`]: email is never exposed to
/// the other participant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Receiver {
    pub id: UserId,
    pub phone: String,
    pub avatar: Option<String>,
}

impl From<UserProfile> for Receiver {
    fn from(profile: UserProfile) -> Self {
        Self {
            id: profile.id,
            phone: profile.phone,
            avatar: profile.avatar,
        }
    }
}

/// Request to register a user in the local directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewUser {
    pub phone: String,
    pub email: String,
    pub avatar: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_id_roundtrip() {
        let id = UserId::new();
        let parsed: UserId = id.to_string().parse().unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn test_user_id_serializes_as_plain_uuid() {
        let id = UserId::new();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{}\"", id.0));
    }

    #[test]
    fn test_receiver_drops_email() {
        let profile = UserProfile {
            id: UserId::new(),
            phone: "+15550100".to_string(),
            avatar: Some("https://cdn.example/a.png".to_string()),
            email: "a@example.com".to_string(),
            created_at: Utc::now(),
        };
        let receiver = Receiver::from(profile.clone());
        assert_eq!(receiver.id, profile.id);
        assert_eq!(receiver.phone, "+15550100");

        let json = serde_json::to_value(&receiver).unwrap();
        assert!(json.get("email").is_none());
    }
}
