//! SQLite message repository implementation.
//!
//! Messages are append-only. The sender's membership is checked inside the
//! same transaction as the insert, so a message can never land in a chat
//! its sender does not belong to.

use roost_core::repository::message::MessageRepository;
use roost_types::chat::{ChatId, Message, MessageId};
use roost_types::error::RepositoryError;
use roost_types::user::UserId;
use sqlx::Row;

use super::pool::DatabasePool;
use super::{format_datetime, parse_datetime, parse_uuid};

/// SQLite-backed implementation of `MessageRepository`.
#[derive(Clone)]
pub struct SqliteMessageRepository {
    pool: DatabasePool,
}

impl SqliteMessageRepository {
    /// Create a new repository backed by the given database pool.
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

/// Internal row type for mapping SQLite rows to domain Message.
struct MessageRow {
    id: String,
    chat_id: String,
    sender_id: String,
    content: String,
    created_at: String,
}

impl MessageRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            chat_id: row.try_get("chat_id")?,
            sender_id: row.try_get("sender_id")?,
            content: row.try_get("content")?,
            created_at: row.try_get("created_at")?,
        })
    }

    fn into_message(self) -> Result<Message, RepositoryError> {
        Ok(Message {
            id: MessageId(parse_uuid(&self.id)?),
            chat_id: ChatId(parse_uuid(&self.chat_id)?),
            sender_id: UserId(parse_uuid(&self.sender_id)?),
            content: self.content,
            created_at: parse_datetime(&self.created_at)?,
        })
    }
}

impl MessageRepository for SqliteMessageRepository {
    async fn append(&self, message: &Message) -> Result<Message, RepositoryError> {
        let mut tx = self
            .pool
            .writer
            .begin()
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        let row = sqlx::query("SELECT user_low, user_high FROM chats WHERE id = ?")
            .bind(message.chat_id.to_string())
            .fetch_optional(&mut *tx)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?
            .ok_or(RepositoryError::NotFound)?;

        let low: String = row
            .try_get("user_low")
            .map_err(|e| RepositoryError::Query(e.to_string()))?;
        let high: String = row
            .try_get("user_high")
            .map_err(|e| RepositoryError::Query(e.to_string()))?;
        let sender = message.sender_id.to_string();
        if sender != low && sender != high {
            return Err(RepositoryError::NotParticipant);
        }

        sqlx::query(
            r#"INSERT INTO messages (id, chat_id, sender_id, content, created_at)
               VALUES (?, ?, ?, ?, ?)"#,
        )
        .bind(message.id.to_string())
        .bind(message.chat_id.to_string())
        .bind(&sender)
        .bind(&message.content)
        .bind(format_datetime(&message.created_at))
        .execute(&mut *tx)
        .await
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

        tx.commit()
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        Ok(message.clone())
    }

    async fn list(&self, chat_id: &ChatId) -> Result<Vec<Message>, RepositoryError> {
        let rows = sqlx::query(
            r#"SELECT id, chat_id, sender_id, content, created_at FROM messages
               WHERE chat_id = ? ORDER BY created_at ASC, seq ASC"#,
        )
        .bind(chat_id.to_string())
        .fetch_all(&self.pool.reader)
        .await
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

        let mut messages = Vec::with_capacity(rows.len());
        for row in &rows {
            let msg_row =
                MessageRow::from_row(row).map_err(|e| RepositoryError::Query(e.to_string()))?;
            messages.push(msg_row.into_message()?);
        }

        Ok(messages)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sqlite::chat::SqliteChatRepository;
    use crate::sqlite::pool::{default_database_url, DatabasePool};
    use roost_core::repository::chat::ChatRepository;
    use roost_types::chat::{Chat, ParticipantPair};

    async fn test_pool() -> DatabasePool {
        let dir = tempfile::tempdir().unwrap();
        let url = default_database_url(dir.path());
        std::mem::forget(dir);
        DatabasePool::new(&url).await.unwrap()
    }

    async fn seed_chat(pool: &DatabasePool) -> (Chat, UserId, UserId) {
        let a = UserId::new();
        let b = UserId::new();
        let chat = Chat::new(ParticipantPair::new(a, b).unwrap());
        SqliteChatRepository::new(pool.clone())
            .create(&chat)
            .await
            .unwrap();
        (chat, a, b)
    }

    #[tokio::test]
    async fn test_append_and_list_in_order() {
        let pool = test_pool().await;
        let repo = SqliteMessageRepository::new(pool.clone());
        let (chat, a, b) = seed_chat(&pool).await;

        let first = Message::new(chat.id, a, "hello".to_string());
        // Same timestamp as `first`: insertion order must decide.
        let second = Message {
            created_at: first.created_at,
            ..Message::new(chat.id, b, "hi back".to_string())
        };
        let third = Message::new(chat.id, a, "how are you".to_string());

        repo.append(&first).await.unwrap();
        repo.append(&second).await.unwrap();
        repo.append(&third).await.unwrap();

        let messages = repo.list(&chat.id).await.unwrap();
        let contents: Vec<&str> = messages.iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, vec!["hello", "hi back", "how are you"]);
        assert_eq!(messages[0], first);
        assert_eq!(messages[1].sender_id, b);
    }

    #[tokio::test]
    async fn test_append_rejects_outsider() {
        let pool = test_pool().await;
        let repo = SqliteMessageRepository::new(pool.clone());
        let (chat, _, _) = seed_chat(&pool).await;

        let msg = Message::new(chat.id, UserId::new(), "sneaky".to_string());
        let err = repo.append(&msg).await.unwrap_err();
        assert!(matches!(err, RepositoryError::NotParticipant));
        assert!(repo.list(&chat.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_append_to_missing_chat() {
        let pool = test_pool().await;
        let repo = SqliteMessageRepository::new(pool);

        let msg = Message::new(ChatId::new(), UserId::new(), "hello?".to_string());
        let err = repo.append(&msg).await.unwrap_err();
        assert!(matches!(err, RepositoryError::NotFound));
    }

    #[tokio::test]
    async fn test_list_is_scoped_to_chat() {
        let pool = test_pool().await;
        let repo = SqliteMessageRepository::new(pool.clone());
        let (one, a, _) = seed_chat(&pool).await;
        let (two, c, _) = seed_chat(&pool).await;

        repo.append(&Message::new(one.id, a, "in one".to_string()))
            .await
            .unwrap();
        repo.append(&Message::new(two.id, c, "in two".to_string()))
            .await
            .unwrap();

        let listed = repo.list(&one.id).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].content, "in one");
    }
}
