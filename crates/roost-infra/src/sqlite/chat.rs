//! SQLite chat repository implementation.
//!
//! Implements `ChatRepository` from `roost-core` using sqlx with split read/write pools.
//! Participants live on the `chats` row as a sorted pair; `seen_by` is a set of
//! rows in `chat_seen`, so adding a viewer is `INSERT OR IGNORE` and resetting
//! is a delete-and-insert inside one transaction.

use std::collections::BTreeSet;

use chrono::Utc;
use roost_core::repository::chat::ChatRepository;
use roost_types::chat::{Chat, ChatId, ParticipantPair};
use roost_types::error::RepositoryError;
use roost_types::user::UserId;
use sqlx::Row;

use super::pool::DatabasePool;
use super::{format_datetime, is_unique_violation, parse_datetime, parse_uuid};

/// SQLite-backed implementation of `ChatRepository`.
#[derive(Clone)]
pub struct SqliteChatRepository {
    pool: DatabasePool,
}

impl SqliteChatRepository {
    /// Create a new repository backed by the given database pool.
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

/// Chat columns plus the aggregated seen-set, for every chat query.
const CHAT_SELECT: &str = r#"SELECT c.id, c.user_low, c.user_high, c.created_at,
       (SELECT group_concat(s.user_id, ',') FROM chat_seen s WHERE s.chat_id = c.id) AS seen_by
FROM chats c"#;

// ---------------------------------------------------------------------------
// Private Row types for SQLite-to-domain mapping
// ---------------------------------------------------------------------------

/// Internal row type for mapping SQLite rows to domain Chat.
struct ChatRow {
    id: String,
    user_low: String,
    user_high: String,
    created_at: String,
    seen_by: Option<String>,
}

impl ChatRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            user_low: row.try_get("user_low")?,
            user_high: row.try_get("user_high")?,
            created_at: row.try_get("created_at")?,
            seen_by: row.try_get("seen_by")?,
        })
    }

    fn into_chat(self) -> Result<Chat, RepositoryError> {
        let low = UserId(parse_uuid(&self.user_low)?);
        let high = UserId(parse_uuid(&self.user_high)?);
        let participants = ParticipantPair::new(low, high)
            .ok_or_else(|| RepositoryError::Query(format!("chat {} has one participant", self.id)))?;

        let seen_by = self
            .seen_by
            .as_deref()
            .unwrap_or_default()
            .split(',')
            .filter(|s| !s.is_empty())
            .map(|s| parse_uuid(s).map(UserId))
            .collect::<Result<BTreeSet<_>, _>>()?;

        Ok(Chat {
            id: ChatId(parse_uuid(&self.id)?),
            participants,
            seen_by,
            created_at: parse_datetime(&self.created_at)?,
        })
    }
}

fn rows_to_chats(rows: &[sqlx::sqlite::SqliteRow]) -> Result<Vec<Chat>, RepositoryError> {
    let mut chats = Vec::with_capacity(rows.len());
    for row in rows {
        let chat_row = ChatRow::from_row(row).map_err(|e| RepositoryError::Query(e.to_string()))?;
        chats.push(chat_row.into_chat()?);
    }
    Ok(chats)
}

fn row_to_chat(row: Option<sqlx::sqlite::SqliteRow>) -> Result<Option<Chat>, RepositoryError> {
    match row {
        Some(row) => {
            let chat_row =
                ChatRow::from_row(&row).map_err(|e| RepositoryError::Query(e.to_string()))?;
            Ok(Some(chat_row.into_chat()?))
        }
        None => Ok(None),
    }
}

// ---------------------------------------------------------------------------
// ChatRepository implementation
// ---------------------------------------------------------------------------

impl ChatRepository for SqliteChatRepository {
    async fn list_for_user(&self, user_id: &UserId) -> Result<Vec<Chat>, RepositoryError> {
        let sql = format!(
            "{CHAT_SELECT} WHERE c.user_low = ? OR c.user_high = ? ORDER BY c.created_at DESC, c.rowid DESC"
        );

        let rows = sqlx::query(&sql)
            .bind(user_id.to_string())
            .bind(user_id.to_string())
            .fetch_all(&self.pool.reader)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        rows_to_chats(&rows)
    }

    async fn find_by_pair(&self, pair: &ParticipantPair) -> Result<Option<Chat>, RepositoryError> {
        let sql = format!("{CHAT_SELECT} WHERE c.user_low = ? AND c.user_high = ?");

        let row = sqlx::query(&sql)
            .bind(pair.low().to_string())
            .bind(pair.high().to_string())
            .fetch_optional(&self.pool.reader)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        row_to_chat(row)
    }

    async fn create(&self, chat: &Chat) -> Result<Chat, RepositoryError> {
        let result = sqlx::query(
            "INSERT INTO chats (id, user_low, user_high, created_at) VALUES (?, ?, ?, ?)",
        )
        .bind(chat.id.to_string())
        .bind(chat.participants.low().to_string())
        .bind(chat.participants.high().to_string())
        .bind(format_datetime(&chat.created_at))
        .execute(&self.pool.writer)
        .await;

        match result {
            Ok(_) => Ok(Chat {
                seen_by: BTreeSet::new(),
                ..chat.clone()
            }),
            Err(e) if is_unique_violation(&e) => Err(RepositoryError::Conflict(format!(
                "chat between {} and {} already exists",
                chat.participants.low(),
                chat.participants.high()
            ))),
            Err(e) => Err(RepositoryError::Query(e.to_string())),
        }
    }

    async fn get_for_participant(
        &self,
        chat_id: &ChatId,
        requester: &UserId,
    ) -> Result<Option<Chat>, RepositoryError> {
        let sql = format!("{CHAT_SELECT} WHERE c.id = ? AND (c.user_low = ? OR c.user_high = ?)");

        let row = sqlx::query(&sql)
            .bind(chat_id.to_string())
            .bind(requester.to_string())
            .bind(requester.to_string())
            .fetch_optional(&self.pool.reader)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        row_to_chat(row)
    }

    async fn mark_seen(
        &self,
        chat_id: &ChatId,
        user_id: &UserId,
    ) -> Result<Option<Chat>, RepositoryError> {
        let mut tx = self
            .pool
            .writer
            .begin()
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        // Membership gate and insert in one statement: nothing is written for
        // outsiders or missing chats.
        sqlx::query(
            r#"INSERT OR IGNORE INTO chat_seen (chat_id, user_id, seen_at)
               SELECT id, ?, ? FROM chats WHERE id = ? AND (user_low = ? OR user_high = ?)"#,
        )
        .bind(user_id.to_string())
        .bind(format_datetime(&Utc::now()))
        .bind(chat_id.to_string())
        .bind(user_id.to_string())
        .bind(user_id.to_string())
        .execute(&mut *tx)
        .await
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

        let sql = format!("{CHAT_SELECT} WHERE c.id = ? AND (c.user_low = ? OR c.user_high = ?)");
        let row = sqlx::query(&sql)
            .bind(chat_id.to_string())
            .bind(user_id.to_string())
            .bind(user_id.to_string())
            .fetch_optional(&mut *tx)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        tx.commit()
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        row_to_chat(row)
    }

    async fn reset_seen(&self, chat_id: &ChatId, user_id: &UserId) -> Result<(), RepositoryError> {
        let mut tx = self
            .pool
            .writer
            .begin()
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        let row = sqlx::query("SELECT user_low, user_high FROM chats WHERE id = ?")
            .bind(chat_id.to_string())
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
        let user = user_id.to_string();
        if user != low && user != high {
            return Err(RepositoryError::NotParticipant);
        }

        sqlx::query("DELETE FROM chat_seen WHERE chat_id = ?")
            .bind(chat_id.to_string())
            .execute(&mut *tx)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        sqlx::query("INSERT INTO chat_seen (chat_id, user_id, seen_at) VALUES (?, ?, ?)")
            .bind(chat_id.to_string())
            .bind(&user)
            .bind(format_datetime(&Utc::now()))
            .execute(&mut *tx)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        tx.commit()
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        Ok(())
    }

    async fn count_unseen(&self, user_id: &UserId) -> Result<u64, RepositoryError> {
        let row = sqlx::query(
            r#"SELECT COUNT(*) AS cnt FROM chats c
               WHERE (c.user_low = ? OR c.user_high = ?)
                 AND NOT EXISTS (SELECT 1 FROM chat_seen s WHERE s.chat_id = c.id AND s.user_id = ?)"#,
        )
        .bind(user_id.to_string())
        .bind(user_id.to_string())
        .bind(user_id.to_string())
        .fetch_one(&self.pool.reader)
        .await
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

        let count: i64 = row
            .try_get("cnt")
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        Ok(count as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sqlite::pool::{default_database_url, DatabasePool};

    async fn test_pool() -> DatabasePool {
        let dir = tempfile::tempdir().unwrap();
        let url = default_database_url(dir.path());
        // Leak tempdir so it lives for the test
        std::mem::forget(dir);
        DatabasePool::new(&url).await.unwrap()
    }

    fn make_chat(a: UserId, b: UserId) -> Chat {
        Chat::new(ParticipantPair::new(a, b).unwrap())
    }

    #[tokio::test]
    async fn test_create_and_find_by_pair() {
        let repo = SqliteChatRepository::new(test_pool().await);
        let a = UserId::new();
        let b = UserId::new();

        let chat = make_chat(a, b);
        let created = repo.create(&chat).await.unwrap();
        assert_eq!(created.id, chat.id);
        assert!(created.seen_by.is_empty());

        let reversed = ParticipantPair::new(b, a).unwrap();
        let found = repo.find_by_pair(&reversed).await.unwrap().unwrap();
        assert_eq!(found, chat);

        let stranger = ParticipantPair::new(a, UserId::new()).unwrap();
        assert!(repo.find_by_pair(&stranger).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_pair_conflicts() {
        let repo = SqliteChatRepository::new(test_pool().await);
        let a = UserId::new();
        let b = UserId::new();

        repo.create(&make_chat(a, b)).await.unwrap();
        let err = repo.create(&make_chat(b, a)).await.unwrap_err();
        assert!(matches!(err, RepositoryError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_list_for_user_newest_first_and_scoped() {
        let repo = SqliteChatRepository::new(test_pool().await);
        let me = UserId::new();

        let mut ids = Vec::new();
        for _ in 0..3 {
            let chat = make_chat(me, UserId::new());
            repo.create(&chat).await.unwrap();
            ids.push(chat.id);
        }
        repo.create(&make_chat(UserId::new(), UserId::new()))
            .await
            .unwrap();

        let listed = repo.list_for_user(&me).await.unwrap();
        assert_eq!(listed.len(), 3);
        assert!(listed.iter().all(|c| c.is_participant(&me)));
        assert!(listed.windows(2).all(|w| w[0].created_at >= w[1].created_at));

        ids.reverse();
        let listed_ids: Vec<ChatId> = listed.iter().map(|c| c.id).collect();
        assert_eq!(listed_ids, ids);
    }

    #[tokio::test]
    async fn test_get_for_participant_hides_from_outsiders() {
        let repo = SqliteChatRepository::new(test_pool().await);
        let a = UserId::new();
        let b = UserId::new();
        let chat = make_chat(a, b);
        repo.create(&chat).await.unwrap();

        assert!(repo.get_for_participant(&chat.id, &a).await.unwrap().is_some());
        assert!(repo.get_for_participant(&chat.id, &b).await.unwrap().is_some());
        assert!(
            repo.get_for_participant(&chat.id, &UserId::new())
                .await
                .unwrap()
                .is_none()
        );
        assert!(
            repo.get_for_participant(&ChatId::new(), &a)
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn test_mark_seen_is_additive_and_idempotent() {
        let repo = SqliteChatRepository::new(test_pool().await);
        let a = UserId::new();
        let b = UserId::new();
        let chat = make_chat(a, b);
        repo.create(&chat).await.unwrap();

        let after_a = repo.mark_seen(&chat.id, &a).await.unwrap().unwrap();
        assert_eq!(after_a.seen_by.len(), 1);

        let after_b = repo.mark_seen(&chat.id, &b).await.unwrap().unwrap();
        assert!(after_b.has_seen(&a));
        assert!(after_b.has_seen(&b));

        let again = repo.mark_seen(&chat.id, &b).await.unwrap().unwrap();
        assert_eq!(again.seen_by.len(), 2);
    }

    #[tokio::test]
    async fn test_mark_seen_ignores_outsiders() {
        let repo = SqliteChatRepository::new(test_pool().await);
        let a = UserId::new();
        let chat = make_chat(a, UserId::new());
        repo.create(&chat).await.unwrap();

        let outsider = UserId::new();
        assert!(repo.mark_seen(&chat.id, &outsider).await.unwrap().is_none());

        let stored = repo.get_for_participant(&chat.id, &a).await.unwrap().unwrap();
        assert!(stored.seen_by.is_empty());
    }

    #[tokio::test]
    async fn test_reset_seen_leaves_only_sender() {
        let repo = SqliteChatRepository::new(test_pool().await);
        let a = UserId::new();
        let b = UserId::new();
        let chat = make_chat(a, b);
        repo.create(&chat).await.unwrap();
        repo.mark_seen(&chat.id, &a).await.unwrap();
        repo.mark_seen(&chat.id, &b).await.unwrap();

        repo.reset_seen(&chat.id, &b).await.unwrap();

        let stored = repo.get_for_participant(&chat.id, &a).await.unwrap().unwrap();
        assert_eq!(stored.seen_by.into_iter().collect::<Vec<_>>(), vec![b]);
    }

    #[tokio::test]
    async fn test_reset_seen_errors() {
        let repo = SqliteChatRepository::new(test_pool().await);
        let chat = make_chat(UserId::new(), UserId::new());
        repo.create(&chat).await.unwrap();

        let err = repo.reset_seen(&ChatId::new(), &UserId::new()).await.unwrap_err();
        assert!(matches!(err, RepositoryError::NotFound));

        let err = repo.reset_seen(&chat.id, &UserId::new()).await.unwrap_err();
        assert!(matches!(err, RepositoryError::NotParticipant));
    }

    #[tokio::test]
    async fn test_count_unseen() {
        let repo = SqliteChatRepository::new(test_pool().await);
        let me = UserId::new();
        let first = make_chat(me, UserId::new());
        let second = make_chat(me, UserId::new());
        repo.create(&first).await.unwrap();
        repo.create(&second).await.unwrap();

        assert_eq!(repo.count_unseen(&me).await.unwrap(), 2);

        repo.mark_seen(&first.id, &me).await.unwrap();
        assert_eq!(repo.count_unseen(&me).await.unwrap(), 1);

        assert_eq!(repo.count_unseen(&UserId::new()).await.unwrap(), 0);
    }
}
