//! SQLite user directory.
//!
//! Backs the `UserDirectory` port with the local `users` table. `create` and
//! `list` exist for the CLI's development seeding; profile CRUD proper is
//! owned by the profile service.

use chrono::SubsecRound;
use roost_core::repository::user::UserDirectory;
use roost_types::error::RepositoryError;
use roost_types::user::{NewUser, UserId, UserProfile};
use sqlx::Row;

use super::pool::DatabasePool;
use super::{format_datetime, is_unique_violation, parse_datetime, parse_uuid};

/// SQLite-backed implementation of `UserDirectory`.
#[derive(Clone)]
pub struct SqliteUserDirectory {
    pool: DatabasePool,
}

impl SqliteUserDirectory {
    /// Create a new directory backed by the given database pool.
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }

    /// Register a user. Returns `Conflict` if the email is taken.
    pub async fn create(&self, new_user: &NewUser) -> Result<UserProfile, RepositoryError> {
        let profile = UserProfile {
            id: UserId::new(),
            phone: new_user.phone.trim().to_string(),
            avatar: new_user.avatar.clone(),
            email: new_user.email.trim().to_lowercase(),
            created_at: chrono::Utc::now().trunc_subsecs(6),
        };

        let result = sqlx::query(
            "INSERT INTO users (id, phone, avatar, email, created_at) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(profile.id.to_string())
        .bind(&profile.phone)
        .bind(&profile.avatar)
        .bind(&profile.email)
        .bind(format_datetime(&profile.created_at))
        .execute(&self.pool.writer)
        .await;

        match result {
            Ok(_) => Ok(profile),
            Err(e) if is_unique_violation(&e) => Err(RepositoryError::Conflict(format!(
                "email '{}' already registered",
                profile.email
            ))),
            Err(e) => Err(RepositoryError::Query(e.to_string())),
        }
    }

    /// All users, oldest first.
    pub async fn list(&self) -> Result<Vec<UserProfile>, RepositoryError> {
        let rows = sqlx::query("SELECT * FROM users ORDER BY created_at ASC")
            .fetch_all(&self.pool.reader)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        rows.iter().map(row_to_profile).collect()
    }
}

fn row_to_profile(row: &sqlx::sqlite::SqliteRow) -> Result<UserProfile, RepositoryError> {
    let get = |col: &str| -> Result<String, RepositoryError> {
        row.try_get(col)
            .map_err(|e| RepositoryError::Query(e.to_string()))
    };

    Ok(UserProfile {
        id: UserId(parse_uuid(&get("id")?)?),
        phone: get("phone")?,
        avatar: row
            .try_get("avatar")
            .map_err(|e| RepositoryError::Query(e.to_string()))?,
        email: get("email")?,
        created_at: parse_datetime(&get("created_at")?)?,
    })
}

impl UserDirectory for SqliteUserDirectory {
    async fn lookup(&self, user_id: &UserId) -> Result<Option<UserProfile>, RepositoryError> {
        let row = sqlx::query("SELECT * FROM users WHERE id = ?")
            .bind(user_id.to_string())
            .fetch_optional(&self.pool.reader)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        row.as_ref().map(row_to_profile).transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sqlite::pool::default_database_url;

    async fn test_directory() -> SqliteUserDirectory {
        let dir = tempfile::tempdir().unwrap();
        let url = default_database_url(dir.path());
        std::mem::forget(dir);
        SqliteUserDirectory::new(DatabasePool::new(&url).await.unwrap())
    }

    fn new_user(email: &str) -> NewUser {
        NewUser {
            phone: " +15550100 ".to_string(),
            email: email.to_string(),
            avatar: None,
        }
    }

    #[tokio::test]
    async fn test_create_and_lookup() {
        let users = test_directory().await;

        let created = users.create(&new_user("Ada@Example.com")).await.unwrap();
        assert_eq!(created.phone, "+15550100");
        assert_eq!(created.email, "ada@example.com");

        let found = users.lookup(&created.id).await.unwrap().unwrap();
        assert_eq!(found.id, created.id);
        assert_eq!(found.email, "ada@example.com");
        assert!(found.avatar.is_none());

        assert!(users.lookup(&UserId::new()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_email_conflicts() {
        let users = test_directory().await;
        users.create(&new_user("dup@example.com")).await.unwrap();

        let err = users.create(&new_user("DUP@example.com")).await.unwrap_err();
        assert!(matches!(err, RepositoryError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_list_users() {
        let users = test_directory().await;
        users.create(&new_user("one@example.com")).await.unwrap();
        users.create(&new_user("two@example.com")).await.unwrap();

        let all = users.list().await.unwrap();
        assert_eq!(all.len(), 2);
    }
}
