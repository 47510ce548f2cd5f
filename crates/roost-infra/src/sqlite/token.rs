//! Opaque access tokens backing the `IdentityResolver` port.
//!
//! Tokens are `roost_` followed by 64 random hex characters. Only their
//! SHA-256 digest is stored, so a leaked database does not leak credentials.

use chrono::{DateTime, SubsecRound, Utc};
use roost_core::repository::identity::IdentityResolver;
use roost_types::error::RepositoryError;
use roost_types::user::UserId;
use sha2::{Digest, Sha256};
use sqlx::Row;
use uuid::Uuid;

use super::pool::DatabasePool;
use super::{format_datetime, parse_datetime, parse_uuid};

const TOKEN_PREFIX: &str = "roost_";

/// SHA-256 hex digest of a raw token.
pub fn hash_token(token: &str) -> String {
    let digest = Sha256::digest(token.as_bytes());
    digest.iter().map(|b| format!("{b:02x}")).collect()
}

fn generate_token() -> String {
    format!(
        "{TOKEN_PREFIX}{}{}",
        Uuid::new_v4().simple(),
        Uuid::new_v4().simple()
    )
}

/// SQLite-backed token store.
#[derive(Clone)]
pub struct SqliteTokenStore {
    pool: DatabasePool,
}

impl SqliteTokenStore {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }

    /// Issue a new token for `user_id` and return it in plaintext.
    ///
    /// The plaintext is never stored; callers must hand it to the user now.
    /// Returns `NotFound` if the user does not exist.
    pub async fn issue(&self, user_id: &UserId) -> Result<String, RepositoryError> {
        let token = generate_token();

        let result = sqlx::query(
            r#"INSERT INTO access_tokens (id, user_id, token_hash, created_at)
               VALUES (?, ?, ?, ?)"#,
        )
        .bind(Uuid::now_v7().to_string())
        .bind(user_id.to_string())
        .bind(hash_token(&token))
        .bind(format_datetime(&Utc::now().trunc_subsecs(6)))
        .execute(&self.pool.writer)
        .await;

        match result {
            Ok(_) => {
                tracing::info!(user_id = %user_id, "access token issued");
                Ok(token)
            }
            Err(sqlx::Error::Database(db_err)) if db_err.message().contains("FOREIGN KEY") => {
                Err(RepositoryError::NotFound)
            }
            Err(e) => Err(RepositoryError::Query(e.to_string())),
        }
    }

    /// Delete every token belonging to `user_id`. Returns how many were removed.
    pub async fn revoke_all(&self, user_id: &UserId) -> Result<u64, RepositoryError> {
        let result = sqlx::query("DELETE FROM access_tokens WHERE user_id = ?")
            .bind(user_id.to_string())
            .execute(&self.pool.writer)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        Ok(result.rows_affected())
    }
}

/// `last_used_at` is refreshed at most this often, keeping reads off the writer.
const TOUCH_INTERVAL_SECS: i64 = 60;

fn needs_touch(last_used_at: Option<&str>, now: DateTime<Utc>) -> bool {
    match last_used_at.map(parse_datetime) {
        Some(Ok(last)) => now - last >= chrono::Duration::seconds(TOUCH_INTERVAL_SECS),
        _ => true,
    }
}

impl IdentityResolver for SqliteTokenStore {
    async fn resolve(&self, credential: &str) -> Result<Option<UserId>, RepositoryError> {
        if !credential.starts_with(TOKEN_PREFIX) {
            return Ok(None);
        }

        let hash = hash_token(credential);
        let row = sqlx::query("SELECT user_id, last_used_at FROM access_tokens WHERE token_hash = ?")
            .bind(&hash)
            .fetch_optional(&self.pool.reader)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        let Some(row) = row else {
            return Ok(None);
        };
        let user_id: String = row
            .try_get("user_id")
            .map_err(|e| RepositoryError::Query(e.to_string()))?;
        let last_used_at: Option<String> = row
            .try_get("last_used_at")
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        let now = Utc::now();
        if needs_touch(last_used_at.as_deref(), now) {
            // Best-effort; a failed touch must not reject a valid credential.
            if let Err(e) =
                sqlx::query("UPDATE access_tokens SET last_used_at = ? WHERE token_hash = ?")
                    .bind(format_datetime(&now))
                    .bind(&hash)
                    .execute(&self.pool.writer)
                    .await
            {
                tracing::debug!(error = %e, "failed to record token use");
            }
        }

        Ok(Some(UserId(parse_uuid(&user_id)?)))
    }
}
