use thiserror::Error;

/// Errors surfaced by the messaging operations.
///
/// Each variant maps to a distinct outward status so clients can branch on
/// the kind without parsing messages.
#[derive(Debug, Error)]
pub enum ChatError {
    #[error("authentication required")]
    Unauthenticated,

    #[error("caller is not a participant of this chat")]
    Forbidden,

    #[error("chat not found")]
    NotFound,

    #[error("user not found")]
    UserNotFound,

    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("storage error: {0}")]
    Storage(String),
}

impl From<RepositoryError> for ChatError {
    fn from(e: RepositoryError) -> Self {
        match e {
            RepositoryError::NotFound => ChatError::NotFound,
            RepositoryError::NotParticipant => ChatError::Forbidden,
            RepositoryError::Conflict(msg) => ChatError::Conflict(msg),
            other => ChatError::Storage(other.to_string()),
        }
    }
}

/// Errors from repository operations (used by trait definitions in roost-core).
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database connection error")]
    Connection,

    #[error("query error: {0}")]
    Query(String),

    #[error("entity not found")]
    NotFound,

    #[error("user is not a participant")]
    NotParticipant,

    #[error("conflict: {0}")]
    Conflict(String),
}
