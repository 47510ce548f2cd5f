//! User directory port.

use roost_types::error::RepositoryError;
use roost_types::user::{UserId, UserProfile};

/// Read-only point lookups of user profiles.
///
/// Profile CRUD belongs to the profile service; the messaging layer only
/// needs to confirm a user exists and display their projection.
pub trait UserDirectory: Send + Sync {
    fn lookup(
        &self,
        user_id: &UserId,
    ) -> impl std::future::Future<Output = Result<Option<UserProfile>, RepositoryError>> + Send;
}
