//! Identity resolver port.

use roost_types::error::RepositoryError;
use roost_types::user::UserId;

/// Maps a request credential to the caller's user id.
///
/// Returns `Ok(None)` for unknown or revoked credentials; the HTTP layer
/// turns that into `Unauthenticated`.
pub trait IdentityResolver: Send + Sync {
    fn resolve(
        &self,
        credential: &str,
    ) -> impl std::future::Future<Output = Result<Option<UserId>, RepositoryError>> + Send;
}
