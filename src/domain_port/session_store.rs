use crate::application_port::AuthError;
use crate::domain_model::{SessionId, UserId};

/// The authority on whether a refresh token is still usable. Entries carry a
/// TTL and self-expire in the backing store; the core performs no sweeping of
/// its own.
#[async_trait::async_trait]
pub trait RefreshSessionStore: Send + Sync {
    /// Store or overwrite the session -> owning-user mapping with a TTL.
    async fn put(
        &self,
        session_id: &SessionId,
        user_id: UserId,
        ttl_secs: u64,
    ) -> Result<(), AuthError>;
    /// Resolve the owning user; `None` when the entry is absent or expired.
    async fn get(&self, session_id: &SessionId) -> Result<Option<UserId>, AuthError>;
    /// Idempotent removal; deleting a missing key is not an error.
    async fn delete(&self, session_id: &SessionId) -> Result<(), AuthError>;
}
