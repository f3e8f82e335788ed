use crate::domain_model::{SessionId, UserId};
use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("invalid email or password")]
    InvalidCredentials,
    #[error("user already exists")]
    EmailTaken,
    #[error("malformed token")]
    Malformed,
    #[error("invalid token signature")]
    InvalidSignature,
    #[error("token expired")]
    Expired,
    #[error("session revoked or unknown")]
    SessionRevoked,
    #[error("session subject mismatch")]
    SessionMismatch,
    #[error("session store unavailable: {0}")]
    StoreUnavailable(String),
    #[error("token issuance failed: {0}")]
    IssuanceFailed(String),
    #[error("internal error: {0}")]
    Internal(String),
}

#[derive(Debug, Clone, Serialize)]
pub struct AccessToken(pub String);

#[derive(Debug, Clone, Serialize)]
pub struct RefreshToken(pub String);

/// The pair handed to clients on login and on every rotation.
/// `expires_in` is the access token lifetime in seconds.
#[derive(Debug, Clone, Serialize)]
pub struct TokenPair {
    pub access_token: AccessToken,
    pub refresh_token: RefreshToken,
    pub expires_in: i64,
}

#[async_trait::async_trait]
pub trait TokenCodec: Send + Sync {
    async fn issue_access(&self, user: UserId)
    -> Result<(AccessToken, DateTime<Utc>), AuthError>;
    /// Signs a refresh assertion embedding a freshly generated session id.
    async fn issue_refresh(
        &self,
        user: UserId,
    ) -> Result<(RefreshToken, SessionId, DateTime<Utc>), AuthError>;
    async fn verify_access(&self, token: &str) -> Result<UserId, AuthError>;
    /// With `allow_expired`, the expiry claim must be present but its value is
    /// not enforced. Signature and structure always are.
    async fn verify_refresh(
        &self,
        token: &str,
        allow_expired: bool,
    ) -> Result<(UserId, SessionId), AuthError>;
}

/// Issuance, validation, rotation, and revocation of token pairs. The only
/// component that writes refresh-session records.
#[async_trait::async_trait]
pub trait SessionService: Send + Sync {
    async fn issue(&self, user_id: UserId) -> Result<TokenPair, AuthError>;
    /// Stateless check of an access token; never touches the session store.
    async fn validate_access(&self, token: &str) -> Result<UserId, AuthError>;
    /// Single-use rotation: consumes the presented token's session and mints
    /// a brand-new pair.
    async fn refresh(&self, refresh_token: &str) -> Result<TokenPair, AuthError>;
    /// Idempotent logout; also accepts a token at or past its expiry.
    async fn revoke(&self, refresh_token: &str) -> Result<(), AuthError>;
}
