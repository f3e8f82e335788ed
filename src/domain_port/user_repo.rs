use crate::application_port::AuthError;
use crate::domain_model::UserId;
use chrono::{DateTime, Utc};

#[derive(Debug, Clone)]
pub struct UserRecord {
    pub user_id: UserId,
    pub email: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

#[async_trait::async_trait]
pub trait UserRepo: Send + Sync {
    /// Insert a user row; a duplicate email yields `EmailTaken`.
    async fn create(&self, email: &str, password_hash: &str) -> Result<UserRecord, AuthError>;

    /// Fetch a user by email (for login).
    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>, AuthError>;
}
