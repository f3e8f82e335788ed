use crate::application_port::{AuthError, TokenPair};
use crate::domain_model::UserId;

#[derive(Debug, Clone)]
pub struct SignupInput {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone)]
pub struct LoginInput {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone)]
pub struct SignupResult {
    pub user_id: UserId,
    pub email: String,
}

#[async_trait::async_trait]
pub trait CredentialHasher: Send + Sync {
    async fn hash_password(&self, password: &str) -> Result<String, AuthError>;
    async fn verify_password(&self, password: &str, password_hash: &str)
    -> Result<bool, AuthError>;
}

/// Thin credential flows in front of the session core: signup stores a hashed
/// password, login verifies one and delegates issuance to the SessionService.
#[async_trait::async_trait]
pub trait AccountService: Send + Sync {
    async fn signup(&self, request: SignupInput) -> Result<SignupResult, AuthError>;
    async fn login(&self, request: LoginInput) -> Result<TokenPair, AuthError>;
}
