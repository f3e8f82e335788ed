use crate::application_port::{
    AccountService, AuthError, CredentialHasher, LoginInput, SessionService, SignupInput,
    SignupResult, TokenPair,
};
use crate::domain_port::UserRepo;
use argon2::password_hash::rand_core::OsRng;
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use std::sync::Arc;

pub struct Argon2PasswordHasher;

#[async_trait::async_trait]
impl CredentialHasher for Argon2PasswordHasher {
    async fn hash_password(&self, password: &str) -> Result<String, AuthError> {
        let salt = argon2::password_hash::SaltString::generate(&mut OsRng);
        let argon2 = argon2::Argon2::default();
        let hash = argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| AuthError::Internal(e.to_string()))?
            .to_string();
        Ok(hash)
    }

    async fn verify_password(
        &self,
        password: &str,
        password_hash: &str,
    ) -> Result<bool, AuthError> {
        let parsed = PasswordHash::new(password_hash)
            .map_err(|e| AuthError::Internal(format!("invalid PHC hash: {}", e)))?;

        match Argon2::default().verify_password(password.as_bytes(), &parsed) {
            Ok(_) => Ok(true),
            Err(argon2::password_hash::Error::Password) => Ok(false),
            Err(e) => Err(AuthError::Internal(format!("verify error: {}", e))),
        }
    }
}

pub struct RealAccountService {
    user_repo: Arc<dyn UserRepo>,
    credential_hasher: Arc<dyn CredentialHasher>,
    sessions: Arc<dyn SessionService>,
}

impl RealAccountService {
    pub fn new(
        user_repo: Arc<dyn UserRepo>,
        credential_hasher: Arc<dyn CredentialHasher>,
        sessions: Arc<dyn SessionService>,
    ) -> Self {
        Self {
            user_repo,
            credential_hasher,
            sessions,
        }
    }
}

#[async_trait::async_trait]
impl AccountService for RealAccountService {
    async fn signup(&self, request: SignupInput) -> Result<SignupResult, AuthError> {
        let SignupInput { email, password } = request;

        let password_hash = self.credential_hasher.hash_password(&password).await?;
        let record = self.user_repo.create(&email, &password_hash).await?;

        Ok(SignupResult {
            user_id: record.user_id,
            email: record.email,
        })
    }

    async fn login(&self, request: LoginInput) -> Result<TokenPair, AuthError> {
        let LoginInput { email, password } = request;

        // An unknown email and a wrong password are indistinguishable to the
        // caller.
        let record = self
            .user_repo
            .find_by_email(&email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        let ok = self
            .credential_hasher
            .verify_password(&password, &record.password_hash)
            .await?;
        if !ok {
            return Err(AuthError::InvalidCredentials);
        }

        self.sessions.issue(record.user_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application_port::{AccessToken, RefreshToken};
    use crate::domain_model::UserId;
    use crate::domain_port::UserRecord;
    use assert_matches::assert_matches;
    use chrono::Utc;
    use dashmap::DashMap;

    #[derive(Default)]
    struct MemoryUserRepo {
        users: DashMap<String, UserRecord>,
    }

    #[async_trait::async_trait]
    impl UserRepo for MemoryUserRepo {
        async fn create(&self, email: &str, password_hash: &str) -> Result<UserRecord, AuthError> {
            if self.users.contains_key(email) {
                return Err(AuthError::EmailTaken);
            }
            let record = UserRecord {
                user_id: UserId(self.users.len() as i32 + 1),
                email: email.to_string(),
                password_hash: password_hash.to_string(),
                created_at: Utc::now(),
            };
            self.users.insert(email.to_string(), record.clone());
            Ok(record)
        }

        async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>, AuthError> {
            Ok(self.users.get(email).map(|e| e.value().clone()))
        }
    }

    /// Session stub that mints recognizable tokens without any store.
    struct StubSessionService;

    #[async_trait::async_trait]
    impl SessionService for StubSessionService {
        async fn issue(&self, user_id: UserId) -> Result<TokenPair, AuthError> {
            Ok(TokenPair {
                access_token: AccessToken(format!("access-{user_id}")),
                refresh_token: RefreshToken(format!("refresh-{user_id}")),
                expires_in: 900,
            })
        }

        async fn validate_access(&self, _token: &str) -> Result<UserId, AuthError> {
            Err(AuthError::Malformed)
        }

        async fn refresh(&self, _refresh_token: &str) -> Result<TokenPair, AuthError> {
            Err(AuthError::Malformed)
        }

        async fn revoke(&self, _refresh_token: &str) -> Result<(), AuthError> {
            Ok(())
        }
    }

    fn service() -> (RealAccountService, Arc<MemoryUserRepo>) {
        let repo = Arc::new(MemoryUserRepo::default());
        let service = RealAccountService::new(
            repo.clone(),
            Arc::new(Argon2PasswordHasher),
            Arc::new(StubSessionService),
        );
        (service, repo)
    }

    #[tokio::test]
    async fn signup_stores_a_verifiable_hash_not_the_password() {
        let (service, repo) = service();

        let result = service
            .signup(SignupInput {
                email: "user@example.com".to_string(),
                password: "123456".to_string(),
            })
            .await
            .expect("signup should succeed");
        assert_eq!(result.email, "user@example.com");

        let stored = repo.users.get("user@example.com").expect("row exists");
        assert_ne!(stored.password_hash, "123456");
        let ok = Argon2PasswordHasher
            .verify_password("123456", &stored.password_hash)
            .await
            .expect("hash should parse");
        assert!(ok);
    }

    #[tokio::test]
    async fn duplicate_signup_conflicts() {
        let (service, _) = service();

        let input = SignupInput {
            email: "exists@example.com".to_string(),
            password: "123456".to_string(),
        };
        service.signup(input.clone()).await.expect("first signup");
        assert_matches!(service.signup(input).await, Err(AuthError::EmailTaken));
    }

    #[tokio::test]
    async fn login_issues_tokens_for_valid_credentials() {
        let (service, _) = service();

        service
            .signup(SignupInput {
                email: "me@example.com".to_string(),
                password: "mypassword".to_string(),
            })
            .await
            .expect("signup");

        let pair = service
            .login(LoginInput {
                email: "me@example.com".to_string(),
                password: "mypassword".to_string(),
            })
            .await
            .expect("login should succeed");
        assert_eq!(pair.access_token.0, "access-1");
        assert_eq!(pair.expires_in, 900);
    }

    #[tokio::test]
    async fn login_rejects_wrong_password_and_unknown_email_alike() {
        let (service, _) = service();

        service
            .signup(SignupInput {
                email: "me@example.com".to_string(),
                password: "mypassword".to_string(),
            })
            .await
            .expect("signup");

        assert_matches!(
            service
                .login(LoginInput {
                    email: "me@example.com".to_string(),
                    password: "wrong".to_string(),
                })
                .await,
            Err(AuthError::InvalidCredentials)
        );
        assert_matches!(
            service
                .login(LoginInput {
                    email: "nobody@example.com".to_string(),
                    password: "mypassword".to_string(),
                })
                .await,
            Err(AuthError::InvalidCredentials)
        );
    }
}
