use crate::application_port::{
    AccessToken, AccountService, AuthError, LoginInput, RefreshToken, SessionService, SignupInput,
    SignupResult, TokenPair,
};
use crate::domain_model::UserId;

#[derive(Debug)]
pub struct FakeSessionService;

impl FakeSessionService {
    pub fn new() -> Self {
        Self
    }
}

// Minimal fake implementation for basic use only.
// Extend to simulate more error cases and configurable responses when needed.
#[async_trait::async_trait]
impl SessionService for FakeSessionService {
    async fn issue(&self, user_id: UserId) -> Result<TokenPair, AuthError> {
        Ok(fake_token_pair(user_id))
    }

    async fn validate_access(&self, token: &str) -> Result<UserId, AuthError> {
        match token.strip_prefix("fake-access-token:") {
            Some(id) => id.parse::<UserId>().map_err(|_| AuthError::Malformed),
            None => Err(AuthError::InvalidSignature),
        }
    }

    async fn refresh(&self, refresh_token: &str) -> Result<TokenPair, AuthError> {
        match refresh_token.strip_prefix("fake-refresh-token:") {
            Some(id) => {
                let user_id = id.parse::<UserId>().map_err(|_| AuthError::Malformed)?;
                Ok(fake_token_pair(user_id))
            }
            None => Err(AuthError::InvalidSignature),
        }
    }

    async fn revoke(&self, _refresh_token: &str) -> Result<(), AuthError> {
        Ok(())
    }
}

#[derive(Debug)]
pub struct FakeAccountService;

impl FakeAccountService {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait::async_trait]
impl AccountService for FakeAccountService {
    async fn signup(&self, request: SignupInput) -> Result<SignupResult, AuthError> {
        Ok(SignupResult {
            user_id: fake_user_id(&request.email),
            email: request.email,
        })
    }

    async fn login(&self, request: LoginInput) -> Result<TokenPair, AuthError> {
        Ok(fake_token_pair(fake_user_id(&request.email)))
    }
}

/// Stable id derived from the email so repeated logins agree.
fn fake_user_id(email: &str) -> UserId {
    let mut id: i32 = 0;
    for b in email.bytes() {
        id = id.wrapping_mul(31).wrapping_add(b as i32);
    }
    UserId(id & i32::MAX)
}

fn fake_token_pair(user_id: UserId) -> TokenPair {
    TokenPair {
        access_token: AccessToken(format!("fake-access-token:{user_id}")),
        refresh_token: RefreshToken(format!("fake-refresh-token:{user_id}")),
        expires_in: 900,
    }
}
