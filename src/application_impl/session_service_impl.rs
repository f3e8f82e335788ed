use crate::application_port::{
    AccessToken, AuthError, RefreshToken, SessionService, TokenCodec, TokenPair,
};
use crate::domain_model::{SessionId, UserId};
use crate::domain_port::RefreshSessionStore;
use chrono::{DateTime, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

/// Immutable signing configuration, built once at startup and injected.
/// Access and refresh tokens are signed with independent secrets, so leaking
/// one class of token never lets an attacker forge the other.
#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub access_secret: Vec<u8>,
    pub refresh_secret: Vec<u8>,
    pub access_ttl: Duration,
    pub refresh_ttl: Duration,
}

#[derive(Debug, Serialize, Deserialize)]
struct AccessClaims {
    sub: i32, // user id
    iat: i64,
    exp: i64,
}

#[derive(Debug, Serialize, Deserialize)]
struct RefreshClaims {
    sub: i32, // user id
    iat: i64,
    exp: i64,
    jti: String, // session identifier, the store lookup key
}

fn encode_access(uid: UserId, cfg: &JwtConfig) -> Result<(AccessToken, DateTime<Utc>), AuthError> {
    let iat_dt = Utc::now();
    let exp_dt = iat_dt + cfg.access_ttl;
    let claims = AccessClaims {
        sub: uid.0,
        iat: iat_dt.timestamp(),
        exp: exp_dt.timestamp(),
    };
    let token = encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(&cfg.access_secret),
    )
    .map_err(|e| AuthError::IssuanceFailed(e.to_string()))?;
    Ok((AccessToken(token), exp_dt))
}

fn encode_refresh(
    uid: UserId,
    jti: &SessionId,
    cfg: &JwtConfig,
) -> Result<(RefreshToken, DateTime<Utc>), AuthError> {
    let iat_dt = Utc::now();
    let exp_dt = iat_dt + cfg.refresh_ttl;
    let claims = RefreshClaims {
        sub: uid.0,
        iat: iat_dt.timestamp(),
        exp: exp_dt.timestamp(),
        jti: jti.0.clone(),
    };
    let token = encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(&cfg.refresh_secret),
    )
    .map_err(|e| AuthError::IssuanceFailed(e.to_string()))?;
    Ok((RefreshToken(token), exp_dt))
}

fn strict_validation() -> Validation {
    let mut v = Validation::new(Algorithm::HS256);
    v.validate_exp = true;
    v.leeway = 0;
    v
}

fn map_decode_err(e: jsonwebtoken::errors::Error) -> AuthError {
    match e.kind() {
        ErrorKind::ExpiredSignature => AuthError::Expired,
        ErrorKind::InvalidSignature => AuthError::InvalidSignature,
        _ => AuthError::Malformed,
    }
}

fn decode_access(token: &str, cfg: &JwtConfig) -> Result<AccessClaims, AuthError> {
    let data = decode::<AccessClaims>(
        token,
        &DecodingKey::from_secret(&cfg.access_secret),
        &strict_validation(),
    )
    .map_err(map_decode_err)?;
    Ok(data.claims)
}

fn decode_refresh(
    token: &str,
    cfg: &JwtConfig,
    allow_expired: bool,
) -> Result<RefreshClaims, AuthError> {
    let mut v = strict_validation();
    if allow_expired {
        // exp must still be present, its value is just not enforced
        v.validate_exp = false;
    }
    let data = decode::<RefreshClaims>(token, &DecodingKey::from_secret(&cfg.refresh_secret), &v)
        .map_err(map_decode_err)?;
    Ok(data.claims)
}

pub struct JwtTokenCodec {
    cfg: JwtConfig,
}

impl JwtTokenCodec {
    pub fn new(cfg: JwtConfig) -> Self {
        JwtTokenCodec { cfg }
    }
}

#[async_trait::async_trait]
impl TokenCodec for JwtTokenCodec {
    async fn issue_access(
        &self,
        user: UserId,
    ) -> Result<(AccessToken, DateTime<Utc>), AuthError> {
        encode_access(user, &self.cfg)
    }

    async fn issue_refresh(
        &self,
        user: UserId,
    ) -> Result<(RefreshToken, SessionId, DateTime<Utc>), AuthError> {
        let session_id = SessionId::generate();
        let (token, exp_dt) = encode_refresh(user, &session_id, &self.cfg)?;
        Ok((token, session_id, exp_dt))
    }

    async fn verify_access(&self, token: &str) -> Result<UserId, AuthError> {
        let claims = decode_access(token, &self.cfg)?;
        Ok(UserId(claims.sub))
    }

    async fn verify_refresh(
        &self,
        token: &str,
        allow_expired: bool,
    ) -> Result<(UserId, SessionId), AuthError> {
        let claims = decode_refresh(token, &self.cfg, allow_expired)?;
        Ok((UserId(claims.sub), SessionId(claims.jti)))
    }
}

pub struct RealSessionService {
    token_codec: Arc<dyn TokenCodec>,
    session_store: Arc<dyn RefreshSessionStore>,
    access_ttl_secs: i64,
}

impl RealSessionService {
    pub fn new(
        token_codec: Arc<dyn TokenCodec>,
        session_store: Arc<dyn RefreshSessionStore>,
        access_ttl: Duration,
    ) -> Self {
        Self {
            token_codec,
            session_store,
            access_ttl_secs: access_ttl.as_secs() as i64,
        }
    }

    fn ttl_secs(until: DateTime<Utc>) -> u64 {
        let secs = (until - Utc::now()).num_seconds();
        if secs <= 0 { 1 } else { secs as u64 }
    }
}

#[async_trait::async_trait]
impl SessionService for RealSessionService {
    async fn issue(&self, user_id: UserId) -> Result<TokenPair, AuthError> {
        let (access_token, _access_exp) = self.token_codec.issue_access(user_id).await?;
        let (refresh_token, session_id, refresh_exp) =
            self.token_codec.issue_refresh(user_id).await?;

        // A refresh token must never leave here without a backing session
        // record; on a failed write the minted pair is discarded.
        self.session_store
            .put(&session_id, user_id, Self::ttl_secs(refresh_exp))
            .await
            .map_err(|e| AuthError::IssuanceFailed(e.to_string()))?;

        Ok(TokenPair {
            access_token,
            refresh_token,
            expires_in: self.access_ttl_secs,
        })
    }

    async fn validate_access(&self, token: &str) -> Result<UserId, AuthError> {
        self.token_codec.verify_access(token).await
    }

    async fn refresh(&self, refresh_token: &str) -> Result<TokenPair, AuthError> {
        let (user_id, session_id) = self.token_codec.verify_refresh(refresh_token, false).await?;

        let stored = self
            .session_store
            .get(&session_id)
            .await?
            .ok_or(AuthError::SessionRevoked)?;
        if stored != user_id {
            // A stored owner that disagrees with the signed subject means the
            // record is stale or corrupted; drop it and fail closed.
            self.session_store.delete(&session_id).await?;
            return Err(AuthError::SessionMismatch);
        }

        // Single use: consume the old session before minting the next pair.
        // If `issue` fails past this point the caller ends up fully logged
        // out rather than holding two live sessions.
        self.session_store.delete(&session_id).await?;
        self.issue(user_id).await
    }

    async fn revoke(&self, refresh_token: &str) -> Result<(), AuthError> {
        // Logout must also work for a token at or past its expiry.
        let (_user_id, session_id) = self.token_codec.verify_refresh(refresh_token, true).await?;
        self.session_store.delete(&session_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use dashmap::DashMap;

    /// In-memory stand-in for the session store. TTLs are recorded by the
    /// caller but not enforced; clock-driven expiry is covered at the token
    /// level.
    #[derive(Default)]
    struct MemorySessionStore {
        entries: DashMap<String, UserId>,
    }

    #[async_trait::async_trait]
    impl RefreshSessionStore for MemorySessionStore {
        async fn put(
            &self,
            session_id: &SessionId,
            user_id: UserId,
            _ttl_secs: u64,
        ) -> Result<(), AuthError> {
            self.entries.insert(session_id.0.clone(), user_id);
            Ok(())
        }

        async fn get(&self, session_id: &SessionId) -> Result<Option<UserId>, AuthError> {
            Ok(self.entries.get(&session_id.0).map(|e| *e.value()))
        }

        async fn delete(&self, session_id: &SessionId) -> Result<(), AuthError> {
            self.entries.remove(&session_id.0);
            Ok(())
        }
    }

    /// A store whose writes always fail, for the fail-closed issuance path.
    struct UnavailableStore;

    #[async_trait::async_trait]
    impl RefreshSessionStore for UnavailableStore {
        async fn put(&self, _: &SessionId, _: UserId, _: u64) -> Result<(), AuthError> {
            Err(AuthError::StoreUnavailable("connection refused".to_string()))
        }

        async fn get(&self, _: &SessionId) -> Result<Option<UserId>, AuthError> {
            Err(AuthError::StoreUnavailable("connection refused".to_string()))
        }

        async fn delete(&self, _: &SessionId) -> Result<(), AuthError> {
            Err(AuthError::StoreUnavailable("connection refused".to_string()))
        }
    }

    fn test_config() -> JwtConfig {
        JwtConfig {
            access_secret: b"access-secret-for-tests".to_vec(),
            refresh_secret: b"refresh-secret-for-tests".to_vec(),
            access_ttl: Duration::from_secs(60),
            refresh_ttl: Duration::from_secs(3600),
        }
    }

    fn service_with(
        cfg: JwtConfig,
    ) -> (RealSessionService, Arc<MemorySessionStore>, Arc<JwtTokenCodec>) {
        let access_ttl = cfg.access_ttl;
        let codec = Arc::new(JwtTokenCodec::new(cfg));
        let store = Arc::new(MemorySessionStore::default());
        let service = RealSessionService::new(codec.clone(), store.clone(), access_ttl);
        (service, store, codec)
    }

    #[tokio::test]
    async fn issue_then_validate_access_round_trips() {
        let (service, store, _) = service_with(test_config());

        let pair = service.issue(UserId(42)).await.expect("issue should succeed");
        assert_eq!(pair.expires_in, 60);
        assert_eq!(store.entries.len(), 1);

        let uid = service
            .validate_access(&pair.access_token.0)
            .await
            .expect("freshly issued access token should validate");
        assert_eq!(uid, UserId(42));
    }

    #[tokio::test]
    async fn refresh_rotates_and_consumes_the_old_session() {
        let (service, _, _) = service_with(test_config());

        let pair = service.issue(UserId(42)).await.expect("issue should succeed");
        let rotated = service
            .refresh(&pair.refresh_token.0)
            .await
            .expect("first refresh should succeed");
        assert_ne!(rotated.refresh_token.0, pair.refresh_token.0);

        // replaying the consumed token must fail closed
        assert_matches!(
            service.refresh(&pair.refresh_token.0).await,
            Err(AuthError::SessionRevoked)
        );
    }

    #[tokio::test]
    async fn refresh_with_never_stored_session_is_revoked_not_a_crash() {
        let (service, _, codec) = service_with(test_config());

        // well-formed token whose session was never written (store flushed)
        let (token, _, _) = codec.issue_refresh(UserId(5)).await.expect("sign");
        assert_matches!(service.refresh(&token.0).await, Err(AuthError::SessionRevoked));
    }

    #[tokio::test]
    async fn refresh_with_foreign_session_record_fails_and_drops_it() {
        let (service, store, codec) = service_with(test_config());

        let pair = service.issue(UserId(1)).await.expect("issue should succeed");
        let (_, session_id) = codec
            .verify_refresh(&pair.refresh_token.0, false)
            .await
            .expect("verify");

        // simulate a record surviving a key collision or corruption
        store.entries.insert(session_id.0.clone(), UserId(2));
        assert_matches!(
            service.refresh(&pair.refresh_token.0).await,
            Err(AuthError::SessionMismatch)
        );
        // the stale record must be gone afterwards
        assert!(store.entries.get(&session_id.0).is_none());
    }

    #[tokio::test]
    async fn revoke_is_idempotent() {
        let (service, store, _) = service_with(test_config());

        let pair = service.issue(UserId(8)).await.expect("issue should succeed");
        service.revoke(&pair.refresh_token.0).await.expect("first revoke");
        service.revoke(&pair.refresh_token.0).await.expect("second revoke");
        assert!(store.entries.is_empty());

        assert_matches!(
            service.refresh(&pair.refresh_token.0).await,
            Err(AuthError::SessionRevoked)
        );
    }

    #[tokio::test]
    async fn revoke_accepts_an_expired_refresh_token() {
        let cfg = test_config();
        let (service, store, _) = service_with(test_config());

        let now = Utc::now().timestamp();
        let claims = RefreshClaims {
            sub: 3,
            iat: now - 600,
            exp: now - 300,
            jti: SessionId::generate().0,
        };
        store.entries.insert(claims.jti.clone(), UserId(3));
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(&cfg.refresh_secret),
        )
        .expect("encoding should succeed");

        service
            .revoke(&token)
            .await
            .expect("logout with an expired token should still succeed");
        assert!(store.entries.is_empty());
    }

    #[tokio::test]
    async fn expired_access_token_is_rejected() {
        let cfg = test_config();
        let (service, _, _) = service_with(test_config());

        let now = Utc::now().timestamp();
        let claims = AccessClaims {
            sub: 6,
            iat: now - 600,
            exp: now - 300,
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(&cfg.access_secret),
        )
        .expect("encoding should succeed");

        assert_matches!(service.validate_access(&token).await, Err(AuthError::Expired));
    }

    #[tokio::test]
    async fn access_and_refresh_secrets_are_independent() {
        let (service, _, codec) = service_with(test_config());

        let pair = service.issue(UserId(3)).await.expect("issue should succeed");
        assert_matches!(
            codec.verify_refresh(&pair.access_token.0, false).await,
            Err(AuthError::InvalidSignature)
        );
        assert_matches!(
            codec.verify_access(&pair.refresh_token.0).await,
            Err(AuthError::InvalidSignature)
        );
    }

    #[tokio::test]
    async fn garbage_token_is_malformed() {
        let (service, _, _) = service_with(test_config());
        assert_matches!(
            service.validate_access("not-a-token").await,
            Err(AuthError::Malformed)
        );
        assert_matches!(service.revoke("not-a-token").await, Err(AuthError::Malformed));
    }

    #[tokio::test]
    async fn store_failure_during_issue_discards_the_pair() {
        let cfg = test_config();
        let access_ttl = cfg.access_ttl;
        let service = RealSessionService::new(
            Arc::new(JwtTokenCodec::new(cfg)),
            Arc::new(UnavailableStore),
            access_ttl,
        );
        assert_matches!(
            service.issue(UserId(7)).await,
            Err(AuthError::IssuanceFailed(_))
        );
    }

    #[tokio::test]
    async fn rotation_lifecycle() {
        let (service, _, _) = service_with(test_config());

        let first = service.issue(UserId(42)).await.expect("issue should succeed");
        let second = service
            .refresh(&first.refresh_token.0)
            .await
            .expect("rotation should succeed");

        assert_matches!(
            service.refresh(&first.refresh_token.0).await,
            Err(AuthError::SessionRevoked)
        );

        service.revoke(&second.refresh_token.0).await.expect("revoke");
        assert_matches!(
            service.refresh(&second.refresh_token.0).await,
            Err(AuthError::SessionRevoked)
        );

        // access tokens are stateless and keep validating until they expire
        let uid = service
            .validate_access(&second.access_token.0)
            .await
            .expect("access token outlives revocation until expiry");
        assert_eq!(uid, UserId(42));
    }

    #[tokio::test]
    async fn concurrent_refresh_of_one_token_is_tolerated() {
        let (service, store, _) = service_with(test_config());
        let service = Arc::new(service);

        let pair = service.issue(UserId(9)).await.expect("issue should succeed");
        let token = pair.refresh_token.0;

        let a = {
            let service = service.clone();
            let token = token.clone();
            tokio::spawn(async move { service.refresh(&token).await })
        };
        let b = {
            let service = service.clone();
            let token = token.clone();
            tokio::spawn(async move { service.refresh(&token).await })
        };
        let a = a.await.expect("task a must not panic");
        let b = b.await.expect("task b must not panic");

        // Both callers may win (documented trade-off of skipping a
        // compare-and-delete); the store must stay consistent either way.
        let winners = [&a, &b].iter().filter(|r| r.is_ok()).count();
        assert!(winners >= 1);
        assert_eq!(store.entries.len(), winners);

        for result in [a, b].into_iter().flatten() {
            let uid = service
                .validate_access(&result.access_token.0)
                .await
                .expect("winner's access token should validate");
            assert_eq!(uid, UserId(9));
        }
    }
}
