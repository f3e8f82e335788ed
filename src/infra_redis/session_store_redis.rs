use crate::application_port::AuthError;
use crate::domain_model::{SessionId, UserId};
use crate::domain_port::RefreshSessionStore;
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, FromRedisValue, RedisError, RedisResult, RedisWrite, ToRedisArgs, Value};

/// Redis-backed refresh-session store. Expiry is delegated entirely to Redis
/// via `SET ... EX`; there is no sweeping on this side.
pub struct RedisSessionStore {
    conn: ConnectionManager,
    prefix: String,
}

impl RedisSessionStore {
    pub fn new(conn: ConnectionManager, prefix: impl Into<String>) -> Self {
        RedisSessionStore {
            conn,
            prefix: prefix.into(),
        }
    }

    fn key(&self, session_id: &SessionId) -> String {
        format!("{}:{}", self.prefix, session_id)
    }
}

impl ToRedisArgs for UserId {
    fn write_redis_args<W>(&self, out: &mut W)
    where
        W: ?Sized + RedisWrite,
    {
        out.write_arg(self.to_string().as_bytes())
    }
}

impl FromRedisValue for UserId {
    fn from_redis_value(v: &Value) -> RedisResult<Self> {
        let s: String = redis::from_redis_value(v)?;
        let user_id = s.parse::<UserId>().map_err(|e| {
            RedisError::from((
                redis::ErrorKind::TypeError,
                "invalid UserId string",
                e.to_string(),
            ))
        })?;
        Ok(user_id)
    }
}

#[async_trait::async_trait]
impl RefreshSessionStore for RedisSessionStore {
    async fn put(
        &self,
        session_id: &SessionId,
        user_id: UserId,
        ttl_secs: u64,
    ) -> Result<(), AuthError> {
        let key = self.key(session_id);
        let mut conn = self.conn.clone();
        let _: () = conn
            .set_ex(&key, user_id, ttl_secs)
            .await
            .map_err(|e| AuthError::StoreUnavailable(e.to_string()))?;
        Ok(())
    }

    async fn get(&self, session_id: &SessionId) -> Result<Option<UserId>, AuthError> {
        let key = self.key(session_id);
        let mut conn = self.conn.clone();
        let val: Option<UserId> = conn
            .get(&key)
            .await
            .map_err(|e| AuthError::StoreUnavailable(e.to_string()))?;
        Ok(val)
    }

    async fn delete(&self, session_id: &SessionId) -> Result<(), AuthError> {
        let key = self.key(session_id);
        let mut conn = self.conn.clone();
        let _: () = conn
            .del(&key)
            .await
            .map_err(|e| AuthError::StoreUnavailable(e.to_string()))?;
        Ok(())
    }
}
