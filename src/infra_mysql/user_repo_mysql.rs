use super::util::is_dup_key;
use crate::application_port::AuthError;
use crate::domain_model::UserId;
use crate::domain_port::{UserRecord, UserRepo};
use chrono::{DateTime, Utc};
use sqlx::mysql::MySqlRow;
use sqlx::{MySqlPool, Row};

pub struct MySqlUserRepo {
    pool: MySqlPool,
}

impl MySqlUserRepo {
    pub fn new(pool: MySqlPool) -> Self {
        MySqlUserRepo { pool }
    }

    fn row_to_record(row: MySqlRow) -> Result<UserRecord, AuthError> {
        let user_id: UserId = row
            .try_get("id")
            .map_err(|e| AuthError::StoreUnavailable(e.to_string()))?;
        let email: String = row
            .try_get("email")
            .map_err(|e| AuthError::StoreUnavailable(e.to_string()))?;
        let password_hash: String = row
            .try_get("password_hash")
            .map_err(|e| AuthError::StoreUnavailable(e.to_string()))?;
        let created_at: DateTime<Utc> = row
            .try_get("created_at")
            .map_err(|e| AuthError::StoreUnavailable(e.to_string()))?;

        Ok(UserRecord {
            user_id,
            email,
            password_hash,
            created_at,
        })
    }
}

#[async_trait::async_trait]
impl UserRepo for MySqlUserRepo {
    async fn create(&self, email: &str, password_hash: &str) -> Result<UserRecord, AuthError> {
        let result = sqlx::query(
            r#"
INSERT INTO user (email, password_hash)
VALUES (?, ?)
"#,
        )
        .bind(email)
        .bind(password_hash)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if is_dup_key(&e) {
                AuthError::EmailTaken
            } else {
                AuthError::StoreUnavailable(e.to_string())
            }
        })?;

        let user_id = result.last_insert_id() as i32;
        let row = sqlx::query(
            r#"
SELECT id, email, password_hash, created_at
FROM user
WHERE id = ?
"#,
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AuthError::StoreUnavailable(e.to_string()))?;

        Self::row_to_record(row)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>, AuthError> {
        let row_opt: Option<MySqlRow> = sqlx::query(
            r#"
SELECT id, email, password_hash, created_at
FROM user
WHERE email = ?
"#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AuthError::StoreUnavailable(e.to_string()))?;

        row_opt.map(Self::row_to_record).transpose()
    }
}
