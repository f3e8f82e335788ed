use crate::application_port::BoardError;
use crate::domain_model::{Board, BoardId, UserId};
use crate::domain_port::BoardRepo;
use chrono::{DateTime, Utc};
use sqlx::mysql::MySqlRow;
use sqlx::{MySqlPool, Row};

pub struct MySqlBoardRepo {
    pool: MySqlPool,
}

impl MySqlBoardRepo {
    pub fn new(pool: MySqlPool) -> Self {
        MySqlBoardRepo { pool }
    }

    fn row_to_board(row: MySqlRow) -> Result<Board, BoardError> {
        let board_id: BoardId = row
            .try_get("id")
            .map_err(|e| BoardError::Store(e.to_string()))?;
        let user_id: UserId = row
            .try_get("user_id")
            .map_err(|e| BoardError::Store(e.to_string()))?;
        let name: String = row
            .try_get("name")
            .map_err(|e| BoardError::Store(e.to_string()))?;
        let created_at: DateTime<Utc> = row
            .try_get("created_at")
            .map_err(|e| BoardError::Store(e.to_string()))?;
        let updated_at: DateTime<Utc> = row
            .try_get("updated_at")
            .map_err(|e| BoardError::Store(e.to_string()))?;

        Ok(Board {
            board_id,
            user_id,
            name,
            created_at,
            updated_at,
        })
    }

    async fn fetch(
        &self,
        board_id: BoardId,
        user_id: UserId,
    ) -> Result<Option<Board>, BoardError> {
        let row_opt: Option<MySqlRow> = sqlx::query(
            r#"
SELECT id, user_id, name, created_at, updated_at
FROM board
WHERE id = ? AND user_id = ?
"#,
        )
        .bind(board_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| BoardError::Store(e.to_string()))?;

        row_opt.map(Self::row_to_board).transpose()
    }
}

#[async_trait::async_trait]
impl BoardRepo for MySqlBoardRepo {
    async fn create(&self, user_id: UserId, name: &str) -> Result<Board, BoardError> {
        let result = sqlx::query(
            r#"
INSERT INTO board (user_id, name)
VALUES (?, ?)
"#,
        )
        .bind(user_id)
        .bind(name)
        .execute(&self.pool)
        .await
        .map_err(|e| BoardError::Store(e.to_string()))?;

        let board_id = BoardId(result.last_insert_id() as i32);
        self.fetch(board_id, user_id)
            .await?
            .ok_or_else(|| BoardError::Store("inserted board row missing".to_string()))
    }

    async fn list_for_user(&self, user_id: UserId) -> Result<Vec<Board>, BoardError> {
        let rows = sqlx::query(
            r#"
SELECT id, user_id, name, created_at, updated_at
FROM board
WHERE user_id = ?
ORDER BY id
"#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| BoardError::Store(e.to_string()))?;

        rows.into_iter().map(Self::row_to_board).collect()
    }

    async fn update(
        &self,
        board_id: BoardId,
        user_id: UserId,
        name: Option<&str>,
    ) -> Result<Option<Board>, BoardError> {
        sqlx::query(
            r#"
UPDATE board
SET name = COALESCE(?, name)
WHERE id = ? AND user_id = ?
"#,
        )
        .bind(name)
        .bind(board_id)
        .bind(user_id)
        .execute(&self.pool)
        .await
        .map_err(|e| BoardError::Store(e.to_string()))?;

        // ownership check rides on the scoped re-read, not on rows_affected
        self.fetch(board_id, user_id).await
    }

    async fn delete(&self, board_id: BoardId, user_id: UserId) -> Result<bool, BoardError> {
        let result = sqlx::query(
            r#"
DELETE FROM board
WHERE id = ? AND user_id = ?
"#,
        )
        .bind(board_id)
        .bind(user_id)
        .execute(&self.pool)
        .await
        .map_err(|e| BoardError::Store(e.to_string()))?;

        Ok(result.rows_affected() > 0)
    }
}
