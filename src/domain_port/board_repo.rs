use crate::application_port::BoardError;
use crate::domain_model::{Board, BoardId, UserId};

#[async_trait::async_trait]
pub trait BoardRepo: Send + Sync {
    async fn create(&self, user_id: UserId, name: &str) -> Result<Board, BoardError>;

    async fn list_for_user(&self, user_id: UserId) -> Result<Vec<Board>, BoardError>;

    /// Apply the provided fields, then return the row as the caller may see
    /// it; `None` when the board does not exist or belongs to someone else.
    async fn update(
        &self,
        board_id: BoardId,
        user_id: UserId,
        name: Option<&str>,
    ) -> Result<Option<Board>, BoardError>;

    /// Ownership-scoped delete; returns whether a row was removed.
    async fn delete(&self, board_id: BoardId, user_id: UserId) -> Result<bool, BoardError>;
}
