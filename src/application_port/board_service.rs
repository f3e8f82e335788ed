use crate::domain_model::{Board, BoardId, UserId};

#[derive(Debug, thiserror::Error)]
pub enum BoardError {
    #[error("board not found or not owned by caller")]
    NotFound,
    #[error("store error: {0}")]
    Store(String),
}

#[async_trait::async_trait]
pub trait BoardService: Send + Sync {
    async fn create_board(&self, user_id: UserId, name: String) -> Result<Board, BoardError>;
    async fn list_boards(&self, user_id: UserId) -> Result<Vec<Board>, BoardError>;
    /// Patch semantics: `None` leaves the name untouched.
    async fn update_board(
        &self,
        user_id: UserId,
        board_id: BoardId,
        name: Option<String>,
    ) -> Result<Board, BoardError>;
    async fn delete_board(&self, user_id: UserId, board_id: BoardId) -> Result<(), BoardError>;
}
