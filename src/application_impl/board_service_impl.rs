use crate::application_port::{BoardError, BoardService};
use crate::domain_model::{Board, BoardId, UserId};
use crate::domain_port::BoardRepo;
use std::sync::Arc;

pub struct RealBoardService {
    board_repo: Arc<dyn BoardRepo>,
}

impl RealBoardService {
    pub fn new(board_repo: Arc<dyn BoardRepo>) -> Self {
        Self { board_repo }
    }
}

#[async_trait::async_trait]
impl BoardService for RealBoardService {
    async fn create_board(&self, user_id: UserId, name: String) -> Result<Board, BoardError> {
        self.board_repo.create(user_id, &name).await
    }

    async fn list_boards(&self, user_id: UserId) -> Result<Vec<Board>, BoardError> {
        self.board_repo.list_for_user(user_id).await
    }

    async fn update_board(
        &self,
        user_id: UserId,
        board_id: BoardId,
        name: Option<String>,
    ) -> Result<Board, BoardError> {
        self.board_repo
            .update(board_id, user_id, name.as_deref())
            .await?
            .ok_or(BoardError::NotFound)
    }

    async fn delete_board(&self, user_id: UserId, board_id: BoardId) -> Result<(), BoardError> {
        let removed = self.board_repo.delete(board_id, user_id).await?;
        if !removed {
            return Err(BoardError::NotFound);
        }
        Ok(())
    }
}
