use crate::application_port::{NewTask, TaskError, TaskFilter, TaskPatch};
use crate::domain_model::{BoardId, Task, TaskId, UserId};

#[async_trait::async_trait]
pub trait TaskRepo: Send + Sync {
    async fn create(
        &self,
        board_id: BoardId,
        user_id: UserId,
        task: &NewTask,
    ) -> Result<Task, TaskError>;

    async fn list(&self, board_id: BoardId, filter: &TaskFilter) -> Result<Vec<Task>, TaskError>;

    /// Apply the provided fields, then return the row as the caller may see
    /// it; `None` when the task does not exist under `(board_id, user_id)`.
    async fn update(
        &self,
        task_id: TaskId,
        board_id: BoardId,
        user_id: UserId,
        patch: &TaskPatch,
    ) -> Result<Option<Task>, TaskError>;

    /// Ownership-scoped delete; returns whether a row was removed.
    async fn delete(
        &self,
        task_id: TaskId,
        board_id: BoardId,
        user_id: UserId,
    ) -> Result<bool, TaskError>;
}
