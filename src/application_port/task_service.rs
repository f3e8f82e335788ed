use crate::domain_model::{
    BoardId, DeadlineFilter, SortDir, Task, TaskId, TaskPriority, TaskSortKey, TaskStatus, UserId,
};
use chrono::{DateTime, Utc};

#[derive(Debug, thiserror::Error)]
pub enum TaskError {
    #[error("task not found or not owned by caller")]
    NotFound,
    #[error("store error: {0}")]
    Store(String),
}

#[derive(Debug, Clone)]
pub struct NewTask {
    pub title: String,
    pub description: Option<String>,
    pub status: TaskStatus,
    pub priority: TaskPriority,
    pub deadline: Option<DateTime<Utc>>,
}

/// Patch semantics: `None` leaves the field untouched. A deadline cannot be
/// cleared through a patch, matching the board client's contract.
#[derive(Debug, Clone, Default)]
pub struct TaskPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<TaskStatus>,
    pub priority: Option<TaskPriority>,
    pub deadline: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default)]
pub struct TaskFilter {
    /// Substring match over title and description.
    pub search: Option<String>,
    pub status: Option<TaskStatus>,
    pub priority: Option<TaskPriority>,
    pub deadline: Option<DeadlineFilter>,
    pub sort_key: TaskSortKey,
    pub sort_dir: SortDir,
}

#[async_trait::async_trait]
pub trait TaskService: Send + Sync {
    async fn create_task(
        &self,
        user_id: UserId,
        board_id: BoardId,
        task: NewTask,
    ) -> Result<Task, TaskError>;
    async fn list_tasks(&self, board_id: BoardId, filter: TaskFilter)
    -> Result<Vec<Task>, TaskError>;
    async fn update_task(
        &self,
        user_id: UserId,
        board_id: BoardId,
        task_id: TaskId,
        patch: TaskPatch,
    ) -> Result<Task, TaskError>;
    async fn delete_task(
        &self,
        user_id: UserId,
        board_id: BoardId,
        task_id: TaskId,
    ) -> Result<(), TaskError>;
}
