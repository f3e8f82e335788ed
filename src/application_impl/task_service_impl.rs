use crate::application_port::{NewTask, TaskError, TaskFilter, TaskPatch, TaskService};
use crate::domain_model::{BoardId, Task, TaskId, UserId};
use crate::domain_port::TaskRepo;
use std::sync::Arc;

pub struct RealTaskService {
    task_repo: Arc<dyn TaskRepo>,
}

impl RealTaskService {
    pub fn new(task_repo: Arc<dyn TaskRepo>) -> Self {
        Self { task_repo }
    }
}

#[async_trait::async_trait]
impl TaskService for RealTaskService {
    async fn create_task(
        &self,
        user_id: UserId,
        board_id: BoardId,
        task: NewTask,
    ) -> Result<Task, TaskError> {
        self.task_repo.create(board_id, user_id, &task).await
    }

    async fn list_tasks(
        &self,
        board_id: BoardId,
        filter: TaskFilter,
    ) -> Result<Vec<Task>, TaskError> {
        self.task_repo.list(board_id, &filter).await
    }

    async fn update_task(
        &self,
        user_id: UserId,
        board_id: BoardId,
        task_id: TaskId,
        patch: TaskPatch,
    ) -> Result<Task, TaskError> {
        self.task_repo
            .update(task_id, board_id, user_id, &patch)
            .await?
            .ok_or(TaskError::NotFound)
    }

    async fn delete_task(
        &self,
        user_id: UserId,
        board_id: BoardId,
        task_id: TaskId,
    ) -> Result<(), TaskError> {
        let removed = self.task_repo.delete(task_id, board_id, user_id).await?;
        if !removed {
            return Err(TaskError::NotFound);
        }
        Ok(())
    }
}
