use crate::application_port::{NewTask, TaskError, TaskFilter, TaskPatch};
use crate::domain_model::{
    BoardId, DeadlineFilter, SortDir, Task, TaskId, TaskPriority, TaskSortKey, TaskStatus, UserId,
};
use crate::domain_port::TaskRepo;
use chrono::{DateTime, Utc};
use sqlx::mysql::MySqlRow;
use sqlx::{MySql, MySqlPool, QueryBuilder, Row};

pub struct MySqlTaskRepo {
    pool: MySqlPool,
}

impl MySqlTaskRepo {
    pub fn new(pool: MySqlPool) -> Self {
        MySqlTaskRepo { pool }
    }

    fn row_to_task(row: MySqlRow) -> Result<Task, TaskError> {
        let task_id: TaskId = row
            .try_get("id")
            .map_err(|e| TaskError::Store(e.to_string()))?;
        let board_id: BoardId = row
            .try_get("board_id")
            .map_err(|e| TaskError::Store(e.to_string()))?;
        let user_id: UserId = row
            .try_get("user_id")
            .map_err(|e| TaskError::Store(e.to_string()))?;
        let title: String = row
            .try_get("title")
            .map_err(|e| TaskError::Store(e.to_string()))?;
        let description: Option<String> = row
            .try_get("description")
            .map_err(|e| TaskError::Store(e.to_string()))?;
        let status: TaskStatus = row
            .try_get("status")
            .map_err(|e| TaskError::Store(e.to_string()))?;
        let priority: TaskPriority = row
            .try_get("priority")
            .map_err(|e| TaskError::Store(e.to_string()))?;
        let deadline: Option<DateTime<Utc>> = row
            .try_get("deadline")
            .map_err(|e| TaskError::Store(e.to_string()))?;
        let created_at: DateTime<Utc> = row
            .try_get("created_at")
            .map_err(|e| TaskError::Store(e.to_string()))?;
        let updated_at: DateTime<Utc> = row
            .try_get("updated_at")
            .map_err(|e| TaskError::Store(e.to_string()))?;

        Ok(Task {
            task_id,
            board_id,
            user_id,
            title,
            description,
            status,
            priority,
            deadline,
            created_at,
            updated_at,
        })
    }

    async fn fetch(
        &self,
        task_id: TaskId,
        board_id: BoardId,
        user_id: UserId,
    ) -> Result<Option<Task>, TaskError> {
        let row_opt: Option<MySqlRow> = sqlx::query(
            r#"
SELECT id, board_id, user_id, title, description, status, priority, deadline, created_at, updated_at
FROM task
WHERE id = ? AND board_id = ? AND user_id = ?
"#,
        )
        .bind(task_id)
        .bind(board_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| TaskError::Store(e.to_string()))?;

        row_opt.map(Self::row_to_task).transpose()
    }
}

#[async_trait::async_trait]
impl TaskRepo for MySqlTaskRepo {
    async fn create(
        &self,
        board_id: BoardId,
        user_id: UserId,
        task: &NewTask,
    ) -> Result<Task, TaskError> {
        let result = sqlx::query(
            r#"
INSERT INTO task (board_id, user_id, title, description, status, priority, deadline)
VALUES (?, ?, ?, ?, ?, ?, ?)
"#,
        )
        .bind(board_id)
        .bind(user_id)
        .bind(&task.title)
        .bind(task.description.as_deref())
        .bind(task.status)
        .bind(task.priority)
        .bind(task.deadline)
        .execute(&self.pool)
        .await
        .map_err(|e| TaskError::Store(e.to_string()))?;

        let task_id = TaskId(result.last_insert_id() as i32);
        self.fetch(task_id, board_id, user_id)
            .await?
            .ok_or_else(|| TaskError::Store("inserted task row missing".to_string()))
    }

    async fn list(&self, board_id: BoardId, filter: &TaskFilter) -> Result<Vec<Task>, TaskError> {
        let mut qb: QueryBuilder<MySql> = QueryBuilder::new(
            "SELECT id, board_id, user_id, title, description, status, priority, deadline, created_at, updated_at \
             FROM task WHERE board_id = ",
        );
        qb.push_bind(board_id);

        if let Some(search) = &filter.search {
            let pattern = format!("%{search}%");
            qb.push(" AND (title LIKE ")
                .push_bind(pattern.clone())
                .push(" OR description LIKE ")
                .push_bind(pattern)
                .push(")");
        }
        if let Some(status) = filter.status {
            qb.push(" AND status = ").push_bind(status);
        }
        if let Some(priority) = filter.priority {
            qb.push(" AND priority = ").push_bind(priority);
        }
        match filter.deadline {
            Some(DeadlineFilter::With) => {
                qb.push(" AND deadline IS NOT NULL");
            }
            Some(DeadlineFilter::Without) => {
                qb.push(" AND deadline IS NULL");
            }
            None => {}
        }

        // tasks without a deadline always sort last
        qb.push(match (filter.sort_key, filter.sort_dir) {
            (TaskSortKey::Created, SortDir::Asc) => " ORDER BY created_at ASC, id ASC",
            (TaskSortKey::Created, SortDir::Desc) => " ORDER BY created_at DESC, id DESC",
            (TaskSortKey::Deadline, SortDir::Asc) => {
                " ORDER BY deadline IS NULL, deadline ASC, id ASC"
            }
            (TaskSortKey::Deadline, SortDir::Desc) => {
                " ORDER BY deadline IS NULL, deadline DESC, id DESC"
            }
        });

        let rows = qb
            .build()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| TaskError::Store(e.to_string()))?;

        rows.into_iter().map(Self::row_to_task).collect()
    }

    async fn update(
        &self,
        task_id: TaskId,
        board_id: BoardId,
        user_id: UserId,
        patch: &TaskPatch,
    ) -> Result<Option<Task>, TaskError> {
        sqlx::query(
            r#"
UPDATE task
SET title = COALESCE(?, title),
    description = COALESCE(?, description),
    status = COALESCE(?, status),
    priority = COALESCE(?, priority),
    deadline = COALESCE(?, deadline)
WHERE id = ? AND board_id = ? AND user_id = ?
"#,
        )
        .bind(patch.title.as_deref())
        .bind(patch.description.as_deref())
        .bind(patch.status)
        .bind(patch.priority)
        .bind(patch.deadline)
        .bind(task_id)
        .bind(board_id)
        .bind(user_id)
        .execute(&self.pool)
        .await
        .map_err(|e| TaskError::Store(e.to_string()))?;

        // ownership check rides on the scoped re-read, not on rows_affected
        self.fetch(task_id, board_id, user_id).await
    }

    async fn delete(
        &self,
        task_id: TaskId,
        board_id: BoardId,
        user_id: UserId,
    ) -> Result<bool, TaskError> {
        let result = sqlx::query(
            r#"
DELETE FROM task
WHERE id = ? AND board_id = ? AND user_id = ?
"#,
        )
        .bind(task_id)
        .bind(board_id)
        .bind(user_id)
        .execute(&self.pool)
        .await
        .map_err(|e| TaskError::Store(e.to_string()))?;

        Ok(result.rows_affected() > 0)
    }
}
