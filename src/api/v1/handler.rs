use super::error::ApiErrorCode;
use crate::application_port::{
    AccountService, BoardService, LoginInput, NewTask, SessionService, SignupInput, TaskFilter,
    TaskPatch, TaskService,
};
use crate::domain_model::{
    Board, BoardId, Task, TaskId, TaskPriority, TaskStatus, UserId,
};
use crate::logger::*;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::sync::Arc;
use warp::{self, reject};

const MIN_PASSWORD_LEN: usize = 6;

// region auth

#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: UserId,
    pub email: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

#[derive(Debug, Serialize)]
pub struct SuccessResponse {
    pub success: bool,
}

#[derive(Debug, Serialize)]
pub struct MeResponse {
    pub user_id: UserId,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

pub async fn healthz() -> Result<impl warp::Reply, warp::Rejection> {
    Ok(warp::reply::json(&HealthResponse { status: "ok" }))
}

fn is_valid_email(email: &str) -> bool {
    email
        .split_once('@')
        .is_some_and(|(local, domain)| !local.is_empty() && domain.contains('.'))
}

pub async fn signup(
    body: SignupRequest,
    account_service: Arc<dyn AccountService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let email = body.email.trim().to_lowercase();
    if !is_valid_email(&email) || body.password.len() < MIN_PASSWORD_LEN {
        return Err(reject::custom(ApiErrorCode::InvalidRequest));
    }

    let result = account_service
        .signup(SignupInput {
            email,
            password: body.password,
        })
        .await
        .map_err(ApiErrorCode::from)
        .map_err(reject::custom)?;

    info!("user signed up: {}", result.email);
    Ok(warp::reply::json(&UserResponse {
        id: result.user_id,
        email: result.email,
    }))
}

pub async fn login(
    body: LoginRequest,
    account_service: Arc<dyn AccountService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let email = body.email.trim().to_lowercase();
    let tokens = account_service
        .login(LoginInput {
            email: email.clone(),
            password: body.password,
        })
        .await
        .map_err(ApiErrorCode::from)
        .map_err(reject::custom)?;

    info!("user logged in: {}", email);
    Ok(warp::reply::json(&tokens))
}

pub async fn refresh(
    body: RefreshRequest,
    session_service: Arc<dyn SessionService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let tokens = session_service
        .refresh(&body.refresh_token)
        .await
        .map_err(ApiErrorCode::from)
        .map_err(reject::custom)?;

    info!("refresh done");
    Ok(warp::reply::json(&tokens))
}

pub async fn logout(
    body: RefreshRequest,
    session_service: Arc<dyn SessionService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    session_service
        .revoke(&body.refresh_token)
        .await
        .map_err(ApiErrorCode::from)
        .map_err(reject::custom)?;

    info!("logout done");
    Ok(warp::reply::json(&SuccessResponse { success: true }))
}

pub async fn me(user_id: UserId) -> Result<impl warp::Reply, warp::Rejection> {
    Ok(warp::reply::json(&MeResponse { user_id }))
}

// endregion

// region boards

#[derive(Debug, Deserialize)]
pub struct CreateBoardRequest {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateBoardRequest {
    pub name: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct BoardResponse {
    pub id: BoardId,
    pub user_id: UserId,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Board> for BoardResponse {
    fn from(board: Board) -> Self {
        BoardResponse {
            id: board.board_id,
            user_id: board.user_id,
            name: board.name,
            created_at: board.created_at,
            updated_at: board.updated_at,
        }
    }
}

pub async fn create_board(
    body: CreateBoardRequest,
    user_id: UserId,
    board_service: Arc<dyn BoardService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    if body.name.trim().is_empty() {
        return Err(reject::custom(ApiErrorCode::InvalidRequest));
    }

    let board = board_service
        .create_board(user_id, body.name)
        .await
        .map_err(ApiErrorCode::from)
        .map_err(reject::custom)?;

    info!("board {} created by user {}", board.board_id, user_id);
    Ok(warp::reply::json(&BoardResponse::from(board)))
}

pub async fn list_boards(
    user_id: UserId,
    board_service: Arc<dyn BoardService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let boards = board_service
        .list_boards(user_id)
        .await
        .map_err(ApiErrorCode::from)
        .map_err(reject::custom)?;

    let response: Vec<BoardResponse> = boards.into_iter().map(BoardResponse::from).collect();
    Ok(warp::reply::json(&response))
}

pub async fn update_board(
    board_id: BoardId,
    body: UpdateBoardRequest,
    user_id: UserId,
    board_service: Arc<dyn BoardService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let board = board_service
        .update_board(user_id, board_id, body.name)
        .await
        .map_err(ApiErrorCode::from)
        .map_err(reject::custom)?;

    info!("board {} updated", board.board_id);
    Ok(warp::reply::json(&BoardResponse::from(board)))
}

pub async fn delete_board(
    board_id: BoardId,
    user_id: UserId,
    board_service: Arc<dyn BoardService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    board_service
        .delete_board(user_id, board_id)
        .await
        .map_err(ApiErrorCode::from)
        .map_err(reject::custom)?;

    info!("board {} deleted", board_id);
    Ok(warp::reply::json(&SuccessResponse { success: true }))
}

// endregion

// region tasks

#[derive(Debug, Deserialize)]
pub struct CreateTaskRequest {
    pub title: String,
    pub description: Option<String>,
    pub status: Option<TaskStatus>,
    pub priority: Option<TaskPriority>,
    pub deadline: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateTaskRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<TaskStatus>,
    pub priority: Option<TaskPriority>,
    pub deadline: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize)]
pub struct TaskResponse {
    pub id: TaskId,
    pub board_id: BoardId,
    pub user_id: UserId,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub status: TaskStatus,
    pub priority: TaskPriority,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deadline: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Task> for TaskResponse {
    fn from(task: Task) -> Self {
        TaskResponse {
            id: task.task_id,
            board_id: task.board_id,
            user_id: task.user_id,
            title: task.title,
            description: task.description,
            status: task.status,
            priority: task.priority,
            deadline: task.deadline,
            created_at: task.created_at,
            updated_at: task.updated_at,
        }
    }
}

/// Raw query-string controls for task listing. Values are kept as strings at
/// the wire and parsed into the typed filter, with empty strings treated the
/// same as absent parameters.
#[derive(Debug, Deserialize)]
pub struct TaskListQuery {
    pub search: Option<String>,
    pub status: Option<String>,
    pub priority: Option<String>,
    pub deadline: Option<String>,
    pub sort_by: Option<String>,
    pub sort_dir: Option<String>,
}

fn parse_opt<T>(value: Option<String>) -> Result<Option<T>, String>
where
    T: FromStr<Err = String>,
{
    value
        .filter(|v| !v.is_empty())
        .map(|v| v.parse())
        .transpose()
}

fn task_filter_from_query(query: TaskListQuery) -> Result<TaskFilter, String> {
    Ok(TaskFilter {
        search: query.search.filter(|s| !s.is_empty()),
        status: parse_opt(query.status)?,
        priority: parse_opt(query.priority)?,
        deadline: parse_opt(query.deadline)?,
        sort_key: parse_opt(query.sort_by)?.unwrap_or_default(),
        sort_dir: parse_opt(query.sort_dir)?.unwrap_or_default(),
    })
}

pub async fn create_task(
    board_id: BoardId,
    body: CreateTaskRequest,
    user_id: UserId,
    task_service: Arc<dyn TaskService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    if body.title.trim().is_empty() {
        return Err(reject::custom(ApiErrorCode::InvalidRequest));
    }

    let task = task_service
        .create_task(
            user_id,
            board_id,
            NewTask {
                title: body.title,
                description: body.description.filter(|d| !d.is_empty()),
                status: body.status.unwrap_or_default(),
                priority: body.priority.unwrap_or_default(),
                deadline: body.deadline,
            },
        )
        .await
        .map_err(ApiErrorCode::from)
        .map_err(reject::custom)?;

    info!(
        "task {} created in board {} by user {}",
        task.task_id, board_id, user_id
    );
    Ok(warp::reply::json(&TaskResponse::from(task)))
}

pub async fn list_tasks(
    board_id: BoardId,
    query: TaskListQuery,
    user_id: UserId,
    task_service: Arc<dyn TaskService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let filter = task_filter_from_query(query).map_err(|e| {
        warn!("bad task list query: {}", e);
        reject::custom(ApiErrorCode::InvalidRequest)
    })?;

    let tasks = task_service
        .list_tasks(board_id, filter)
        .await
        .map_err(ApiErrorCode::from)
        .map_err(reject::custom)?;

    info!("tasks of board {} listed by user {}", board_id, user_id);
    let response: Vec<TaskResponse> = tasks.into_iter().map(TaskResponse::from).collect();
    Ok(warp::reply::json(&response))
}

pub async fn update_task(
    board_id: BoardId,
    task_id: TaskId,
    body: UpdateTaskRequest,
    user_id: UserId,
    task_service: Arc<dyn TaskService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let task = task_service
        .update_task(
            user_id,
            board_id,
            task_id,
            TaskPatch {
                title: body.title,
                description: body.description,
                status: body.status,
                priority: body.priority,
                deadline: body.deadline,
            },
        )
        .await
        .map_err(ApiErrorCode::from)
        .map_err(reject::custom)?;

    info!("task {} updated", task.task_id);
    Ok(warp::reply::json(&TaskResponse::from(task)))
}

pub async fn delete_task(
    board_id: BoardId,
    task_id: TaskId,
    user_id: UserId,
    task_service: Arc<dyn TaskService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    task_service
        .delete_task(user_id, board_id, task_id)
        .await
        .map_err(ApiErrorCode::from)
        .map_err(reject::custom)?;

    info!("task {} deleted", task_id);
    Ok(warp::reply::json(&SuccessResponse { success: true }))
}

// endregion

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain_model::{DeadlineFilter, SortDir, TaskSortKey};

    fn query(
        status: Option<&str>,
        sort_by: Option<&str>,
        sort_dir: Option<&str>,
        deadline: Option<&str>,
    ) -> TaskListQuery {
        TaskListQuery {
            search: None,
            status: status.map(String::from),
            priority: None,
            deadline: deadline.map(String::from),
            sort_by: sort_by.map(String::from),
            sort_dir: sort_dir.map(String::from),
        }
    }

    #[test]
    fn filter_parses_the_board_client_query_values() {
        let filter = task_filter_from_query(query(
            Some("in_progress"),
            Some("deadline"),
            Some("asc"),
            Some("with"),
        ))
        .expect("known values should parse");
        assert_eq!(filter.status, Some(TaskStatus::InProgress));
        assert_eq!(filter.sort_key, TaskSortKey::Deadline);
        assert_eq!(filter.sort_dir, SortDir::Asc);
        assert_eq!(filter.deadline, Some(DeadlineFilter::With));
    }

    #[test]
    fn filter_defaults_to_created_desc() {
        let filter = task_filter_from_query(query(None, None, None, None)).expect("empty query");
        assert_eq!(filter.status, None);
        assert_eq!(filter.sort_key, TaskSortKey::Created);
        assert_eq!(filter.sort_dir, SortDir::Desc);
    }

    #[test]
    fn filter_treats_empty_strings_as_absent() {
        let filter = task_filter_from_query(query(Some(""), Some(""), None, None))
            .expect("empty strings are not filters");
        assert_eq!(filter.status, None);
        assert_eq!(filter.sort_key, TaskSortKey::Created);
    }

    #[test]
    fn filter_rejects_unknown_values() {
        assert!(task_filter_from_query(query(Some("doing"), None, None, None)).is_err());
        assert!(task_filter_from_query(query(None, Some("priority"), None, None)).is_err());
    }

    #[test]
    fn email_shapes() {
        assert!(is_valid_email("user@example.com"));
        assert!(!is_valid_email("user@localhost"));
        assert!(!is_valid_email("@example.com"));
        assert!(!is_valid_email("plainaddress"));
    }
}
