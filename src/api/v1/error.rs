use crate::application_port::{AuthError, BoardError, TaskError};
use serde::Serialize;
use std::convert::Infallible;
use thiserror::Error;
use tracing::warn;
use warp::http::StatusCode;
use warp::{Rejection, reject};

#[derive(Debug, Clone, Error)]
pub enum ApiErrorCode {
    #[error("invalid request")]
    InvalidRequest,
    #[error("invalid email or password")]
    InvalidCredentials,
    #[error("user already exists")]
    EmailTaken,
    #[error("missing or invalid Authorization header")]
    MissingCredential,
    #[error("invalid token")]
    InvalidToken,
    #[error("not found or not yours")]
    NotYours,
    #[error("internal error")]
    InternalError,
}

impl ApiErrorCode {
    pub fn internal<E: std::fmt::Display>(error: E) -> ApiErrorCode {
        warn!("internal error: {}", error);
        ApiErrorCode::InternalError
    }

    fn status(&self) -> StatusCode {
        match self {
            ApiErrorCode::InvalidRequest => StatusCode::BAD_REQUEST,
            ApiErrorCode::InvalidCredentials
            | ApiErrorCode::MissingCredential
            | ApiErrorCode::InvalidToken => StatusCode::UNAUTHORIZED,
            ApiErrorCode::EmailTaken => StatusCode::CONFLICT,
            ApiErrorCode::NotYours => StatusCode::FORBIDDEN,
            ApiErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl reject::Reject for ApiErrorCode {}

impl From<AuthError> for ApiErrorCode {
    fn from(error: AuthError) -> Self {
        match error {
            AuthError::InvalidCredentials => ApiErrorCode::InvalidCredentials,
            AuthError::EmailTaken => ApiErrorCode::EmailTaken,
            AuthError::Malformed
            | AuthError::InvalidSignature
            | AuthError::Expired
            | AuthError::SessionRevoked
            | AuthError::SessionMismatch => {
                // every credential-validity failure collapses to 401; the
                // distinction only matters in the logs
                warn!("credential rejected: {}", error);
                ApiErrorCode::InvalidToken
            }
            AuthError::StoreUnavailable(_)
            | AuthError::IssuanceFailed(_)
            | AuthError::Internal(_) => ApiErrorCode::internal(error),
        }
    }
}

impl From<BoardError> for ApiErrorCode {
    fn from(error: BoardError) -> Self {
        match error {
            BoardError::NotFound => ApiErrorCode::NotYours,
            BoardError::Store(e) => ApiErrorCode::internal(e),
        }
    }
}

impl From<TaskError> for ApiErrorCode {
    fn from(error: TaskError) -> Self {
        match error {
            TaskError::NotFound => ApiErrorCode::NotYours,
            TaskError::Store(e) => ApiErrorCode::internal(e),
        }
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

pub async fn recover_error(err: Rejection) -> Result<impl warp::Reply, Infallible> {
    let (status, message) = if let Some(code) = err.find::<ApiErrorCode>() {
        (code.status(), code.to_string())
    } else if err.is_not_found() {
        (StatusCode::NOT_FOUND, "not found".to_string())
    } else if err
        .find::<warp::filters::body::BodyDeserializeError>()
        .is_some()
    {
        (StatusCode::BAD_REQUEST, "invalid request".to_string())
    } else if err.find::<warp::reject::MethodNotAllowed>().is_some() {
        (
            StatusCode::METHOD_NOT_ALLOWED,
            "method not allowed".to_string(),
        )
    } else {
        warn!("unhandled rejection: {:?}", err);
        (StatusCode::INTERNAL_SERVER_ERROR, "internal error".to_string())
    };

    let json = warp::reply::json(&ErrorBody { error: message });
    Ok(warp::reply::with_status(json, status))
}
