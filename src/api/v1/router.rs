use super::error::*;
use super::handler;
use super::handler::TaskListQuery;
use crate::application_port::SessionService;
use crate::domain_model::{BoardId, TaskId, UserId};
use crate::server::Server;
use std::convert::Infallible;
use std::sync::Arc;
use warp::{Filter, reject};

pub fn routes(
    server: Arc<Server>,
) -> impl Filter<Extract = (impl warp::Reply,), Error = warp::Rejection> + Clone {
    let healthz = warp::get()
        .and(warp::path("healthz"))
        .and(warp::path::end())
        .and_then(handler::healthz);

    let signup = warp::post()
        .and(warp::path("signup"))
        .and(warp::path::end())
        .and(warp::body::json())
        .and(with(server.account_service.clone()))
        .and_then(handler::signup);

    let login = warp::post()
        .and(warp::path("login"))
        .and(warp::path::end())
        .and(warp::body::json())
        .and(with(server.account_service.clone()))
        .and_then(handler::login);

    let refresh = warp::post()
        .and(warp::path("refresh"))
        .and(warp::path::end())
        .and(warp::body::json())
        .and(with(server.session_service.clone()))
        .and_then(handler::refresh);

    let logout = warp::post()
        .and(warp::path("logout"))
        .and(warp::path::end())
        .and(warp::body::json())
        .and(with(server.session_service.clone()))
        .and_then(handler::logout);

    let me = warp::get()
        .and(warp::path("protected"))
        .and(warp::path("me"))
        .and(warp::path::end())
        .and(authenticated(server.session_service.clone()))
        .and_then(handler::me);

    let list_boards = warp::get()
        .and(warp::path("GetBoards"))
        .and(warp::path::end())
        .and(authenticated(server.session_service.clone()))
        .and(with(server.board_service.clone()))
        .and_then(handler::list_boards);

    let create_board = warp::post()
        .and(warp::path("CreateBoard"))
        .and(warp::path::end())
        .and(warp::body::json())
        .and(authenticated(server.session_service.clone()))
        .and(with(server.board_service.clone()))
        .and_then(handler::create_board);

    let update_board = warp::patch()
        .and(warp::path("boards"))
        .and(warp::path::param::<BoardId>())
        .and(warp::path::end())
        .and(warp::body::json())
        .and(authenticated(server.session_service.clone()))
        .and(with(server.board_service.clone()))
        .and_then(handler::update_board);

    let delete_board = warp::delete()
        .and(warp::path("boards"))
        .and(warp::path::param::<BoardId>())
        .and(warp::path::end())
        .and(authenticated(server.session_service.clone()))
        .and(with(server.board_service.clone()))
        .and_then(handler::delete_board);

    let list_tasks = warp::get()
        .and(warp::path("boards"))
        .and(warp::path::param::<BoardId>())
        .and(warp::path("GetTasks"))
        .and(warp::path::end())
        .and(warp::query::<TaskListQuery>())
        .and(authenticated(server.session_service.clone()))
        .and(with(server.task_service.clone()))
        .and_then(handler::list_tasks);

    let create_task = warp::post()
        .and(warp::path("boards"))
        .and(warp::path::param::<BoardId>())
        .and(warp::path("CreateTask"))
        .and(warp::path::end())
        .and(warp::body::json())
        .and(authenticated(server.session_service.clone()))
        .and(with(server.task_service.clone()))
        .and_then(handler::create_task);

    let update_task = warp::patch()
        .and(warp::path("boards"))
        .and(warp::path::param::<BoardId>())
        .and(warp::path("tasks"))
        .and(warp::path::param::<TaskId>())
        .and(warp::path::end())
        .and(warp::body::json())
        .and(authenticated(server.session_service.clone()))
        .and(with(server.task_service.clone()))
        .and_then(handler::update_task);

    let delete_task = warp::delete()
        .and(warp::path("boards"))
        .and(warp::path::param::<BoardId>())
        .and(warp::path("tasks"))
        .and(warp::path::param::<TaskId>())
        .and(warp::path::end())
        .and(authenticated(server.session_service.clone()))
        .and(with(server.task_service.clone()))
        .and_then(handler::delete_task);

    healthz
        .or(signup)
        .or(login)
        .or(refresh)
        .or(logout)
        .or(list_boards)
        .or(create_board)
        .or(update_board)
        .or(delete_board)
        .or(list_tasks)
        .or(create_task)
        .or(update_task)
        .or(delete_task)
        .or(me)
}

fn with<ServiceType>(
    service: Arc<ServiceType>,
) -> impl Filter<Extract = (Arc<ServiceType>,), Error = Infallible> + Clone
where
    ServiceType: Send + Sync + ?Sized,
{
    warp::any().map(move || service.clone())
}

/// Identity gate: resolves the bearer credential before any handler runs and
/// threads the caller's id into the handler's parameters. Requests without a
/// valid `Bearer` credential are rejected here and never reach a handler.
fn authenticated(
    session_service: Arc<dyn SessionService>,
) -> impl Filter<Extract = (UserId,), Error = warp::Rejection> + Clone {
    warp::header::optional::<String>("authorization").and_then(move |header: Option<String>| {
        let session_service = session_service.clone();
        async move {
            let token = header
                .as_deref()
                .and_then(|h| h.strip_prefix("Bearer "))
                .ok_or_else(|| reject::custom(ApiErrorCode::MissingCredential))?;
            let user_id = session_service
                .validate_access(token)
                .await
                .map_err(ApiErrorCode::from)
                .map_err(reject::custom)?;
            Ok::<UserId, warp::Rejection>(user_id)
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application_impl::{FakeAccountService, FakeSessionService};
    use crate::application_port::AccountService;
    use serde_json::{Value, json};

    /// The auth surface wired to fakes, enough to exercise the identity gate
    /// and the wire contracts end to end.
    fn auth_routes() -> impl Filter<Extract = (impl warp::Reply,), Error = Infallible> + Clone {
        let sessions: Arc<dyn SessionService> = Arc::new(FakeSessionService::new());
        let accounts: Arc<dyn AccountService> = Arc::new(FakeAccountService::new());

        let login = warp::post()
            .and(warp::path("login"))
            .and(warp::path::end())
            .and(warp::body::json())
            .and(with(accounts.clone()))
            .and_then(handler::login);

        let refresh = warp::post()
            .and(warp::path("refresh"))
            .and(warp::path::end())
            .and(warp::body::json())
            .and(with(sessions.clone()))
            .and_then(handler::refresh);

        let logout = warp::post()
            .and(warp::path("logout"))
            .and(warp::path::end())
            .and(warp::body::json())
            .and(with(sessions.clone()))
            .and_then(handler::logout);

        let me = warp::get()
            .and(warp::path("protected"))
            .and(warp::path("me"))
            .and(warp::path::end())
            .and(authenticated(sessions.clone()))
            .and_then(handler::me);

        login.or(refresh).or(logout).or(me).recover(recover_error)
    }

    #[tokio::test]
    async fn missing_authorization_header_is_rejected_before_handlers() {
        let res = warp::test::request()
            .method("GET")
            .path("/protected/me")
            .reply(&auth_routes())
            .await;
        assert_eq!(res.status(), 401);
        let body: Value = serde_json::from_slice(res.body()).expect("json body");
        assert_eq!(body["error"], "missing or invalid Authorization header");
    }

    #[tokio::test]
    async fn non_bearer_scheme_is_rejected() {
        let res = warp::test::request()
            .method("GET")
            .path("/protected/me")
            .header("authorization", "Basic dXNlcjpwdw==")
            .reply(&auth_routes())
            .await;
        assert_eq!(res.status(), 401);
    }

    #[tokio::test]
    async fn tampered_bearer_token_is_rejected() {
        let res = warp::test::request()
            .method("GET")
            .path("/protected/me")
            .header("authorization", "Bearer garbage")
            .reply(&auth_routes())
            .await;
        assert_eq!(res.status(), 401);
        let body: Value = serde_json::from_slice(res.body()).expect("json body");
        assert_eq!(body["error"], "invalid token");
    }

    #[tokio::test]
    async fn login_then_bearer_token_resolves_identity() {
        let routes = auth_routes();

        let res = warp::test::request()
            .method("POST")
            .path("/login")
            .json(&json!({"email": "someone@example.com", "password": "123456"}))
            .reply(&routes)
            .await;
        assert_eq!(res.status(), 200);
        let body: Value = serde_json::from_slice(res.body()).expect("json body");
        let access = body["access_token"].as_str().expect("access_token");
        assert!(body["refresh_token"].is_string());
        assert!(body["expires_in"].is_number());

        let expected: i64 = access
            .rsplit(':')
            .next()
            .and_then(|id| id.parse().ok())
            .expect("fake token carries the id");

        let res = warp::test::request()
            .method("GET")
            .path("/protected/me")
            .header("authorization", format!("Bearer {access}"))
            .reply(&routes)
            .await;
        assert_eq!(res.status(), 200);
        let body: Value = serde_json::from_slice(res.body()).expect("json body");
        assert_eq!(body["user_id"], expected);
    }

    #[tokio::test]
    async fn refresh_returns_the_login_shape() {
        let routes = auth_routes();

        let res = warp::test::request()
            .method("POST")
            .path("/refresh")
            .json(&json!({"refresh_token": "fake-refresh-token:7"}))
            .reply(&routes)
            .await;
        assert_eq!(res.status(), 200);
        let body: Value = serde_json::from_slice(res.body()).expect("json body");
        assert!(body["access_token"].is_string());
        assert!(body["refresh_token"].is_string());
        assert!(body["expires_in"].is_number());
    }

    #[tokio::test]
    async fn logout_reports_success_even_when_repeated() {
        let routes = auth_routes();

        for _ in 0..2 {
            let res = warp::test::request()
                .method("POST")
                .path("/logout")
                .json(&json!({"refresh_token": "fake-refresh-token:7"}))
                .reply(&routes)
                .await;
            assert_eq!(res.status(), 200);
            let body: Value = serde_json::from_slice(res.body()).expect("json body");
            assert_eq!(body["success"], true);
        }
    }
}
