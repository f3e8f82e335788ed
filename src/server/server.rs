use crate::application_impl::*;
use crate::application_port::*;
use crate::domain_port::*;
use crate::infra_mysql::*;
use crate::infra_redis::*;
use crate::logger::*;
use crate::settings::Settings;
use sqlx::{MySql, Pool};
use std::sync::Arc;

pub struct Server {
    pub session_service: Arc<dyn SessionService>,
    pub account_service: Arc<dyn AccountService>,
    pub board_service: Arc<dyn BoardService>,
    pub task_service: Arc<dyn TaskService>,
    pool: Pool<MySql>,
}

impl Server {
    pub async fn try_new(settings: &Settings) -> anyhow::Result<Self> {
        let pool = Pool::<MySql>::connect(&settings.mysql.dsn).await?;
        sqlx::migrate!("./migrations").run(&pool).await?;

        let user_repo: Arc<dyn UserRepo> = Arc::new(MySqlUserRepo::new(pool.clone()));
        let board_repo: Arc<dyn BoardRepo> = Arc::new(MySqlBoardRepo::new(pool.clone()));
        let task_repo: Arc<dyn TaskRepo> = Arc::new(MySqlTaskRepo::new(pool.clone()));

        let (session_service, account_service): (Arc<dyn SessionService>, Arc<dyn AccountService>) =
            match settings.auth.backend.as_str() {
                "fake" => (
                    Arc::new(FakeSessionService::new()),
                    Arc::new(FakeAccountService::new()),
                ),
                "real" => {
                    let access_secret = require_secret("JWT_ACCESS_SECRET")?;
                    let refresh_secret = require_secret("JWT_REFRESH_SECRET")?;
                    let access_ttl = humantime::parse_duration(&settings.auth.access_ttl)?;
                    let refresh_ttl = humantime::parse_duration(&settings.auth.refresh_ttl)?;

                    let redis_client = redis::Client::open(settings.redis.dsn.as_str())?;
                    let redis_manager = redis_client.get_connection_manager().await?;
                    let session_store: Arc<dyn RefreshSessionStore> =
                        Arc::new(RedisSessionStore::new(redis_manager, "refresh"));

                    let token_codec: Arc<dyn TokenCodec> =
                        Arc::new(JwtTokenCodec::new(JwtConfig {
                            access_secret,
                            refresh_secret,
                            access_ttl,
                            refresh_ttl,
                        }));
                    let credential_hasher: Arc<dyn CredentialHasher> =
                        Arc::new(Argon2PasswordHasher {});

                    let sessions: Arc<dyn SessionService> = Arc::new(RealSessionService::new(
                        token_codec,
                        session_store,
                        access_ttl,
                    ));
                    let accounts: Arc<dyn AccountService> = Arc::new(RealAccountService::new(
                        user_repo.clone(),
                        credential_hasher,
                        sessions.clone(),
                    ));
                    (sessions, accounts)
                }
                other => return Err(anyhow::anyhow!("Unknown auth backend: {}", other)),
            };

        let board_service: Arc<dyn BoardService> = Arc::new(RealBoardService::new(board_repo));
        let task_service: Arc<dyn TaskService> = Arc::new(RealTaskService::new(task_repo));

        info!("server started");

        Ok(Self {
            session_service,
            account_service,
            board_service,
            task_service,
            pool,
        })
    }

    pub async fn shutdown(&self) {
        info!("server shutting down...");
        self.pool.close().await;
    }
}

fn require_secret(name: &str) -> anyhow::Result<Vec<u8>> {
    let value = std::env::var(name).unwrap_or_default();
    if value.is_empty() {
        return Err(anyhow::anyhow!("{} must be set and non-empty", name));
    }
    Ok(value.into_bytes())
}
