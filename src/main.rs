use std::sync::Arc;
use taskboard::api;
use taskboard::logger::*;
use taskboard::server::*;
use taskboard::settings::*;
use tokio::signal;
use warp::Filter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let logger = Logger::new_bootstrap();

    let project_settings = parse_settings(cli.settings.as_deref())?;
    info!(?project_settings);
    let logger_config = LogConfig {
        filter: project_settings.log.filter.clone(),
    };
    logger.reload_from_config(&logger_config)?;

    let address: std::net::SocketAddr = project_settings.http.address.parse()?;

    let server = Arc::new(Server::try_new(&project_settings).await?);

    let cors = warp::cors()
        .allow_origin(project_settings.http.cors_origin.as_str())
        .allow_methods(["GET", "POST", "PUT", "DELETE", "PATCH", "OPTIONS"])
        .allow_headers(["accept", "authorization", "content-type", "x-csrf-token"])
        .allow_credentials(true);

    let access_log = warp::log::custom(|info| {
        tracing::info!(
            "{} {} {} in {:?}",
            info.method(),
            info.path(),
            info.status(),
            info.elapsed()
        );
    });

    let api_v1 = warp::path("api")
        .and(warp::path("v1"))
        .and(api::v1::routes(server.clone()))
        .recover(api::v1::recover_error)
        .with(cors)
        .with(access_log);

    warp::serve(api_v1)
        .bind_with_graceful_shutdown(address, async {
            signal::ctrl_c().await.expect("Could not register SIGINT");
        })
        .1
        .await;

    let shutdown_timeout = std::time::Duration::from_secs(30);
    match tokio::time::timeout(shutdown_timeout, server.shutdown()).await {
        Ok(_) => tracing::info!("server shutdown successfully"),
        Err(_) => tracing::error!("server shutdown timed out"),
    }

    Ok(())
}
