use std::future::IntoFuture;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use skywatch_core::repository::UserRepository;
use skywatch_store::app_config::UsersConfig;
use skywatch_store::{CollectorClient, DbClient, PgUserRepository};
use skywatch_users::{app, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    skywatch_shared::telemetry::init_tracing(
        "skywatch_users=debug,skywatch_core=info,skywatch_proto=info,tower_http=debug",
    );

    let config = UsersConfig::load().context("Failed to load config")?;
    tracing::info!("Starting identity service");
    config.log_summary();

    let db = DbClient::connect_with_retry(&config.database, &config.startup.retry_policy())
        .await
        .context("Identity store unreachable, giving up")?;
    db.migrate_identity().await.context("Identity store migrations failed")?;

    let users: Arc<dyn UserRepository> = Arc::new(PgUserRepository::new(db.pool.clone()));
    let cleanup = CollectorClient::new(
        &config.collector.base_url,
        Duration::from_millis(config.collector.timeout_ms),
    )?;

    let grpc_addr = SocketAddr::from(([0, 0, 0, 0], config.grpc.port));
    let grpc = tokio::spawn(skywatch_proto::serve(
        grpc_addr,
        users.clone(),
        config.grpc.max_workers,
        Duration::from_millis(config.grpc.request_timeout_ms),
    ));

    let app = app(AppState::new(users, Arc::new(cleanup)));

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    tracing::info!("Listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    tokio::select! {
        result = axum::serve(listener, app).into_future() => {
            result.context("HTTP server failed")?;
        }
        result = grpc => {
            result.context("gRPC server task aborted")?.context("gRPC server failed")?;
        }
    }

    Ok(())
}
