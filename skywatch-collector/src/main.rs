use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use skywatch_collector::{app, AppState, IngestionWorker, WorkerSettings};
use skywatch_core::repository::{FlightRepository, InterestRepository};
use skywatch_core::{ExistenceVerifier, FailClosed};
use skywatch_proto::GrpcExistenceVerifier;
use skywatch_store::app_config::CollectorConfig;
use skywatch_store::{DbClient, OpenSkyClient, PgFlightRepository, PgInterestRepository};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    skywatch_shared::telemetry::init_tracing(
        "skywatch_collector=debug,skywatch_core=info,skywatch_store=info,skywatch_proto=info,tower_http=debug",
    );

    let config = CollectorConfig::load().context("Failed to load config")?;
    tracing::info!("Starting collection service");
    config.log_summary();

    let db = DbClient::connect_with_retry(&config.database, &config.startup.retry_policy())
        .await
        .context("Collection store unreachable, giving up")?;
    db.migrate_collection().await.context("Collection store migrations failed")?;

    let interests: Arc<dyn InterestRepository> = Arc::new(PgInterestRepository::new(db.pool.clone()));
    let flights: Arc<dyn FlightRepository> = Arc::new(PgFlightRepository::new(db.pool.clone()));

    let verifier: Arc<dyn ExistenceVerifier> = match GrpcExistenceVerifier::connect_lazy(
        &config.users.endpoint,
        Duration::from_millis(config.users.timeout_ms),
    ) {
        Ok(client) => Arc::new(client),
        Err(e) => {
            tracing::error!(
                "Invalid user service endpoint {}: {}. Every existence check will fail closed",
                config.users.endpoint,
                e
            );
            Arc::new(FailClosed)
        }
    };

    let source = OpenSkyClient::new(&config.opensky).context("Failed to build OpenSky client")?;
    let worker = IngestionWorker::new(
        interests.clone(),
        flights.clone(),
        Arc::new(source),
        WorkerSettings::from(&config.worker),
    );
    tokio::spawn(worker.run());

    let app = app(AppState::new(interests, flights, verifier));

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    tracing::info!("Listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    axum::serve(listener, app).await.context("HTTP server failed")?;

    Ok(())
}
