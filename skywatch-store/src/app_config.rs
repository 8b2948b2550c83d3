use serde::Deserialize;
use std::time::Duration;
use config::builder::DefaultState;
use config::{ConfigBuilder, ConfigError};
use sqlx::postgres::PgConnectOptions;
use tracing::info;
use skywatch_core::{RetryPolicy, RetryStrategy};

const ENV_PREFIX: &str = "SKYWATCH";

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: Option<String>,
    pub name: String,
    pub max_connections: u32,
}

impl DatabaseConfig {
    pub fn connect_options(&self) -> PgConnectOptions {
        let options = PgConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .username(&self.user)
            .database(&self.name);

        match &self.password {
            Some(password) => options.password(password),
            None => options,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct StartupConfig {
    pub max_attempts: u32,
    pub delay_ms: u64,
    pub strategy: RetryStrategy,
}

impl StartupConfig {
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.max_attempts,
            delay: Duration::from_millis(self.delay_ms),
            strategy: self.strategy,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct GrpcConfig {
    pub port: u16,
    pub max_workers: usize,
    pub request_timeout_ms: u64,
}

/// Identity service's link to the collection service (cascading delete)
#[derive(Debug, Deserialize, Clone)]
pub struct CollectorLinkConfig {
    pub base_url: String,
    pub timeout_ms: u64,
}

/// Collection service's link to the identity service (existence checks)
#[derive(Debug, Deserialize, Clone)]
pub struct UsersLinkConfig {
    pub endpoint: String,
    pub timeout_ms: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct OpenSkyConfig {
    pub api_url: String,
    pub token_url: String,
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub timeout_ms: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct WorkerConfig {
    pub interval_secs: u64,
    pub window_secs: u64,
    pub pacing_ms: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct UsersConfig {
    pub server: ServerConfig,
    pub grpc: GrpcConfig,
    pub database: DatabaseConfig,
    pub collector: CollectorLinkConfig,
    pub startup: StartupConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct CollectorConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub users: UsersLinkConfig,
    pub opensky: OpenSkyConfig,
    pub worker: WorkerConfig,
    pub startup: StartupConfig,
}

fn common_defaults(db_name: &str) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    config::Config::builder()
        .set_default("database.host", "db")?
        .set_default("database.port", 5432)?
        .set_default("database.user", "app_user")?
        .set_default("database.name", db_name)?
        .set_default("database.max_connections", 5)?
        .set_default("startup.max_attempts", 5)?
        .set_default("startup.delay_ms", 5000)?
        .set_default("startup.strategy", "fixed")
}

fn with_sources(
    builder: ConfigBuilder<DefaultState>,
    file: &str,
) -> ConfigBuilder<DefaultState> {
    builder
        // Optional, not checked in
        .add_source(config::File::with_name(file).required(false))
        // Eg. `SKYWATCH_DATABASE__HOST=localhost` sets `database.host`
        .add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__"),
        )
}

fn secret_state(value: &Option<String>) -> &'static str {
    match value {
        Some(v) if !v.is_empty() => "<set>",
        _ => "<unset>",
    }
}

impl UsersConfig {
    pub fn builder() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
        let defaults = common_defaults("user_db")?
            .set_default("server.port", 5000)?
            .set_default("grpc.port", 50051)?
            .set_default("grpc.max_workers", 10)?
            .set_default("grpc.request_timeout_ms", 5000)?
            .set_default("collector.base_url", "http://data-collector:5001")?
            .set_default("collector.timeout_ms", 2000)?;
        Ok(with_sources(defaults, "config/users"))
    }

    pub fn load() -> Result<Self, ConfigError> {
        Self::builder()?.build()?.try_deserialize()
    }

    pub fn log_summary(&self) {
        info!("server.port = {}", self.server.port);
        info!("grpc.port = {}, max_workers = {}, request_timeout_ms = {}",
            self.grpc.port, self.grpc.max_workers, self.grpc.request_timeout_ms);
        log_database(&self.database);
        info!("collector.base_url = {}, timeout_ms = {}",
            self.collector.base_url, self.collector.timeout_ms);
        log_startup(&self.startup);
    }
}

impl CollectorConfig {
    pub fn builder() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
        let defaults = common_defaults("data_db")?
            .set_default("server.port", 5001)?
            .set_default("users.endpoint", "http://user-manager:50051")?
            .set_default("users.timeout_ms", 5000)?
            .set_default("opensky.api_url", "https://opensky-network.org/api")?
            .set_default(
                "opensky.token_url",
                "https://auth.opensky-network.org/auth/realms/opensky-network/protocol/openid-connect/token",
            )?
            .set_default("opensky.timeout_ms", 10_000)?
            .set_default("worker.interval_secs", 3600)?
            .set_default("worker.window_secs", 3600)?
            .set_default("worker.pacing_ms", 2000)?;
        Ok(with_sources(defaults, "config/collector"))
    }

    pub fn load() -> Result<Self, ConfigError> {
        Self::builder()?.build()?.try_deserialize()
    }

    pub fn log_summary(&self) {
        info!("server.port = {}", self.server.port);
        log_database(&self.database);
        info!("users.endpoint = {}, timeout_ms = {}", self.users.endpoint, self.users.timeout_ms);
        info!("opensky.api_url = {}", self.opensky.api_url);
        info!("opensky.token_url = {}", self.opensky.token_url);
        info!("opensky.client_id = {}, client_secret = {}",
            self.opensky.client_id.as_deref().unwrap_or("<unset>"),
            secret_state(&self.opensky.client_secret));
        info!("worker.interval_secs = {}, window_secs = {}, pacing_ms = {}",
            self.worker.interval_secs, self.worker.window_secs, self.worker.pacing_ms);
        log_startup(&self.startup);
    }
}

fn log_database(db: &DatabaseConfig) {
    info!("database = {}@{}:{}/{} (password {}, pool {})",
        db.user, db.host, db.port, db.name, secret_state(&db.password), db.max_connections);
}

fn log_startup(startup: &StartupConfig) {
    info!("startup retry = {} attempts, {} ms, {:?}",
        startup.max_attempts, startup.delay_ms, startup.strategy);
}
