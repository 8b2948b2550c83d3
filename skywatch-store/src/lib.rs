pub mod app_config;
pub mod database;
pub mod user_repo;
pub mod interest_repo;
pub mod flight_repo;
pub mod opensky;
pub mod partner;

pub use database::DbClient;
pub use user_repo::PgUserRepository;
pub use interest_repo::PgInterestRepository;
pub use flight_repo::PgFlightRepository;
pub use opensky::{FeedError, OpenSkyClient};
pub use partner::CollectorClient;

use skywatch_core::CoreError;

pub(crate) fn persistence(err: sqlx::Error) -> CoreError {
    CoreError::PersistenceError(err.to_string())
}
