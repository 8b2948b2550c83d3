use async_trait::async_trait;
use crate::analysis::FlightCounts;
use crate::models::{FlightRecord, NewUser, RegistrationOutcome};
use crate::CoreResult;

/// Identity store access
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Applies a registration at most once per `request_id`.
    ///
    /// The ledger lookup, the user insert and the ledger entry are one unit
    /// of work: a committed ledger entry implies the insert (or the conflict
    /// it reported) is durable. A concurrent attempt with the same
    /// `request_id` that loses the race on the ledger insert reports
    /// `IdempotentReplay` instead of failing.
    async fn register_once(
        &self,
        request_id: &str,
        user: &NewUser,
    ) -> CoreResult<RegistrationOutcome>;

    async fn exists(&self, email: &str) -> CoreResult<bool>;

    /// Returns the number of removed user rows.
    async fn delete(&self, email: &str) -> CoreResult<u64>;
}

/// Collection store access for interests
#[async_trait]
pub trait InterestRepository: Send + Sync {
    /// Returns `false` when the (email, airport) pair was already present.
    async fn insert(&self, email: &str, airport_code: &str) -> CoreResult<bool>;

    /// Airport codes followed by `email`, sorted ascending.
    async fn list_for_user(&self, email: &str) -> CoreResult<Vec<String>>;

    async fn delete_for_user(&self, email: &str) -> CoreResult<u64>;

    /// Distinct airport codes with at least one subscriber.
    async fn monitored_airports(&self) -> CoreResult<Vec<String>>;
}

/// Collection store access for flights
#[async_trait]
pub trait FlightRepository: Send + Sync {
    /// Inserts keyed by the natural key. Returns `false` if already stored.
    async fn insert_if_absent(&self, record: &FlightRecord) -> CoreResult<bool>;

    /// Newest first.
    async fn latest(&self, airport_code: &str, limit: i64) -> CoreResult<Vec<FlightRecord>>;

    async fn counts_since(&self, airport_code: &str, since: i64) -> CoreResult<FlightCounts>;
}
