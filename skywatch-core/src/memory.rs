//! In-memory adapters for the repository and partner traits.
//!
//! Each store serialises its operations behind a single lock, which gives
//! the same atomicity the Postgres adapters get from transactions and
//! unique constraints. Used by tests and local wiring.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use async_trait::async_trait;
use chrono::Utc;
use parking_lot::Mutex;

use crate::analysis::FlightCounts;
use crate::deletion::InterestCleanup;
use crate::models::{
    Direction, FlightRecord, Interest, NaturalKey, NewUser, ProcessedRequest, RegistrationOutcome, User,
    REGISTER_USER,
};
use crate::repository::{FlightRepository, InterestRepository, UserRepository};
use crate::verifier::ExistenceVerifier;
use crate::CoreResult;

#[derive(Default)]
struct IdentityState {
    users: BTreeMap<String, User>,
    ledger: HashMap<String, ProcessedRequest>,
}

#[derive(Default)]
pub struct MemoryUserStore {
    state: Mutex<IdentityState>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn user_count(&self) -> usize {
        self.state.lock().users.len()
    }

    pub fn ledger_len(&self) -> usize {
        self.state.lock().ledger.len()
    }
}

#[async_trait]
impl UserRepository for MemoryUserStore {
    async fn register_once(
        &self,
        request_id: &str,
        user: &NewUser,
    ) -> CoreResult<RegistrationOutcome> {
        let mut state = self.state.lock();

        if state.ledger.contains_key(request_id) {
            return Ok(RegistrationOutcome::IdempotentReplay);
        }

        let now = Utc::now();
        let outcome = if state.users.contains_key(&user.email) {
            RegistrationOutcome::AlreadyExisted
        } else {
            state.users.insert(
                user.email.clone(),
                User {
                    email: user.email.clone(),
                    username: user.username.clone(),
                    created_at: now,
                },
            );
            RegistrationOutcome::Created
        };

        state.ledger.insert(
            request_id.to_string(),
            ProcessedRequest {
                request_id: request_id.to_string(),
                operation: REGISTER_USER.to_string(),
                created_at: now,
            },
        );

        Ok(outcome)
    }

    async fn exists(&self, email: &str) -> CoreResult<bool> {
        Ok(self.state.lock().users.contains_key(email))
    }

    async fn delete(&self, email: &str) -> CoreResult<u64> {
        Ok(self.state.lock().users.remove(email).map_or(0, |_| 1))
    }
}

/// Local verifier backed by the same store.
#[async_trait]
impl ExistenceVerifier for MemoryUserStore {
    async fn verify_exists(&self, email: &str) -> bool {
        self.state.lock().users.contains_key(email)
    }
}

#[derive(Default)]
pub struct MemoryInterestStore {
    rows: Mutex<BTreeSet<Interest>>,
}

impl MemoryInterestStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl InterestRepository for MemoryInterestStore {
    async fn insert(&self, email: &str, airport_code: &str) -> CoreResult<bool> {
        Ok(self
            .rows
            .lock()
            .insert(Interest {
                user_email: email.to_string(),
                airport_code: airport_code.to_string(),
            }))
    }

    async fn list_for_user(&self, email: &str) -> CoreResult<Vec<String>> {
        Ok(self
            .rows
            .lock()
            .iter()
            .filter(|i| i.user_email == email)
            .map(|i| i.airport_code.clone())
            .collect())
    }

    async fn delete_for_user(&self, email: &str) -> CoreResult<u64> {
        let mut rows = self.rows.lock();
        let before = rows.len();
        rows.retain(|i| i.user_email != email);
        Ok((before - rows.len()) as u64)
    }

    async fn monitored_airports(&self) -> CoreResult<Vec<String>> {
        let distinct: BTreeSet<String> = self.rows.lock().iter().map(|i| i.airport_code.clone()).collect();
        Ok(distinct.into_iter().collect())
    }
}

/// Cascade target when both services share one process.
#[async_trait]
impl InterestCleanup for MemoryInterestStore {
    async fn purge_interests(&self, email: &str) -> CoreResult<u64> {
        self.delete_for_user(email).await
    }
}

#[derive(Default)]
pub struct MemoryFlightStore {
    rows: Mutex<HashMap<NaturalKey, FlightRecord>>,
}

impl MemoryFlightStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.rows.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.lock().is_empty()
    }
}

#[async_trait]
impl FlightRepository for MemoryFlightStore {
    async fn insert_if_absent(&self, record: &FlightRecord) -> CoreResult<bool> {
        let mut rows = self.rows.lock();
        let key = record.natural_key();
        if rows.contains_key(&key) {
            return Ok(false);
        }
        rows.insert(key, record.clone());
        Ok(true)
    }

    async fn latest(&self, airport_code: &str, limit: i64) -> CoreResult<Vec<FlightRecord>> {
        let mut matching: Vec<FlightRecord> = self
            .rows
            .lock()
            .values()
            .filter(|r| r.airport_code == airport_code)
            .cloned()
            .collect();
        matching.sort_by(|a, b| b.time.cmp(&a.time));
        matching.truncate(limit.max(0) as usize);
        Ok(matching)
    }

    async fn counts_since(&self, airport_code: &str, since: i64) -> CoreResult<FlightCounts> {
        let rows = self.rows.lock();
        let mut counts = FlightCounts::default();
        for r in rows.values().filter(|r| r.airport_code == airport_code && r.time >= since) {
            counts.total += 1;
            match r.direction {
                Direction::Arrival => counts.arrivals += 1,
                Direction::Departure => counts.departures += 1,
            }
        }
        Ok(counts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(icao24: &str, time: i64, direction: Direction) -> FlightRecord {
        FlightRecord {
            airport_code: "LIRF".to_string(),
            icao24: icao24.to_string(),
            callsign: "AZA1".to_string(),
            departure_airport: "LIMC".to_string(),
            arrival_airport: "LIRF".to_string(),
            time,
            direction,
        }
    }

    #[tokio::test]
    async fn test_flight_natural_key_dedup() {
        let store = MemoryFlightStore::new();
        assert!(store.insert_if_absent(&record("a", 10, Direction::Arrival)).await.unwrap());
        assert!(!store.insert_if_absent(&record("a", 10, Direction::Arrival)).await.unwrap());
        assert!(store.insert_if_absent(&record("a", 11, Direction::Arrival)).await.unwrap());
        assert_eq!(store.len(), 2);
    }

    #[tokio::test]
    async fn test_latest_and_counts() {
        let store = MemoryFlightStore::new();
        store.insert_if_absent(&record("a", 10, Direction::Arrival)).await.unwrap();
        store.insert_if_absent(&record("b", 30, Direction::Departure)).await.unwrap();
        store.insert_if_absent(&record("c", 20, Direction::Arrival)).await.unwrap();

        let latest = store.latest("LIRF", 2).await.unwrap();
        assert_eq!(latest.iter().map(|r| r.time).collect::<Vec<_>>(), vec![30, 20]);

        let counts = store.counts_since("LIRF", 15).await.unwrap();
        assert_eq!(counts, FlightCounts { total: 2, arrivals: 1, departures: 1 });
        assert!(store.latest("EGLL", 10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_ledger_records_conflicts() {
        let store = MemoryUserStore::new();
        let user = NewUser { email: "a@x.com".into(), username: "a".into() };
        store.register_once("R1", &user).await.unwrap();
        store.register_once("R2", &user).await.unwrap();
        assert_eq!(store.user_count(), 1);
        assert_eq!(store.ledger_len(), 2);
    }
}
