use serde::{Deserialize, Serialize};
use chrono::{DateTime, TimeZone, Utc};

/// Ledger tag for the user registration write path
pub const REGISTER_USER: &str = "REGISTER_USER";

/// A registered user, keyed by email. Never updated in place.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct User {
    pub email: String,
    pub username: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub email: String,
    pub username: String,
}

/// Dedup ledger entry. Presence means the guarded write was already applied.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessedRequest {
    pub request_id: String,
    pub operation: String,
    pub created_at: DateTime<Utc>,
}

/// Outward classification of a registration attempt
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RegistrationOutcome {
    Created,
    AlreadyExisted,
    IdempotentReplay,
}

impl RegistrationOutcome {
    pub fn message(&self) -> &'static str {
        match self {
            RegistrationOutcome::Created => "User registered successfully",
            RegistrationOutcome::AlreadyExisted => "User already exists",
            RegistrationOutcome::IdempotentReplay => "User registered successfully (Idempotent replay)",
        }
    }
}

/// A user's subscription to an airport. Unique on (user_email, airport_code).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
pub struct Interest {
    pub user_email: String,
    pub airport_code: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InterestOutcome {
    Created,
    AlreadyExists,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Direction {
    Arrival,
    Departure,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Arrival => "ARRIVAL",
            Direction::Departure => "DEPARTURE",
        }
    }

    /// Path segment used by the OpenSky flights endpoints
    pub fn endpoint(&self) -> &'static str {
        match self {
            Direction::Arrival => "arrival",
            Direction::Departure => "departure",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "ARRIVAL" => Some(Direction::Arrival),
            "DEPARTURE" => Some(Direction::Departure),
            _ => None,
        }
    }
}

/// Raw flight object as returned by the external feed
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct FlightObservation {
    pub icao24: Option<String>,
    pub callsign: Option<String>,
    pub first_seen: Option<i64>,
    pub last_seen: Option<i64>,
    pub est_departure_airport: Option<String>,
    pub est_arrival_airport: Option<String>,
}

/// A stored flight. The natural key (icao24, time, departure_airport,
/// arrival_airport) is the dedup key, not a surrogate id.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FlightRecord {
    pub airport_code: String,
    pub icao24: String,
    pub callsign: String,
    pub departure_airport: String,
    pub arrival_airport: String,
    pub time: i64,
    pub direction: Direction,
}

pub type NaturalKey = (String, i64, String, String);

impl FlightRecord {
    /// Maps a feed observation onto a record for `airport_code`.
    /// Returns `None` when the observation cannot form a natural key.
    pub fn from_observation(
        airport_code: &str,
        direction: Direction,
        obs: &FlightObservation,
    ) -> Option<Self> {
        let icao24 = obs.icao24.as_deref().map(str::trim).filter(|s| !s.is_empty())?;
        let time = match direction {
            Direction::Departure => obs.first_seen,
            Direction::Arrival => obs.last_seen,
        }?;

        let callsign = obs
            .callsign
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or("N/A");

        Some(Self {
            airport_code: airport_code.to_string(),
            icao24: icao24.to_string(),
            callsign: callsign.to_string(),
            departure_airport: obs.est_departure_airport.clone().unwrap_or_default(),
            arrival_airport: obs.est_arrival_airport.clone().unwrap_or_default(),
            time,
            direction,
        })
    }

    pub fn natural_key(&self) -> NaturalKey {
        (
            self.icao24.clone(),
            self.time,
            self.departure_airport.clone(),
            self.arrival_airport.clone(),
        )
    }

    pub fn timestamp_readable(&self) -> String {
        match Utc.timestamp_opt(self.time, 0).single() {
            Some(dt) => dt.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
            None => String::new(),
        }
    }
}
