use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use skywatch_core::{normalize_airport, Direction, FlightRecord};
use crate::{error::AppError, state::AppState};

const RECENT_FLIGHTS: i64 = 10;

/// Stored flight as exposed over HTTP
#[derive(Debug, Serialize, Deserialize)]
pub struct FlightView {
    pub airport_code: String,
    pub icao24: String,
    pub callsign: String,
    pub departure_airport: String,
    pub arrival_airport: String,
    pub time: i64,
    pub direction: Direction,
    pub timestamp_readable: String,
}

impl From<FlightRecord> for FlightView {
    fn from(record: FlightRecord) -> Self {
        let timestamp_readable = record.timestamp_readable();
        Self {
            airport_code: record.airport_code,
            icao24: record.icao24,
            callsign: record.callsign,
            departure_airport: record.departure_airport,
            arrival_airport: record.arrival_airport,
            time: record.time,
            direction: record.direction,
            timestamp_readable,
        }
    }
}

pub fn routes() -> Router<AppState> {
    Router::new().route("/flights/{airport}", get(recent_flights))
}

/// GET /flights/{airport}
/// Newest first
async fn recent_flights(
    State(state): State<AppState>,
    Path(airport): Path<String>,
) -> Result<Json<Vec<FlightView>>, AppError> {
    let airport = normalize_airport(&airport);
    let flights = state.flights.latest(&airport, RECENT_FLIGHTS).await?;
    Ok(Json(flights.into_iter().map(FlightView::from).collect()))
}
