use async_trait::async_trait;
use sqlx::PgPool;
use skywatch_core::analysis::FlightCounts;
use skywatch_core::repository::FlightRepository;
use skywatch_core::{CoreError, CoreResult, Direction, FlightRecord};
use crate::persistence;

pub struct PgFlightRepository {
    pool: PgPool,
}

impl PgFlightRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct FlightRow {
    airport_code: String,
    icao24: String,
    callsign: String,
    departure_airport: String,
    arrival_airport: String,
    event_time: i64,
    direction: String,
}

impl TryFrom<FlightRow> for FlightRecord {
    type Error = CoreError;

    fn try_from(row: FlightRow) -> Result<Self, Self::Error> {
        let direction = Direction::parse(&row.direction).ok_or_else(|| {
            CoreError::PersistenceError(format!("Unknown flight direction: {}", row.direction))
        })?;

        Ok(FlightRecord {
            airport_code: row.airport_code,
            icao24: row.icao24,
            callsign: row.callsign,
            departure_airport: row.departure_airport,
            arrival_airport: row.arrival_airport,
            time: row.event_time,
            direction,
        })
    }
}

#[derive(sqlx::FromRow)]
struct CountsRow {
    total: i64,
    arrivals: i64,
    departures: i64,
}

#[async_trait]
impl FlightRepository for PgFlightRepository {
    async fn insert_if_absent(&self, record: &FlightRecord) -> CoreResult<bool> {
        let result = sqlx::query(
            r#"
            INSERT INTO flights
                (airport_code, icao24, callsign, event_time, direction, departure_airport, arrival_airport)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (icao24, event_time, departure_airport, arrival_airport) DO NOTHING
            "#,
        )
        .bind(&record.airport_code)
        .bind(&record.icao24)
        .bind(&record.callsign)
        .bind(record.time)
        .bind(record.direction.as_str())
        .bind(&record.departure_airport)
        .bind(&record.arrival_airport)
        .execute(&self.pool)
        .await
        .map_err(persistence)?;

        Ok(result.rows_affected() > 0)
    }

    async fn latest(&self, airport_code: &str, limit: i64) -> CoreResult<Vec<FlightRecord>> {
        let rows: Vec<FlightRow> = sqlx::query_as(
            r#"
            SELECT airport_code, icao24, callsign, departure_airport, arrival_airport, event_time, direction
            FROM flights
            WHERE airport_code = $1
            ORDER BY event_time DESC
            LIMIT $2
            "#,
        )
        .bind(airport_code)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(persistence)?;

        rows.into_iter().map(FlightRecord::try_from).collect()
    }

    async fn counts_since(&self, airport_code: &str, since: i64) -> CoreResult<FlightCounts> {
        let row: CountsRow = sqlx::query_as(
            r#"
            SELECT
                COUNT(*) AS total,
                COUNT(*) FILTER (WHERE direction = 'ARRIVAL') AS arrivals,
                COUNT(*) FILTER (WHERE direction = 'DEPARTURE') AS departures
            FROM flights
            WHERE airport_code = $1 AND event_time >= $2
            "#,
        )
        .bind(airport_code)
        .bind(since)
        .fetch_one(&self.pool)
        .await
        .map_err(persistence)?;

        Ok(FlightCounts {
            total: row.total,
            arrivals: row.arrivals,
            departures: row.departures,
        })
    }
}
