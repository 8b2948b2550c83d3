use axum::{
    extract::{rejection::QueryRejection, Path, Query, State},
    routing::get,
    Json, Router,
};
use chrono::Utc;
use serde::Deserialize;
use skywatch_core::analysis::{window_start, FlightAverages, DEFAULT_ANALYSIS_DAYS};
use skywatch_core::normalize_airport;
use crate::{error::AppError, flights::FlightView, state::AppState};

#[derive(Debug, Deserialize)]
pub struct AverageParams {
    pub days: Option<i64>,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/analysis/last_flight/{airport}", get(last_flight))
        .route("/analysis/average_flights/{airport}", get(average_flights))
}

/// GET /analysis/last_flight/{airport}
async fn last_flight(
    State(state): State<AppState>,
    Path(airport): Path<String>,
) -> Result<Json<FlightView>, AppError> {
    let airport = normalize_airport(&airport);
    let latest = state.flights.latest(&airport, 1).await?;

    latest
        .into_iter()
        .next()
        .map(|record| Json(FlightView::from(record)))
        .ok_or_else(|| AppError::NotFoundError("No flights found".to_string()))
}

/// GET /analysis/average_flights/{airport}?days=N
async fn average_flights(
    State(state): State<AppState>,
    Path(airport): Path<String>,
    params: Result<Query<AverageParams>, QueryRejection>,
) -> Result<Json<FlightAverages>, AppError> {
    let Query(params) = params.map_err(|e| AppError::ValidationError(e.body_text()))?;
    let airport = normalize_airport(&airport);
    let days = params.days.unwrap_or(DEFAULT_ANALYSIS_DAYS);
    let since = window_start(Utc::now().timestamp(), days)?;

    let counts = state.flights.counts_since(&airport, since).await?;
    Ok(Json(FlightAverages::compute(&airport, days, counts)))
}
