use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use tracing::info;
use skywatch_core::InterestOutcome;
use skywatch_shared::models::{InterestsDeleted, MessageResponse};
use skywatch_shared::pii::Masked;
use crate::{error::AppError, state::AppState};

#[derive(Debug, Deserialize)]
pub struct AddInterestRequest {
    pub email: Option<String>,
    #[serde(alias = "airport_code", alias = "resourceCode")]
    pub airport: Option<String>,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/interests", post(add_interest))
        .route("/interests/{email}", get(list_interests).delete(delete_interests))
}

/// POST /interests
/// 201 when created, 200 when the pair was already present
async fn add_interest(
    State(state): State<AppState>,
    payload: Result<Json<AddInterestRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<MessageResponse>), AppError> {
    let Json(body) = payload.map_err(|e| AppError::ValidationError(e.body_text()))?;
    let email = body.email.unwrap_or_default();
    let airport = body.airport.unwrap_or_default();

    let outcome = state.registrar.add_interest(&email, &airport).await?;
    let airport = skywatch_core::normalize_airport(&airport);

    Ok(match outcome {
        InterestOutcome::Created => (
            StatusCode::CREATED,
            Json(MessageResponse::new(format!("Interest added for {}", airport))),
        ),
        InterestOutcome::AlreadyExists => (
            StatusCode::OK,
            Json(MessageResponse::new(format!("Interest for {} already exists", airport))),
        ),
    })
}

/// GET /interests/{email}
/// Airport codes as a bare JSON array, sorted
async fn list_interests(
    State(state): State<AppState>,
    Path(email): Path<String>,
) -> Result<Json<Vec<String>>, AppError> {
    let airports = state.interests.list_for_user(&email).await?;
    Ok(Json(airports))
}

/// DELETE /interests/{email}
/// Cascade target of the identity service's user deletion
async fn delete_interests(
    State(state): State<AppState>,
    Path(email): Path<String>,
) -> Result<Json<InterestsDeleted>, AppError> {
    let deleted = state.interests.delete_for_user(&email).await?;
    info!("Removed {} interest(s) for {}", deleted, Masked(email.as_str()));

    Ok(Json(InterestsDeleted {
        message: format!("Deleted {} interests for {}", deleted, email),
        deleted,
    }))
}
