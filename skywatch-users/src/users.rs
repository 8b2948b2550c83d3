use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::{HeaderMap, StatusCode},
    routing::{delete, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use skywatch_core::RegistrationOutcome;
use crate::{error::AppError, state::AppState, REQUEST_ID_HEADER};

#[derive(Debug, Deserialize)]
pub struct RegisterUserRequest {
    pub email: Option<String>,
    pub username: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RegisterUserResponse {
    pub message: String,
    pub status: RegistrationOutcome,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DeleteUserResponse {
    pub message: String,
    pub deleted: u64,
    pub interests_removed: Option<u64>,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/users", post(register_user))
        .route("/users/{email}", delete(delete_user))
}

/// POST /users
/// Registers a user at most once per `X-Request-ID`
async fn register_user(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<RegisterUserRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<RegisterUserResponse>), AppError> {
    let request_id = match headers.get(REQUEST_ID_HEADER) {
        Some(value) => Some(value.to_str().map_err(|_| {
            AppError::ValidationError("X-Request-ID header is not valid text".to_string())
        })?),
        None => None,
    };
    if request_id.map_or(true, |id| id.trim().is_empty()) {
        return Err(AppError::ValidationError("Missing X-Request-ID header".to_string()));
    }

    let Json(body) = payload.map_err(|e| AppError::ValidationError(e.body_text()))?;
    let email = body.email.unwrap_or_default();
    let username = body.username.unwrap_or_default();

    let outcome = state
        .registration
        .register(request_id, &email, &username)
        .await?;

    let status = match outcome {
        RegistrationOutcome::Created => StatusCode::CREATED,
        RegistrationOutcome::AlreadyExisted | RegistrationOutcome::IdempotentReplay => StatusCode::OK,
    };

    Ok((
        status,
        Json(RegisterUserResponse {
            message: outcome.message().to_string(),
            status: outcome,
        }),
    ))
}

/// DELETE /users/{email}
/// Removes the user; interest cleanup on the collector is best-effort
async fn delete_user(
    State(state): State<AppState>,
    Path(email): Path<String>,
) -> Result<Json<DeleteUserResponse>, AppError> {
    let report = state.deletion.delete_user(&email).await?;

    let message = match report.interests_removed {
        Some(count) => format!(
            "Deleted {} user(s) for {}; removed {} interest(s)",
            report.users_deleted, email, count
        ),
        None => format!(
            "Deleted {} user(s) for {}; interest cleanup not confirmed",
            report.users_deleted, email
        ),
    };

    Ok(Json(DeleteUserResponse {
        message,
        deleted: report.users_deleted,
        interests_removed: report.interests_removed,
    }))
}
