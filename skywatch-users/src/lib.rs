use axum::Router;
use tower_http::trace::TraceLayer;

pub mod error;
pub mod state;
pub mod users;

pub use state::AppState;

/// Request identifier header for at-most-once registration
pub const REQUEST_ID_HEADER: &str = "x-request-id";

pub fn app(state: AppState) -> Router {
    Router::new()
        .merge(users::routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
