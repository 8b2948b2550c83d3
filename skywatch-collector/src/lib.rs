use axum::Router;
use tower_http::trace::TraceLayer;

pub mod analysis;
pub mod error;
pub mod flights;
pub mod interests;
pub mod state;
pub mod worker;

pub use state::AppState;
pub use worker::{CycleReport, IngestionWorker, WorkerSettings};

pub fn app(state: AppState) -> Router {
    Router::new()
        .merge(interests::routes())
        .merge(flights::routes())
        .merge(analysis::routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
