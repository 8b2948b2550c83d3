pub mod pii;
pub mod models;
pub mod telemetry;
