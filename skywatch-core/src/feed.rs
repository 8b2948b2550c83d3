use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use crate::models::{Direction, FlightObservation};
use crate::CoreResult;

/// Trailing window `[begin, end]` in unix seconds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    pub begin: i64,
    pub end: i64,
}

impl TimeWindow {
    pub fn trailing(now: DateTime<Utc>, length: Duration) -> Self {
        let end = now.timestamp();
        Self {
            begin: end - length.num_seconds(),
            end,
        }
    }
}

/// External flight data source.
///
/// A "no flights" answer is `Ok(vec![])`. Rate limiting, bad statuses,
/// credential and transport failures are `ExternalSourceError`.
#[async_trait]
pub trait FlightSource: Send + Sync {
    async fn fetch(
        &self,
        airport_code: &str,
        direction: Direction,
        window: TimeWindow,
    ) -> CoreResult<Vec<FlightObservation>>;
}
