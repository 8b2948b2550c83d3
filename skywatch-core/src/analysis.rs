use serde::Serialize;
use crate::{CoreError, CoreResult};

pub const DEFAULT_ANALYSIS_DAYS: i64 = 7;
const SECONDS_PER_DAY: i64 = 24 * 3600;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FlightCounts {
    pub total: i64,
    pub arrivals: i64,
    pub departures: i64,
}

/// Per-day averages over a trailing number of days
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct FlightAverages {
    pub airport: String,
    pub days_analyzed: i64,
    pub total_flights: i64,
    pub average_flights_per_day: f64,
    pub average_arrivals_per_day: f64,
    pub average_departures_per_day: f64,
}

/// Start of the analysis window for `days` back from `now` (unix seconds).
pub fn window_start(now: i64, days: i64) -> CoreResult<i64> {
    if days < 1 {
        return Err(CoreError::ValidationError(format!(
            "days must be at least 1, got {}",
            days
        )));
    }
    days.checked_mul(SECONDS_PER_DAY)
        .and_then(|span| now.checked_sub(span))
        .ok_or_else(|| CoreError::ValidationError(format!("days is too large: {}", days)))
}

impl FlightAverages {
    pub fn compute(airport: &str, days: i64, counts: FlightCounts) -> Self {
        let divisor = days.max(1) as f64;
        Self {
            airport: airport.to_string(),
            days_analyzed: days,
            total_flights: counts.total,
            average_flights_per_day: round2(counts.total as f64 / divisor),
            average_arrivals_per_day: round2(counts.arrivals as f64 / divisor),
            average_departures_per_day: round2(counts.departures as f64 / divisor),
        }
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_averages_rounded() {
        let counts = FlightCounts { total: 10, arrivals: 4, departures: 6 };
        let avg = FlightAverages::compute("LIRF", 3, counts);

        assert_eq!(avg.total_flights, 10);
        assert_eq!(avg.average_flights_per_day, 3.33);
        assert_eq!(avg.average_arrivals_per_day, 1.33);
        assert_eq!(avg.average_departures_per_day, 2.0);
    }

    #[test]
    fn test_empty_counts() {
        let avg = FlightAverages::compute("LIRF", DEFAULT_ANALYSIS_DAYS, FlightCounts::default());
        assert_eq!(avg.average_flights_per_day, 0.0);
        assert_eq!(avg.days_analyzed, 7);
    }

    #[test]
    fn test_window_start() {
        assert_eq!(window_start(1_000_000, 1).unwrap(), 1_000_000 - 86_400);
        assert!(matches!(window_start(1_000_000, 0), Err(CoreError::ValidationError(_))));
        assert!(matches!(window_start(1_000_000, -3), Err(CoreError::ValidationError(_))));
    }

    #[test]
    fn test_window_start_rejects_overflowing_days() {
        assert!(matches!(
            window_start(1_700_000_000, i64::MAX / 1000),
            Err(CoreError::ValidationError(_))
        ));
        assert!(matches!(
            window_start(i64::MIN + 1, 2),
            Err(CoreError::ValidationError(_))
        ));
        assert!(window_start(1_700_000_000, 36_500).is_ok());
    }
}
