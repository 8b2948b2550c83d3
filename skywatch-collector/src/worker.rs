use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::time::sleep;
use tracing::{debug, error, info, warn};

use skywatch_core::feed::{FlightSource, TimeWindow};
use skywatch_core::repository::{FlightRepository, InterestRepository};
use skywatch_core::{CoreResult, Direction, FlightRecord};
use skywatch_store::app_config::WorkerConfig;

const DIRECTIONS: [Direction; 2] = [Direction::Arrival, Direction::Departure];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkerSettings {
    /// Sleep between cycles
    pub interval: Duration,
    /// Trailing window queried per airport
    pub window: Duration,
    /// Delay after every external call
    pub pacing: Duration,
}

impl From<&WorkerConfig> for WorkerSettings {
    fn from(config: &WorkerConfig) -> Self {
        Self {
            interval: Duration::from_secs(config.interval_secs),
            window: Duration::from_secs(config.window_secs),
            pacing: Duration::from_millis(config.pacing_ms),
        }
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CycleReport {
    pub airports: usize,
    pub fetched: usize,
    pub saved: usize,
    pub failed_fetches: usize,
}

/// Periodic collector for every monitored airport.
///
/// Cycles run strictly one after another. The store is the only state
/// shared with the request path.
pub struct IngestionWorker {
    interests: Arc<dyn InterestRepository>,
    flights: Arc<dyn FlightRepository>,
    source: Arc<dyn FlightSource>,
    settings: WorkerSettings,
}

impl IngestionWorker {
    pub fn new(
        interests: Arc<dyn InterestRepository>,
        flights: Arc<dyn FlightRepository>,
        source: Arc<dyn FlightSource>,
        settings: WorkerSettings,
    ) -> Self {
        Self { interests, flights, source, settings }
    }

    /// Runs for the lifetime of the process.
    pub async fn run(self) {
        info!(
            "Ingestion worker started (interval {:?}, window {:?}, pacing {:?})",
            self.settings.interval, self.settings.window, self.settings.pacing
        );

        loop {
            match self.run_cycle(Utc::now()).await {
                Ok(report) if report.airports == 0 => {
                    info!("No monitored airports, sleeping {:?}", self.settings.interval);
                }
                Ok(report) => {
                    info!(
                        "Cycle finished: {} airport(s), {} fetched, {} new, {} failed fetch(es). Sleeping {:?}",
                        report.airports,
                        report.fetched,
                        report.saved,
                        report.failed_fetches,
                        self.settings.interval
                    );
                }
                Err(e) => error!("Cycle aborted, monitored airports unavailable: {}", e),
            }
            sleep(self.settings.interval).await;
        }
    }

    /// One pass over the monitored airports with the window ending at `now`.
    ///
    /// Only a failure to read the monitored set is returned; fetch and
    /// insert failures are logged and the next airport is processed.
    pub async fn run_cycle(&self, now: DateTime<Utc>) -> CoreResult<CycleReport> {
        let airports = self.interests.monitored_airports().await?;
        let mut report = CycleReport { airports: airports.len(), ..Default::default() };
        if airports.is_empty() {
            return Ok(report);
        }

        let length = chrono::Duration::seconds(self.settings.window.as_secs() as i64);
        let window = TimeWindow::trailing(now, length);
        info!("Collecting {:?} for window {} - {}", airports, window.begin, window.end);

        for airport in &airports {
            if let Err(e) = self.collect_airport(airport, window, &mut report).await {
                error!("Storing flights for {} failed, moving on: {}", airport, e);
            }
        }

        Ok(report)
    }

    async fn collect_airport(
        &self,
        airport: &str,
        window: TimeWindow,
        report: &mut CycleReport,
    ) -> CoreResult<()> {
        for direction in DIRECTIONS {
            let observations = match self.source.fetch(airport, direction, window).await {
                Ok(observations) => observations,
                Err(e) => {
                    warn!("{} fetch for {} failed, treating as empty: {}", direction.as_str(), airport, e);
                    report.failed_fetches += 1;
                    Vec::new()
                }
            };
            sleep(self.settings.pacing).await;

            report.fetched += observations.len();
            let mut saved = 0;
            for obs in &observations {
                let Some(record) = FlightRecord::from_observation(airport, direction, obs) else {
                    debug!("Skipping {} observation without icao24 or timestamp", airport);
                    continue;
                };
                if self.flights.insert_if_absent(&record).await? {
                    saved += 1;
                }
            }
            report.saved += saved;

            if !observations.is_empty() {
                info!("{}: {} new {} record(s) of {}", airport, saved, direction.as_str(), observations.len());
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use skywatch_core::analysis::FlightCounts;
    use skywatch_core::memory::{MemoryFlightStore, MemoryInterestStore};
    use skywatch_core::{CoreError, FlightObservation};
    use chrono::TimeZone;
    use parking_lot::Mutex;

    /// Answers every arrival query with the same single flight; "EGLL"
    /// is rate limited.
    #[derive(Default)]
    struct ScriptedSource {
        calls: Mutex<Vec<(String, Direction)>>,
    }

    impl ScriptedSource {
        fn calls(&self) -> Vec<(String, Direction)> {
            self.calls.lock().clone()
        }
    }

    #[async_trait]
    impl FlightSource for ScriptedSource {
        async fn fetch(
            &self,
            airport_code: &str,
            direction: Direction,
            _window: TimeWindow,
        ) -> CoreResult<Vec<FlightObservation>> {
            self.calls.lock().push((airport_code.to_string(), direction));
            if airport_code == "EGLL" {
                return Err(CoreError::ExternalSourceError("rate limit hit for EGLL".into()));
            }
            if direction == Direction::Departure {
                return Ok(Vec::new());
            }
            Ok(vec![FlightObservation {
                icao24: Some("4ca7b5".into()),
                first_seen: Some(1_700_000_100),
                last_seen: Some(1_700_003_000),
                est_departure_airport: Some("EIDW".into()),
                est_arrival_airport: Some(airport_code.into()),
                callsign: Some("RYR4FK ".into()),
            }])
        }
    }

    struct BrokenFlights;

    #[async_trait]
    impl FlightRepository for BrokenFlights {
        async fn insert_if_absent(&self, _record: &FlightRecord) -> CoreResult<bool> {
            Err(CoreError::PersistenceError("connection reset".into()))
        }

        async fn latest(&self, _airport_code: &str, _limit: i64) -> CoreResult<Vec<FlightRecord>> {
            Ok(Vec::new())
        }

        async fn counts_since(&self, _airport_code: &str, _since: i64) -> CoreResult<FlightCounts> {
            Ok(FlightCounts::default())
        }
    }

    fn settings() -> WorkerSettings {
        WorkerSettings {
            interval: Duration::from_secs(3600),
            window: Duration::from_secs(3600),
            pacing: Duration::ZERO,
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_003_600, 0).unwrap()
    }

    async fn interests_for(codes: &[&str]) -> Arc<MemoryInterestStore> {
        let interests = Arc::new(MemoryInterestStore::new());
        for code in codes {
            interests.insert("a@x.com", code).await.unwrap();
        }
        interests
    }

    #[tokio::test]
    async fn test_refetch_across_cycles_is_deduplicated() {
        let flights = Arc::new(MemoryFlightStore::new());
        let source = Arc::new(ScriptedSource::default());
        let worker = IngestionWorker::new(interests_for(&["LIRF"]).await, flights.clone(), source, settings());

        let first = worker.run_cycle(now()).await.unwrap();
        let second = worker.run_cycle(now()).await.unwrap();

        assert_eq!(first.saved, 1);
        assert_eq!(second.fetched, 1);
        assert_eq!(second.saved, 0);
        assert_eq!(flights.len(), 1);

        let stored = flights.latest("LIRF", 10).await.unwrap();
        assert_eq!(stored[0].time, 1_700_003_000);
        assert_eq!(stored[0].callsign, "RYR4FK");
    }

    #[tokio::test]
    async fn test_rate_limited_airport_does_not_stop_cycle() {
        let flights = Arc::new(MemoryFlightStore::new());
        let source = Arc::new(ScriptedSource::default());
        let worker = IngestionWorker::new(
            interests_for(&["EGLL", "LIRF"]).await,
            flights.clone(),
            source.clone(),
            settings(),
        );

        let report = worker.run_cycle(now()).await.unwrap();

        assert_eq!(report.airports, 2);
        assert_eq!(report.failed_fetches, 2);
        assert_eq!(report.saved, 1);
        assert!(flights.latest("EGLL", 10).await.unwrap().is_empty());
        assert_eq!(flights.latest("LIRF", 10).await.unwrap().len(), 1);
        assert_eq!(
            source.calls(),
            vec![
                ("EGLL".to_string(), Direction::Arrival),
                ("EGLL".to_string(), Direction::Departure),
                ("LIRF".to_string(), Direction::Arrival),
                ("LIRF".to_string(), Direction::Departure),
            ]
        );
    }

    #[tokio::test]
    async fn test_no_subscribers_means_no_fetch() {
        let source = Arc::new(ScriptedSource::default());
        let worker = IngestionWorker::new(
            Arc::new(MemoryInterestStore::new()),
            Arc::new(MemoryFlightStore::new()),
            source.clone(),
            settings(),
        );

        let report = worker.run_cycle(now()).await.unwrap();

        assert_eq!(report, CycleReport::default());
        assert!(source.calls().is_empty());
    }

    #[tokio::test]
    async fn test_persistence_failure_moves_to_next_airport() {
        let source = Arc::new(ScriptedSource::default());
        let worker = IngestionWorker::new(
            interests_for(&["LIMC", "LIRF"]).await,
            Arc::new(BrokenFlights),
            source.clone(),
            settings(),
        );

        let report = worker.run_cycle(now()).await.unwrap();

        assert_eq!(report.saved, 0);
        // The failed insert skips LIMC's departure query but LIRF is still visited
        assert_eq!(
            source.calls(),
            vec![
                ("LIMC".to_string(), Direction::Arrival),
                ("LIRF".to_string(), Direction::Arrival),
            ]
        );
    }

    #[test]
    fn test_settings_from_config() {
        let config = WorkerConfig { interval_secs: 3600, window_secs: 1800, pacing_ms: 2000 };
        let settings = WorkerSettings::from(&config);
        assert_eq!(settings.interval, Duration::from_secs(3600));
        assert_eq!(settings.window, Duration::from_secs(1800));
        assert_eq!(settings.pacing, Duration::from_secs(2));
    }
}
