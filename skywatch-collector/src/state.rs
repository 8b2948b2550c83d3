use std::sync::Arc;
use skywatch_core::repository::{FlightRepository, InterestRepository};
use skywatch_core::{ExistenceVerifier, InterestRegistrar};

#[derive(Clone)]
pub struct AppState {
    pub registrar: Arc<InterestRegistrar>,
    pub interests: Arc<dyn InterestRepository>,
    pub flights: Arc<dyn FlightRepository>,
}

impl AppState {
    pub fn new(
        interests: Arc<dyn InterestRepository>,
        flights: Arc<dyn FlightRepository>,
        verifier: Arc<dyn ExistenceVerifier>,
    ) -> Self {
        Self {
            registrar: Arc::new(InterestRegistrar::new(interests.clone(), verifier)),
            interests,
            flights,
        }
    }
}
