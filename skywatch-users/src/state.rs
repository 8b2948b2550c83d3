use std::sync::Arc;
use skywatch_core::repository::UserRepository;
use skywatch_core::{DeletionCoordinator, InterestCleanup, RegistrationCoordinator};

#[derive(Clone)]
pub struct AppState {
    pub registration: Arc<RegistrationCoordinator>,
    pub deletion: Arc<DeletionCoordinator>,
}

impl AppState {
    pub fn new(users: Arc<dyn UserRepository>, cleanup: Arc<dyn InterestCleanup>) -> Self {
        Self {
            registration: Arc::new(RegistrationCoordinator::new(users.clone())),
            deletion: Arc::new(DeletionCoordinator::new(users, cleanup)),
        }
    }
}
