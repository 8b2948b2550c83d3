pub mod models;
pub mod repository;
pub mod registration;
pub mod verifier;
pub mod interest;
pub mod deletion;
pub mod feed;
pub mod analysis;
pub mod retry;
pub mod memory;

pub use models::{
    Direction, FlightObservation, FlightRecord, Interest, InterestOutcome, NewUser,
    ProcessedRequest, RegistrationOutcome, User,
};
pub use registration::RegistrationCoordinator;
pub use interest::InterestRegistrar;
pub use deletion::{DeletionCoordinator, DeletionReport, InterestCleanup};
pub use verifier::{ExistenceVerifier, FailClosed};
pub use retry::{RetryPolicy, RetryStrategy};

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Validation failed: {0}")]
    ValidationError(String),
    #[error("Not found: {0}")]
    NotFoundError(String),
    #[error("Partner service unavailable: {0}")]
    PartnerUnavailable(String),
    #[error("External source error: {0}")]
    ExternalSourceError(String),
    #[error("Persistence failure: {0}")]
    PersistenceError(String),
}

pub type CoreResult<T> = Result<T, CoreError>;

/// Column widths of the stores; longer input is rejected before any write.
pub const MAX_EMAIL_LEN: usize = 255;
pub const MAX_USERNAME_LEN: usize = 255;
pub const MAX_AIRPORT_CODE_LEN: usize = 10;

/// Rejects `value` when it exceeds `max` characters.
pub fn check_length(field: &str, value: &str, max: usize) -> CoreResult<()> {
    if value.chars().count() > max {
        return Err(CoreError::ValidationError(format!(
            "{} longer than {} characters",
            field, max
        )));
    }
    Ok(())
}

/// Airport codes are stored and looked up upper-cased.
pub fn normalize_airport(code: &str) -> String {
    code.trim().to_uppercase()
}
