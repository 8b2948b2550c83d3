use std::sync::Arc;
use tracing::info;
use skywatch_shared::pii::Masked;
use crate::models::InterestOutcome;
use crate::repository::InterestRepository;
use crate::verifier::ExistenceVerifier;
use crate::{check_length, normalize_airport, CoreError, CoreResult, MAX_AIRPORT_CODE_LEN, MAX_EMAIL_LEN};

/// Gates interest creation on the partner's existence check.
///
/// There is no cross-service foreign key: a user deleted right after the
/// check can still leave an interest behind until the cascade removes it.
pub struct InterestRegistrar {
    interests: Arc<dyn InterestRepository>,
    verifier: Arc<dyn ExistenceVerifier>,
}

impl InterestRegistrar {
    pub fn new(interests: Arc<dyn InterestRepository>, verifier: Arc<dyn ExistenceVerifier>) -> Self {
        Self { interests, verifier }
    }

    pub async fn add_interest(&self, email: &str, airport_code: &str) -> CoreResult<InterestOutcome> {
        let email = email.trim();
        let airport = normalize_airport(airport_code);
        if email.is_empty() || airport.is_empty() {
            return Err(CoreError::ValidationError(
                "Email and airport are required".to_string(),
            ));
        }
        check_length("Email", email, MAX_EMAIL_LEN)?;
        check_length("Airport code", &airport, MAX_AIRPORT_CODE_LEN)?;

        if !self.verifier.verify_exists(email).await {
            return Err(CoreError::NotFoundError(format!("User {} not found", email)));
        }

        let outcome = if self.interests.insert(email, &airport).await? {
            InterestOutcome::Created
        } else {
            InterestOutcome::AlreadyExists
        };

        info!("Interest {} -> {}: {:?}", Masked(email), airport, outcome);
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::{MemoryInterestStore, MemoryUserStore};
    use crate::models::NewUser;
    use crate::repository::UserRepository;
    use crate::verifier::FailClosed;

    async fn registrar_with_user(email: &str) -> (InterestRegistrar, Arc<MemoryInterestStore>) {
        let users = Arc::new(MemoryUserStore::new());
        users
            .register_once("seed", &NewUser { email: email.to_string(), username: "u".to_string() })
            .await
            .unwrap();
        let interests = Arc::new(MemoryInterestStore::new());
        (InterestRegistrar::new(interests.clone(), users), interests)
    }

    #[tokio::test]
    async fn test_add_interest_is_idempotent() {
        let (registrar, interests) = registrar_with_user("a@x.com").await;

        let first = registrar.add_interest("a@x.com", "LIRF").await.unwrap();
        let second = registrar.add_interest("a@x.com", "LIRF").await.unwrap();

        assert_eq!(first, InterestOutcome::Created);
        assert_eq!(second, InterestOutcome::AlreadyExists);
        assert_eq!(interests.list_for_user("a@x.com").await.unwrap(), vec!["LIRF"]);
    }

    #[tokio::test]
    async fn test_airport_code_case_normalized() {
        let (registrar, interests) = registrar_with_user("a@x.com").await;

        assert_eq!(registrar.add_interest("a@x.com", "lirf").await.unwrap(), InterestOutcome::Created);
        assert_eq!(registrar.add_interest("a@x.com", " LiRf ").await.unwrap(), InterestOutcome::AlreadyExists);
        assert_eq!(interests.monitored_airports().await.unwrap(), vec!["LIRF"]);
    }

    #[tokio::test]
    async fn test_unknown_user_creates_nothing() {
        let (registrar, interests) = registrar_with_user("a@x.com").await;

        let result = registrar.add_interest("ghost@x.com", "LIRF").await;
        assert!(matches!(result, Err(CoreError::NotFoundError(_))));
        assert!(interests.list_for_user("ghost@x.com").await.unwrap().is_empty());
        assert!(interests.monitored_airports().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_fail_closed_verifier_rejects() {
        let interests = Arc::new(MemoryInterestStore::new());
        let registrar = InterestRegistrar::new(interests.clone(), Arc::new(FailClosed));

        let result = registrar.add_interest("a@x.com", "LIRF").await;
        assert!(matches!(result, Err(CoreError::NotFoundError(_))));
        assert!(interests.monitored_airports().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_missing_fields() {
        let (registrar, _) = registrar_with_user("a@x.com").await;

        assert!(matches!(
            registrar.add_interest("", "LIRF").await,
            Err(CoreError::ValidationError(_))
        ));
        assert!(matches!(
            registrar.add_interest("a@x.com", "  ").await,
            Err(CoreError::ValidationError(_))
        ));
    }

    #[tokio::test]
    async fn test_oversized_input_rejected_before_store() {
        let (registrar, interests) = registrar_with_user("a@x.com").await;

        assert!(matches!(
            registrar.add_interest("a@x.com", "ABCDEFGHIJK").await,
            Err(CoreError::ValidationError(_))
        ));
        let long_email = format!("{}@x.com", "a".repeat(250));
        assert!(matches!(
            registrar.add_interest(&long_email, "LIRF").await,
            Err(CoreError::ValidationError(_))
        ));
        assert_eq!(
            registrar.add_interest("a@x.com", "ABCDEFGHIJ").await.unwrap(),
            InterestOutcome::Created
        );
        assert_eq!(interests.monitored_airports().await.unwrap(), vec!["ABCDEFGHIJ"]);
    }
}
