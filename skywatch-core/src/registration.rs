use std::sync::Arc;
use tracing::info;
use skywatch_shared::pii::Masked;
use crate::models::{NewUser, RegistrationOutcome};
use crate::repository::UserRepository;
use crate::{check_length, CoreError, CoreResult, MAX_EMAIL_LEN, MAX_USERNAME_LEN};

const MAX_REQUEST_ID_LEN: usize = 64;

/// Owns the at-most-once write path for user creation.
///
/// At-most-once is scoped to a request identifier, not to the email: two
/// distinct request ids for the same email are independent attempts.
/// A crash after the user insert but before the transaction commits rolls
/// both back; the ledger and the user row are never committed separately.
pub struct RegistrationCoordinator {
    users: Arc<dyn UserRepository>,
}

impl RegistrationCoordinator {
    pub fn new(users: Arc<dyn UserRepository>) -> Self {
        Self { users }
    }

    pub async fn register(
        &self,
        request_id: Option<&str>,
        email: &str,
        username: &str,
    ) -> CoreResult<RegistrationOutcome> {
        let request_id = request_id
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .ok_or_else(|| CoreError::ValidationError("Missing request identifier".to_string()))?;

        if request_id.len() > MAX_REQUEST_ID_LEN {
            return Err(CoreError::ValidationError(format!(
                "Request identifier longer than {} characters",
                MAX_REQUEST_ID_LEN
            )));
        }

        let email = email.trim();
        let username = username.trim();
        if email.is_empty() || username.is_empty() {
            return Err(CoreError::ValidationError(
                "Email and username are required".to_string(),
            ));
        }
        check_length("Email", email, MAX_EMAIL_LEN)?;
        check_length("Username", username, MAX_USERNAME_LEN)?;
        if !email.contains('@') {
            return Err(CoreError::ValidationError(format!(
                "Malformed email: {}",
                email
            )));
        }

        let user = NewUser {
            email: email.to_string(),
            username: username.to_string(),
        };

        let outcome = self.users.register_once(request_id, &user).await?;

        match outcome {
            RegistrationOutcome::IdempotentReplay => {
                info!("Request {} already processed, skipping", request_id)
            }
            _ => info!(
                "Registration {} for {}: {:?}",
                request_id,
                Masked(email),
                outcome
            ),
        }

        Ok(outcome)
    }
}
