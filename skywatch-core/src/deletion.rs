use std::sync::Arc;
use async_trait::async_trait;
use serde::Serialize;
use tracing::{info, warn};
use skywatch_shared::pii::Masked;
use crate::repository::UserRepository;
use crate::{CoreError, CoreResult};

/// Removes a user's derived records held by the collection service.
#[async_trait]
pub trait InterestCleanup: Send + Sync {
    /// Returns the number of interests removed.
    async fn purge_interests(&self, email: &str) -> CoreResult<u64>;
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct DeletionReport {
    pub users_deleted: u64,
    /// `None` when the partner cleanup could not be confirmed.
    pub interests_removed: Option<u64>,
}

/// Best-effort cascading delete.
///
/// The partner cleanup runs first and its failure never blocks removal of
/// the user row. Interests and flight linkage left behind by a failed
/// cleanup are a known consistency gap.
pub struct DeletionCoordinator {
    users: Arc<dyn UserRepository>,
    cleanup: Arc<dyn InterestCleanup>,
}

impl DeletionCoordinator {
    pub fn new(users: Arc<dyn UserRepository>, cleanup: Arc<dyn InterestCleanup>) -> Self {
        Self { users, cleanup }
    }

    pub async fn delete_user(&self, email: &str) -> CoreResult<DeletionReport> {
        let email = email.trim();
        if email.is_empty() {
            return Err(CoreError::ValidationError("Email is required".to_string()));
        }

        let interests_removed = match self.cleanup.purge_interests(email).await {
            Ok(count) => Some(count),
            Err(e) => {
                warn!(
                    "Interest cleanup for {} not confirmed, continuing: {}",
                    Masked(email),
                    e
                );
                None
            }
        };

        let users_deleted = self.users.delete(email).await?;
        info!(
            "Deleted user {} (rows: {}, interests: {:?})",
            Masked(email),
            users_deleted,
            interests_removed
        );

        Ok(DeletionReport {
            users_deleted,
            interests_removed,
        })
    }
}
