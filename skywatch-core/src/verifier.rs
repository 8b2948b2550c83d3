use async_trait::async_trait;

/// Cross-service "does this user exist" check.
///
/// Implementations never surface errors: transport failures, timeouts and
/// partner outages all answer `false` so writes gated on the check are
/// rejected rather than left orphaned.
#[async_trait]
pub trait ExistenceVerifier: Send + Sync {
    async fn verify_exists(&self, email: &str) -> bool;
}

/// Verifier used when no partner is reachable. Rejects everything.
pub struct FailClosed;

#[async_trait]
impl ExistenceVerifier for FailClosed {
    async fn verify_exists(&self, email: &str) -> bool {
        tracing::warn!(
            "No existence verifier configured, rejecting {}",
            skywatch_shared::pii::Masked(email)
        );
        false
    }
}
