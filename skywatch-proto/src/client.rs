use std::time::Duration;
use async_trait::async_trait;
use tonic::transport::{Channel, Endpoint};
use tracing::warn;
use skywatch_core::ExistenceVerifier;
use skywatch_shared::pii::Masked;

use crate::users::user_service_client::UserServiceClient;
use crate::users::UserRequest;

/// Fail-closed RPC client for the identity service's Existence Verifier.
#[derive(Clone)]
pub struct GrpcExistenceVerifier {
    client: UserServiceClient<Channel>,
    timeout: Duration,
}

impl GrpcExistenceVerifier {
    /// Builds a lazily connected client; nothing is dialled until the first
    /// check. Must be called inside a tokio runtime.
    pub fn connect_lazy(endpoint: &str, timeout: Duration) -> Result<Self, tonic::transport::Error> {
        let channel = Endpoint::from_shared(endpoint.to_string())?
            .connect_timeout(timeout)
            .timeout(timeout)
            .connect_lazy();

        Ok(Self {
            client: UserServiceClient::new(channel),
            timeout,
        })
    }
}

#[async_trait]
impl ExistenceVerifier for GrpcExistenceVerifier {
    async fn verify_exists(&self, email: &str) -> bool {
        let mut client = self.client.clone();
        let request = tonic::Request::new(UserRequest { email: email.to_string() });

        match tokio::time::timeout(self.timeout, client.check_user_exists(request)).await {
            Ok(Ok(response)) => {
                let response = response.into_inner();
                if response.degraded {
                    warn!(
                        "User service could not look up {}, treating as not found",
                        Masked(email)
                    );
                }
                response.exists
            }
            Ok(Err(status)) => {
                warn!("gRPC error contacting user service: {}", status);
                false
            }
            Err(_) => {
                warn!("gRPC existence check timed out after {:?}", self.timeout);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_unreachable_partner_fails_closed() {
        // Port 1 is reserved and refuses connections on loopback
        let verifier = GrpcExistenceVerifier::connect_lazy("http://127.0.0.1:1", Duration::from_millis(500)).unwrap();
        assert!(!verifier.verify_exists("a@x.com").await);
    }

    #[tokio::test]
    async fn test_invalid_endpoint_rejected() {
        assert!(GrpcExistenceVerifier::connect_lazy("not a uri", Duration::from_secs(1)).is_err());
    }
}
