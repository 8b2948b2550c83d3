use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tonic::transport::Server;
use tonic::{Request, Response, Status};
use tracing::{debug, error, info};
use skywatch_core::repository::UserRepository;
use skywatch_shared::pii::Masked;

use crate::users::user_service_server::{UserService, UserServiceServer};
use crate::users::{UserRequest, UserResponse};

/// Existence Verifier endpoint hosted by the identity service.
///
/// Never answers with an error status: a failed lookup degrades to
/// `exists = false` with `degraded = true`.
pub struct UserExistenceService {
    users: Arc<dyn UserRepository>,
}

impl UserExistenceService {
    pub fn new(users: Arc<dyn UserRepository>) -> Self {
        Self { users }
    }

    pub fn into_server(self) -> UserServiceServer<Self> {
        UserServiceServer::new(self)
    }
}

#[tonic::async_trait]
impl UserService for UserExistenceService {
    async fn check_user_exists(
        &self,
        request: Request<UserRequest>,
    ) -> Result<Response<UserResponse>, Status> {
        let email = request.into_inner().email;
        let email = email.trim();

        if email.is_empty() {
            return Ok(Response::new(UserResponse { exists: false, degraded: false }));
        }

        let response = match self.users.exists(email).await {
            Ok(exists) => {
                debug!("Existence check for {}: {}", Masked(email), exists);
                UserResponse { exists, degraded: false }
            }
            Err(e) => {
                error!("Existence lookup failed for {}: {}", Masked(email), e);
                UserResponse { exists: false, degraded: true }
            }
        };

        Ok(Response::new(response))
    }
}

/// Serves the verifier until the listener fails. `max_workers` bounds the
/// in-flight requests per connection.
pub async fn serve(
    addr: SocketAddr,
    users: Arc<dyn UserRepository>,
    max_workers: usize,
    request_timeout: Duration,
) -> Result<(), tonic::transport::Error> {
    info!("gRPC UserService listening on {}", addr);

    Server::builder()
        .concurrency_limit_per_connection(max_workers)
        .timeout(request_timeout)
        .add_service(UserExistenceService::new(users).into_server())
        .serve(addr)
        .await
}
