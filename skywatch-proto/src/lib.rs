pub mod users {
    tonic::include_proto!("skywatch.users.v1");
}

pub mod server;
pub mod client;

pub use client::GrpcExistenceVerifier;
pub use server::{serve, UserExistenceService};
