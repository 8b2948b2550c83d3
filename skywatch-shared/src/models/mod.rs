pub mod messages;

pub use messages::{ErrorBody, InterestsDeleted, MessageResponse};
