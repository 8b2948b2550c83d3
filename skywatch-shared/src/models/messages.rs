//! JSON bodies exchanged between the services and their clients.

#[derive(Debug, serde::Serialize, serde::Deserialize, Clone, PartialEq)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into() }
    }
}

#[derive(Debug, serde::Serialize, serde::Deserialize, Clone, PartialEq)]
pub struct ErrorBody {
    pub error: String,
}

/// Body of `DELETE /interests/{email}` on the collection service; read back
/// by the identity service's cascade client.
#[derive(Debug, serde::Serialize, serde::Deserialize, Clone, PartialEq)]
pub struct InterestsDeleted {
    pub message: String,
    pub deleted: u64,
}
