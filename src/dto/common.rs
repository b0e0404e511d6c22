use serde::Serialize;
use utoipa::ToSchema;

/// Generic action acknowledgement used by admin endpoints.
#[derive(Debug, Serialize, ToSchema)]
pub struct ActionResponse {
    /// Human-readable outcome description.
    pub message: String,
}

impl ActionResponse {
    /// Acknowledge an action with the given message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Result of uploading a logo asset.
#[derive(Debug, Serialize, ToSchema)]
pub struct UploadResponse {
    /// URL the uploaded asset is now served from.
    pub url: String,
    /// Human-readable outcome description.
    pub message: String,
}
