use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Error envelope returned by every JSON endpoint on failure.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ApiErrorResponse {
    #[schema(example = false)]
    pub success: bool,
    pub error: ApiError,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ApiError {
    #[schema(example = "PERSISTENCE_ERROR")]
    pub code: String,
    #[schema(example = "Failed to save data to the database.")]
    pub message: String,
}
