use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Error body returned as `{"success": false, "error": {...}}`.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ApiError {
    #[schema(example = "CONFLICT")]
    pub code: String,
    pub message: String,
}
