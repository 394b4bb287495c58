use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

use taskboard_store::StoreError;

/// Request-level failures, mapped to HTTP responses.
///
/// Shape validation and existence validation stay distinct: a malformed
/// body is `Validation` (422) and is rejected before any store call, while
/// a well-formed request naming a dead id is `NotFound` (404). The store
/// never produces either; it only reports infrastructure failures.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    NotFound(String),

    #[error(transparent)]
    Storage(#[from] StoreError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, detail) = match self {
            ApiError::Validation(msg) => (StatusCode::UNPROCESSABLE_ENTITY, msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::Storage(err) => {
                tracing::error!(error = %err, "store operation failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal storage error".to_string(),
                )
            }
        };
        (status, Json(serde_json::json!({ "detail": detail }))).into_response()
    }
}
