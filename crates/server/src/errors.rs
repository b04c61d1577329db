use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use service::errors::ServiceError;
use tracing::error;

pub const INTERNAL_ERROR: &str = "Internal server error";
pub const NOT_FOUND: &str = "MAC ID not found";
pub const INVALID_UPLOAD: &str = "Invalid upload request";

/// JSON error response: `{"error": "..."}` with a status code.
#[derive(Debug)]
pub struct JsonApiError {
    pub status: StatusCode,
    pub error: String,
}

impl JsonApiError {
    pub fn new(status: StatusCode, error: impl Into<String>) -> Self {
        Self { status, error: error.into() }
    }

    pub fn internal(error: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, error)
    }
}

impl From<ServiceError> for JsonApiError {
    fn from(e: ServiceError) -> Self {
        match e {
            ServiceError::MissingIdentifier | ServiceError::MissingReference => {
                Self::new(StatusCode::BAD_REQUEST, e.to_string())
            }
            ServiceError::NotFound(_) => Self::new(StatusCode::NOT_FOUND, NOT_FOUND),
            ServiceError::Storage(_) | ServiceError::Internal(_) => {
                error!(error = %e, "request failed");
                Self::internal(INTERNAL_ERROR)
            }
        }
    }
}

impl IntoResponse for JsonApiError {
    fn into_response(self) -> Response {
        (self.status, Json(common::types::ErrorBody { error: &self.error })).into_response()
    }
}
