//! Error types for ledgerweb-api

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use ledgerweb_core::{CoreError, ErrorCode, ErrorDetails};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    /// Body was not JSON, or not the expected JSON shape
    #[error("Bad request: {message}")]
    BadRequest { status: StatusCode, message: String },

    #[error(transparent)]
    Core(#[from] CoreError),
}

impl ApiError {
    /// HTTP status for this error
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest { status, .. } => *status,
            ApiError::Core(e) => match e.code() {
                ErrorCode::ValidationError => StatusCode::BAD_REQUEST,
                ErrorCode::StorageError | ErrorCode::InvalidFormat | ErrorCode::InternalError => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
        }
    }

    fn details(&self) -> ErrorDetails {
        match self {
            ApiError::BadRequest { message, .. } => {
                ErrorDetails::new(ErrorCode::ValidationError, message.clone())
            }
            ApiError::Core(e) => e.to_details(),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest {
            status: rejection.status(),
            message: rejection.body_text(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = serde_json::json!({
            "status": "error",
            "error": self.details(),
        });
        (self.status(), Json(body)).into_response()
    }
}

/// Log a core error under the failing operation, then wrap it
pub fn logged(operation: &'static str) -> impl FnOnce(CoreError) -> ApiError {
    move |error| {
        error.log(operation);
        ApiError::Core(error)
    }
}
