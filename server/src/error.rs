use axum::{
    Json,
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde_json::json;
use topgoal_library::{LibraryError, StreamError};
use topgoal_storage::StorageError;
use tracing::error;

/// Failures surfaced to HTTP clients as `{"detail": ...}`.
#[derive(thiserror::Error, Debug)]
pub enum ApiError {
    #[error("Track not found")]
    NotFound,

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Conflict(String),

    #[error("Requested range not satisfiable")]
    RangeNotSatisfiable { file_size: u64 },

    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::RangeNotSatisfiable { .. } => StatusCode::RANGE_NOT_SATISFIABLE,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(error = %self, "la petición falló");
        }

        let mut response = (status, Json(json!({ "detail": self.to_string() }))).into_response();
        if let ApiError::RangeNotSatisfiable { file_size } = self {
            if let Ok(value) = HeaderValue::from_str(&format!("bytes */{file_size}")) {
                response.headers_mut().insert(header::CONTENT_RANGE, value);
            }
        }
        response
    }
}

impl From<LibraryError> for ApiError {
    fn from(err: LibraryError) -> Self {
        match err {
            busy @ LibraryError::ScanInProgress => ApiError::Conflict(busy.to_string()),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl From<StreamError> for ApiError {
    fn from(err: StreamError) -> Self {
        match err {
            StreamError::NotFound => ApiError::NotFound,
            StreamError::RangeNotSatisfiable { file_size } => ApiError::RangeNotSatisfiable { file_size },
            StreamError::Io(e) => ApiError::Internal(format!("stream error: {e}")),
        }
    }
}

impl From<StorageError> for ApiError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::InvalidComment(reason) => ApiError::BadRequest(reason),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl From<tokio::task::JoinError> for ApiError {
    fn from(err: tokio::task::JoinError) -> Self {
        ApiError::Internal(format!("background task failed: {err}"))
    }
}
