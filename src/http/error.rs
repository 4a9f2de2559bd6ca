use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::error::{IngestError, StoreError};

const ENABLE_LOGS: bool = true;

use crate::log_warn;

/// Failure of a request, rendered as `{"status": "gagal", "error": ...}`.
#[derive(Debug)]
pub enum ApiError {
    InvalidQuery(String),
    Ingest(IngestError),
    Store(StoreError),
}

impl From<IngestError> for ApiError {
    fn from(err: IngestError) -> Self {
        ApiError::Ingest(err)
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        ApiError::Store(err)
    }
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::InvalidQuery(_) | ApiError::Ingest(IngestError::MalformedPayload(_)) => {
                StatusCode::BAD_REQUEST
            }
            ApiError::Ingest(IngestError::Store(_)) | ApiError::Store(_) => {
                StatusCode::SERVICE_UNAVAILABLE
            }
        }
    }

    fn message(&self) -> String {
        match self {
            ApiError::InvalidQuery(reason) => format!("invalid query: {reason}"),
            ApiError::Ingest(err) => err.to_string(),
            ApiError::Store(err) => err.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = self.message();
        log_warn!("request failed with {status}: {message}");

        (status, Json(json!({ "status": "gagal", "error": message }))).into_response()
    }
}
