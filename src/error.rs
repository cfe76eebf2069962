use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Body returned to the notifier when the receipt service does not confirm a callback.
pub const VALIDATION_FAILED_BODY: &str = "not at all ok";

#[derive(Error, Debug)]
pub enum BadgeError {
    #[error("Callback could not be validated")]
    ValidationFailed,

    #[error("Malformed payload: {0}")]
    MalformedPayload(String),

    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("Corrupt record {key}: {reason}")]
    CorruptRecord { key: String, reason: String },

    #[error("Internal server error: {0}")]
    InternalError(String),

    #[error("Anyhow error: {0}")]
    AnyhowError(#[from] anyhow::Error),
}

impl From<redis::RedisError> for BadgeError {
    fn from(err: redis::RedisError) -> Self {
        BadgeError::StoreUnavailable(err.to_string())
    }
}

impl From<serde_json::Error> for BadgeError {
    fn from(err: serde_json::Error) -> Self {
        BadgeError::MalformedPayload(err.to_string())
    }
}

#[derive(Serialize, Deserialize, Debug)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
    pub error_code: String,
    pub timestamp: chrono::DateTime<Utc>,
    pub request_id: String,
}

impl BadgeError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            // 400 tells the notifier this delivery is rejected.
            BadgeError::ValidationFailed => StatusCode::BAD_REQUEST,
            BadgeError::StoreUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            BadgeError::ValidationFailed => "VALIDATION_FAILED",
            BadgeError::MalformedPayload(_) => "MALFORMED_PAYLOAD",
            BadgeError::StoreUnavailable(_) => "STORE_UNAVAILABLE",
            BadgeError::CorruptRecord { .. } => "CORRUPT_RECORD",
            _ => "INTERNAL_ERROR",
        }
    }
}

impl IntoResponse for BadgeError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let error_code = self.error_code();

        if let BadgeError::ValidationFailed = self {
            tracing::warn!(error_code = error_code, "Callback rejected");
            return (status, VALIDATION_FAILED_BODY).into_response();
        }

        let body = ErrorResponse {
            success: false,
            error: self.to_string(),
            error_code: error_code.to_string(),
            timestamp: Utc::now(),
            request_id: Uuid::new_v4().to_string(),
        };

        tracing::error!(
            error = ?self,
            error_code = error_code,
            "Request failed"
        );

        (status, Json(body)).into_response()
    }
}
