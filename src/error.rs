//! Error handling module
//!
//! Centralized error types and HTTP response conversion.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

/// Application error types
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    // Client errors (4xx)
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    // Domain errors
    #[error(transparent)]
    Domain(#[from] crate::domain::DomainError),

    // Server errors (5xx)
    #[error("Snapshot error: {0}")]
    Snapshot(#[from] crate::snapshot::SnapshotError),

    #[error("Export error: {0}")]
    Export(#[from] crate::export::ExportError),
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub error_code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_code, details) = match &self {
            // 400 Bad Request
            AppError::InvalidRequest(msg) => {
                (StatusCode::BAD_REQUEST, "invalid_request", Some(msg.clone()))
            }

            // Domain errors - map to appropriate HTTP status
            AppError::Domain(domain_err) => {
                use crate::domain::DomainError;
                match domain_err {
                    DomainError::InvalidArgument(msg) => {
                        (StatusCode::BAD_REQUEST, "invalid_argument", Some(msg.clone()))
                    }
                    DomainError::InvalidConfiguration(msg) => {
                        tracing::error!("Invalid incentive configuration: {}", msg);
                        (StatusCode::INTERNAL_SERVER_ERROR, "invalid_configuration", None)
                    }
                }
            }

            // 503 Service Unavailable
            AppError::Snapshot(e) if e.is_retryable() => {
                tracing::warn!("Snapshot source unavailable: {:?}", e);
                (StatusCode::SERVICE_UNAVAILABLE, "snapshot_unavailable", None)
            }

            // 500 Internal Server Error
            AppError::Snapshot(e) => {
                tracing::error!("Snapshot error: {:?}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "snapshot_error", None)
            }
            AppError::Export(e) => {
                tracing::error!("Export error: {:?}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "export_error", None)
            }
        };

        let body = ErrorResponse {
            error: self.to_string(),
            error_code: error_code.to_string(),
            details,
        };

        (status, Json(body)).into_response()
    }
}
