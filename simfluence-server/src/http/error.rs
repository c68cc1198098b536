//! API error types with IntoResponse
//!
//! Every failure is a JSON body `{"error": kind, "message": text}` with a
//! matching status code. Database and internal details are logged, never
//! returned.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use simfluence_reddit::RedditError;

use crate::db::repos::DbError;
use crate::models::ValidationError;
use crate::services::{AiClientError, CloudinaryError};

/// API error type with automatic HTTP status mapping
#[derive(Debug)]
pub enum ApiError {
    /// Validation failed (400)
    Validation(ValidationError),

    /// Caller's upstream credentials were rejected (401)
    Unauthorized { message: String },

    /// Resource not found (404)
    NotFound { resource: &'static str, id: String },

    /// Unique constraint hit (409)
    Conflict { resource: &'static str, detail: String },

    /// Request body over the accepted size (413)
    PayloadTooLarge { limit: usize },

    /// Database error (500, logged)
    Database(DbError),

    /// Upstream service failed (502)
    BadGateway { service: &'static str, message: String },

    /// Feature not configured on this deployment (503)
    Unavailable { message: String },

    /// Internal error (500)
    Internal { message: String },
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::Validation(ValidationError::MalformedBody {
            message: message.into(),
        })
    }

    fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized { .. } => StatusCode::UNAUTHORIZED,
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::Conflict { .. } => StatusCode::CONFLICT,
            Self::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            Self::Database(_) | Self::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            Self::BadGateway { .. } => StatusCode::BAD_GATEWAY,
            Self::Unavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match &self {
            Self::Validation(e) => json!({
                "error": "validation_error",
                "message": e.to_string()
            }),
            Self::Unauthorized { message } => json!({
                "error": "unauthorized",
                "message": message
            }),
            Self::NotFound { resource, id } => json!({
                "error": "not_found",
                "message": format!("{} '{}' not found", resource, id)
            }),
            Self::Conflict { resource, detail } => json!({
                "error": "conflict",
                "message": format!("{} {}", resource, detail)
            }),
            Self::PayloadTooLarge { limit } => json!({
                "error": "payload_too_large",
                "message": format!("request body exceeds {} bytes", limit)
            }),
            Self::Database(e) => {
                // Log the actual error, return generic message
                tracing::error!("Database error: {}", e);
                json!({
                    "error": "internal_error",
                    "message": "an internal error occurred"
                })
            }
            Self::BadGateway { service, message } => {
                tracing::warn!(service, "Upstream failure: {}", message);
                json!({
                    "error": "bad_gateway",
                    "message": format!("{} request failed: {}", service, message)
                })
            }
            Self::Unavailable { message } => json!({
                "error": "service_unavailable",
                "message": message
            }),
            Self::Internal { message } => {
                tracing::error!("Internal error: {}", message);
                json!({
                    "error": "internal_error",
                    "message": "an internal error occurred"
                })
            }
        };

        (status, Json(body)).into_response()
    }
}

impl From<ValidationError> for ApiError {
    fn from(e: ValidationError) -> Self {
        Self::Validation(e)
    }
}

impl From<DbError> for ApiError {
    fn from(e: DbError) -> Self {
        match e {
            DbError::NotFound { resource, id } => Self::NotFound { resource, id },
            DbError::Conflict { resource, detail } => Self::Conflict { resource, detail },
            DbError::Sqlx(_) => Self::Database(e),
        }
    }
}

impl From<RedditError> for ApiError {
    fn from(e: RedditError) -> Self {
        match e {
            RedditError::InvalidUsername(_) => Self::Validation(ValidationError::InvalidFormat {
                field: "username",
                reason: "not a valid Reddit username",
            }),
            e if e.is_unauthorized() => Self::Unauthorized {
                message: "Reddit rejected the access token".to_string(),
            },
            e => Self::BadGateway {
                service: "reddit",
                message: e.to_string(),
            },
        }
    }
}

impl From<CloudinaryError> for ApiError {
    fn from(e: CloudinaryError) -> Self {
        Self::BadGateway {
            service: "cloudinary",
            message: e.to_string(),
        }
    }
}

impl From<AiClientError> for ApiError {
    fn from(e: AiClientError) -> Self {
        Self::BadGateway {
            service: "AI service",
            message: e.to_string(),
        }
    }
}
