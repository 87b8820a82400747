//! HTTP error handling and response conversion.
//!
//! This module provides structured error types that are mapped to appropriate HTTP status codes
//! and JSON responses. The domain error taxonomy is transport-agnostic; the mapping to status
//! codes lives here and nowhere else.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use std::collections::HashMap;
use std::fmt;

use crate::domain::comment::errors::{ErrorCode, MutationError};

/// Application-level errors returned from handlers.
///
/// Each variant maps to a specific HTTP status code and error category.
#[derive(Debug)]
pub enum AppError {
    /// Resource not found (404).
    NotFound(String),

    /// Request validation failed (400).
    BadRequest(String),

    /// Access denied - authentication/authorization required (403).
    Forbidden(String),

    /// Optimistic-concurrency conflict (409). Clients refetch and retry
    /// manually.
    StaleRevision { expected: i64, actual: i64 },

    /// Soft content-filter rejection of a comment (400).
    Nudge(String),

    /// Hard policy failure with a machine-readable code (400).
    Invalid {
        code: ErrorCode,
        fields: HashMap<String, String>,
    },

    /// Database operation failed (500).
    Database(String),

    /// Unclassified internal error (500).
    Internal(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound(msg) => write!(f, "Not found: {}", msg),
            Self::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            Self::Forbidden(msg) => write!(f, "Forbidden: {}", msg),
            Self::StaleRevision { expected, actual } => {
                write!(f, "Stale revision: expected {}, actual {}", expected, actual)
            }
            Self::Nudge(msg) => write!(f, "Held by moderation filter: {}", msg),
            Self::Invalid { code, .. } => write!(f, "Invalid request: {:?}", code),
            Self::Database(msg) => write!(f, "Database error: {}", msg),
            Self::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl AppError {
    /// Get the appropriate HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::BadRequest(_) | Self::Nudge(_) | Self::Invalid { .. } => StatusCode::BAD_REQUEST,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::StaleRevision { .. } => StatusCode::CONFLICT,
            Self::Database(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// JSON body for the response, without implementation details.
    fn body(&self) -> serde_json::Value {
        match self {
            Self::NotFound(_) => json!({ "error": "Resource not found" }),
            Self::BadRequest(msg) => json!({ "error": msg }),
            Self::Forbidden(_) => json!({ "error": "Access denied" }),
            Self::StaleRevision { expected, actual } => json!({
                "error": "Comment was changed by someone else",
                "code": "STALE_REVISION",
                "expected_revision": expected,
                "actual_revision": actual,
            }),
            Self::Nudge(msg) => json!({
                "error": msg,
                "code": "MODERATION_NUDGE",
            }),
            Self::Invalid { code, fields } => json!({
                "error": "Request rejected",
                "code": code,
                "fields": fields,
            }),
            Self::Database(_) => json!({ "error": "Database operation failed" }),
            Self::Internal(_) => json!({ "error": "Internal server error" }),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        match status {
            StatusCode::INTERNAL_SERVER_ERROR => {
                tracing::error!("error={}", self);
            }
            StatusCode::BAD_REQUEST | StatusCode::FORBIDDEN | StatusCode::NOT_FOUND => {
                tracing::warn!("error={}", self);
            }
            _ => {
                tracing::info!("error={}", self);
            }
        }

        (status, Json(self.body())).into_response()
    }
}

// === Domain Error Conversion ===

impl From<MutationError> for AppError {
    fn from(err: MutationError) -> Self {
        match err {
            MutationError::StaleRevision { expected, actual } => {
                AppError::StaleRevision { expected, actual }
            }
            MutationError::ModerationNudge(message) => AppError::Nudge(message),
            MutationError::InvalidRequest { code, fields } => match code {
                ErrorCode::CommentNotFound => AppError::NotFound("comment".into()),
                _ => AppError::Invalid { code, fields },
            },
            MutationError::Unauthorized => AppError::Forbidden("Out of moderation scope".into()),
            MutationError::Storage(msg) => {
                tracing::error!(storage_error = %msg);
                AppError::Database(msg)
            }
        }
    }
}

// === General Fallback Error Conversion ===

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        tracing::error!(anyhow_error = %err, "Unclassified error with chain");
        err.chain().for_each(|cause| {
            tracing::error!(cause = %cause, "Error source");
        });
        AppError::Internal("Operation failed".into())
    }
}
