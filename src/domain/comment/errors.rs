use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;
use ts_rs::TS;

/// Machine-readable codes for hard request failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[ts(export)]
pub enum ErrorCode {
    UserWarned,
    UserSuspended,
    UserBanned,
    StoryClosed,
    CommentNotFound,
    CommentBodyTooShort,
    CommentBodyExceedsMaxLength,
    CannotFeatureRejectedComment,
    InvalidRating,
}

/// Failure modes of moderation mutations.
///
/// Every variant is a value the caller must handle; none of these are
/// allowed to escalate as panics across component boundaries.
#[derive(Debug, Clone, Error, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum MutationError {
    /// Optimistic-concurrency conflict. Recovered by refetching the
    /// comment and retrying manually, never retried automatically.
    #[error("stale revision: expected {expected}, actual {actual}")]
    StaleRevision { expected: i64, actual: i64 },

    /// Soft content-filter rejection. The mutation coordinator retries
    /// comment creation once with reduced nudging before surfacing it.
    #[error("comment held by moderation filter: {0}")]
    ModerationNudge(String),

    /// Hard validation or policy failure, surfaced immediately.
    #[error("invalid request: {code:?}")]
    InvalidRequest {
        code: ErrorCode,
        fields: HashMap<String, String>,
    },

    /// The caller's moderation scope does not cover the target site.
    #[error("unauthorized")]
    Unauthorized,

    /// Authoritative store failure.
    #[error("storage error: {0}")]
    Storage(String),
}

impl MutationError {
    pub fn invalid(code: ErrorCode) -> Self {
        MutationError::InvalidRequest {
            code,
            fields: HashMap::new(),
        }
    }

    pub fn invalid_field(code: ErrorCode, field: &str, message: &str) -> Self {
        let mut fields = HashMap::new();
        fields.insert(field.to_string(), message.to_string());
        MutationError::InvalidRequest { code, fields }
    }
}
