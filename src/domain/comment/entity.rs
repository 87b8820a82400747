use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

use super::errors::{ErrorCode, MutationError};
use super::media::CommentMedia;

/// Server-authoritative moderation status of a comment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[ts(export)]
pub enum CommentStatus {
    Unmoderated,
    Approved,
    Rejected,
}

/// Tags are mutable independently of status. FEATURED is only valid
/// while the comment is not rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[ts(export)]
pub enum CommentTag {
    Featured,
    Staff,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Comment {
    pub id: Uuid,
    pub story_id: Uuid,
    pub site_id: Uuid,
    /// Section of the story the comment was posted on, denormalized so
    /// queues can filter on it without a story lookup.
    pub section: Option<String>,
    pub author_id: Uuid,
    pub body: String,
    pub status: CommentStatus,
    pub tags: Vec<CommentTag>,
    pub media: Option<CommentMedia>,
    pub rating: Option<i32>,
    /// Advances on every content-affecting mutation; mutations issued
    /// against an older revision are rejected as stale.
    pub revision: i64,
    pub deleted: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Comment {
    pub fn is_featured(&self) -> bool {
        self.tags.contains(&CommentTag::Featured)
    }

    /// Apply a moderation action in place, without touching the
    /// revision. Both stores run their optimistic revision check first
    /// and bump the revision on success.
    pub fn transition(&mut self, action: ModerationAction) -> Result<(), MutationError> {
        match action {
            ModerationAction::Approve => {
                self.status = CommentStatus::Approved;
            }
            ModerationAction::Reject => {
                self.status = CommentStatus::Rejected;
                self.tags.retain(|tag| *tag != CommentTag::Featured);
            }
            ModerationAction::Feature => {
                if self.status == CommentStatus::Rejected {
                    return Err(MutationError::invalid(
                        ErrorCode::CannotFeatureRejectedComment,
                    ));
                }
                if !self.is_featured() {
                    self.tags.push(CommentTag::Featured);
                }
            }
            ModerationAction::Unfeature => {
                self.tags.retain(|tag| *tag != CommentTag::Featured);
            }
        }
        Ok(())
    }
}

/// The four moderation actions a moderator can take on an existing comment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[ts(export)]
pub enum ModerationAction {
    Approve,
    Reject,
    Feature,
    Unfeature,
}

/// Account standing of the comment author, supplied by the (external)
/// authorization collaborator when a comment is submitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[ts(export)]
pub enum AuthorStanding {
    Good,
    Warned,
    Suspended,
    Banned,
}

/// Input for creating a comment. Validation of body bounds happens in
/// the mutation coordinator so every transport gets the same rules.
#[derive(Debug, Clone)]
pub struct NewComment {
    pub story_id: Uuid,
    pub site_id: Uuid,
    pub section: Option<String>,
    pub author_id: Uuid,
    pub body: String,
    pub rating: Option<i32>,
    pub media: Option<CommentMedia>,
}
