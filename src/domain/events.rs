use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::comment::entity::Comment;

/// The fixed set of moderation event topics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventKind {
    CommentAccepted,
    CommentRejected,
    CommentFlagged,
    CommentReset,
    CommentAdded,
    CommentEdited,
    UserSuspended,
    UserBanned,
    UsernameRejected,
    UsernameApproved,
    UsernameFlagged,
    UsernameChanged,
    UserCreated,
}

impl EventKind {
    pub const ALL: [EventKind; 13] = [
        EventKind::CommentAccepted,
        EventKind::CommentRejected,
        EventKind::CommentFlagged,
        EventKind::CommentReset,
        EventKind::CommentAdded,
        EventKind::CommentEdited,
        EventKind::UserSuspended,
        EventKind::UserBanned,
        EventKind::UsernameRejected,
        EventKind::UsernameApproved,
        EventKind::UsernameFlagged,
        EventKind::UsernameChanged,
        EventKind::UserCreated,
    ];

    /// The topics an open comment queue cares about.
    pub const COMMENT_TOPICS: [EventKind; 6] = [
        EventKind::CommentAccepted,
        EventKind::CommentRejected,
        EventKind::CommentFlagged,
        EventKind::CommentReset,
        EventKind::CommentAdded,
        EventKind::CommentEdited,
    ];
}

/// Kind-specific event payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "payload", rename_all = "snake_case")]
pub enum EventPayload {
    /// Fresh snapshot of the comment after the mutation.
    Comment { comment: Comment },
    /// Flag metadata for an already-present comment.
    Flag { comment_id: Uuid, reason: String },
    /// Account-level events carry only the user.
    User { user_id: Uuid },
}

/// Canonical envelope routed through the event broker.
///
/// Sequence numbers come from a single broker-wide monotonic counter,
/// so they are monotonic per topic and per subject. Delivery is
/// at-least-once; consumers dedup by `(subject_id, seq)`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModerationEvent {
    pub kind: EventKind,
    /// Comment id for comment events, user id for account events.
    pub subject_id: Uuid,
    /// `None` for global account-level events.
    pub site_id: Option<Uuid>,
    pub seq: u64,
    pub payload: EventPayload,
}

impl ModerationEvent {
    /// The comment snapshot, when this event carries one.
    pub fn comment(&self) -> Option<&Comment> {
        match &self.payload {
            EventPayload::Comment { comment } => Some(comment),
            _ => None,
        }
    }
}
