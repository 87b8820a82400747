//! Merges broker deliveries into queue-connection windows.
//!
//! The reconciler keeps a window consistent with server truth without a
//! full refetch. It never silently removes an item a moderator may be
//! looking at: an item whose status stops matching the queue filter is
//! marked dangling and stays until acknowledged or refetched.

use crate::application::queues::connection::{AuthorStatus, QueueConnection};
use crate::domain::events::{EventKind, EventPayload, ModerationEvent};

/// What applying one event did to a window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    Inserted,
    Updated,
    MarkedDangling,
    Flagged,
    Annotated,
    /// Event did not concern this window.
    Ignored,
    /// Replay (sequence at or below the last seen for the subject).
    Discarded,
}

pub fn apply(conn: &mut QueueConnection, event: &ModerationEvent) -> Applied {
    if !conn.note_seq(event.subject_id, event.seq) {
        return Applied::Discarded;
    }

    match event.kind {
        EventKind::CommentAccepted | EventKind::CommentRejected | EventKind::CommentReset => {
            status_change(conn, event)
        }
        EventKind::CommentAdded | EventKind::CommentEdited => upsert(conn, event),
        EventKind::CommentFlagged => flag(conn, event),
        EventKind::UserSuspended => annotate(conn, event, AuthorStatus::Suspended),
        EventKind::UserBanned => annotate(conn, event, AuthorStatus::Banned),
        // Username and account-creation events carry no queue-window
        // consequence; they flow through to the presentation layer.
        EventKind::UsernameRejected
        | EventKind::UsernameApproved
        | EventKind::UsernameFlagged
        | EventKind::UsernameChanged
        | EventKind::UserCreated => Applied::Ignored,
    }
}

fn status_change(conn: &mut QueueConnection, event: &ModerationEvent) -> Applied {
    let Some(comment) = event.comment() else {
        return Applied::Ignored;
    };
    if conn.key.admits(comment) {
        if conn.update_comment(comment.clone()) {
            Applied::Updated
        } else {
            conn.insert_sorted(comment.clone());
            Applied::Inserted
        }
    } else if conn.mark_dangling(comment.clone()) {
        Applied::MarkedDangling
    } else {
        Applied::Ignored
    }
}

fn upsert(conn: &mut QueueConnection, event: &ModerationEvent) -> Applied {
    let Some(comment) = event.comment() else {
        return Applied::Ignored;
    };
    if conn.key.admits(comment) {
        if conn.update_comment(comment.clone()) {
            Applied::Updated
        } else {
            conn.insert_sorted(comment.clone());
            Applied::Inserted
        }
    } else if event.kind == EventKind::CommentEdited && conn.mark_dangling(comment.clone()) {
        Applied::MarkedDangling
    } else {
        Applied::Ignored
    }
}

fn flag(conn: &mut QueueConnection, event: &ModerationEvent) -> Applied {
    let EventPayload::Flag { comment_id, reason } = &event.payload else {
        return Applied::Ignored;
    };
    if conn.mark_flagged(*comment_id, reason.clone()) {
        Applied::Flagged
    } else {
        Applied::Ignored
    }
}

fn annotate(conn: &mut QueueConnection, event: &ModerationEvent, status: AuthorStatus) -> Applied {
    if conn.annotate_author(event.subject_id, status) > 0 {
        Applied::Annotated
    } else {
        Applied::Ignored
    }
}
