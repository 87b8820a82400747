//! In-memory authoritative store.
//!
//! Backs the test suites and local development. Mirrors the Postgres
//! store's semantics exactly: revision checks, the feature/reject tag
//! invariant, and limit+1 paging.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::comment::entity::{Comment, CommentStatus, ModerationAction, NewComment};
use crate::domain::comment::errors::{ErrorCode, MutationError};
use crate::domain::comment::store::{CommentStore, Page};
use crate::domain::queue::QueueKey;
use crate::domain::shared::cursor::Cursor;

#[derive(Default)]
pub struct MemoryCommentStore {
    comments: Mutex<HashMap<Uuid, Comment>>,
}

impl MemoryCommentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a pre-built comment, bypassing creation rules. Test and
    /// seed helper.
    pub fn put(&self, comment: Comment) {
        self.comments
            .lock()
            .expect("comment store poisoned")
            .insert(comment.id, comment);
    }

    pub fn len(&self) -> usize {
        self.comments.lock().expect("comment store poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Postgres timestamps carry microseconds; keep the in-memory clock at
/// the same precision so cursors compare identically in both stores.
fn now_micros() -> DateTime<Utc> {
    let now = Utc::now();
    DateTime::from_timestamp_micros(now.timestamp_micros()).unwrap_or(now)
}

#[async_trait]
impl CommentStore for MemoryCommentStore {
    async fn get(&self, id: Uuid) -> Result<Option<Comment>, MutationError> {
        Ok(self
            .comments
            .lock()
            .expect("comment store poisoned")
            .get(&id)
            .cloned())
    }

    async fn create(
        &self,
        new: NewComment,
        initial_status: CommentStatus,
    ) -> Result<Comment, MutationError> {
        let now = now_micros();
        let comment = Comment {
            id: Uuid::now_v7(),
            story_id: new.story_id,
            site_id: new.site_id,
            section: new.section,
            author_id: new.author_id,
            body: new.body,
            status: initial_status,
            tags: vec![],
            media: new.media,
            rating: new.rating,
            revision: 0,
            deleted: false,
            created_at: now,
            updated_at: now,
        };
        self.comments
            .lock()
            .expect("comment store poisoned")
            .insert(comment.id, comment.clone());
        Ok(comment)
    }

    async fn apply(
        &self,
        id: Uuid,
        action: ModerationAction,
        expected_revision: i64,
        _moderator: &str,
    ) -> Result<Comment, MutationError> {
        let mut comments = self.comments.lock().expect("comment store poisoned");
        let comment = comments
            .get_mut(&id)
            .ok_or_else(|| MutationError::invalid(ErrorCode::CommentNotFound))?;

        if comment.revision != expected_revision {
            return Err(MutationError::StaleRevision {
                expected: expected_revision,
                actual: comment.revision,
            });
        }

        let mut updated = comment.clone();
        updated.transition(action)?;
        updated.revision += 1;
        updated.updated_at = now_micros();
        *comment = updated.clone();
        Ok(updated)
    }

    async fn fetch_page(
        &self,
        key: &QueueKey,
        cursor: Option<Cursor>,
        limit: i64,
    ) -> Result<Page, MutationError> {
        let limit = limit.max(1) as usize;
        let comments = self.comments.lock().expect("comment store poisoned");

        let mut matching: Vec<Comment> = comments
            .values()
            .filter(|comment| key.admits(comment))
            .filter(|comment| match &cursor {
                Some(cursor) => key.after_cursor(cursor, comment),
                None => true,
            })
            .cloned()
            .collect();
        matching.sort_by(|a, b| key.compare(a, b));

        let has_more = matching.len() > limit;
        matching.truncate(limit);
        let next_cursor = matching
            .last()
            .map(|comment| Cursor::new(comment.created_at, comment.id));

        Ok(Page {
            items: matching,
            next_cursor,
            has_more,
        })
    }
}
