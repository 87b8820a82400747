use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::comment::entity::{Comment, CommentStatus, ModerationAction, NewComment};
use crate::domain::comment::errors::MutationError;
use crate::domain::queue::QueueKey;
use crate::domain::shared::cursor::Cursor;

/// One page of a moderation queue.
#[derive(Debug, Clone)]
pub struct Page {
    pub items: Vec<Comment>,
    pub next_cursor: Option<Cursor>,
    /// Only `false` when the store confirmed nothing further exists at
    /// request time.
    pub has_more: bool,
}

/// The authoritative comment store.
///
/// In-memory connection windows are caches over this; on any conflict
/// the store's answer wins. `apply` enforces the optimistic-concurrency
/// check: it must not touch the comment when `expected_revision` is
/// stale.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CommentStore: Send + Sync {
    /// Cheap connectivity probe for health reporting.
    async fn ping(&self) -> Result<(), MutationError> {
        Ok(())
    }

    async fn get(&self, id: Uuid) -> Result<Option<Comment>, MutationError>;

    async fn create(
        &self,
        new: NewComment,
        initial_status: CommentStatus,
    ) -> Result<Comment, MutationError>;

    async fn apply(
        &self,
        id: Uuid,
        action: ModerationAction,
        expected_revision: i64,
        moderator: &str,
    ) -> Result<Comment, MutationError>;

    async fn fetch_page(
        &self,
        key: &QueueKey,
        cursor: Option<Cursor>,
        limit: i64,
    ) -> Result<Page, MutationError>;
}
