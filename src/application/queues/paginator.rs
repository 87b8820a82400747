use std::sync::Arc;

use crate::application::queues::connection::QueueConnection;
use crate::domain::comment::errors::MutationError;
use crate::domain::comment::store::{CommentStore, Page};
use crate::domain::queue::QueueKey;
use crate::domain::shared::cursor::Cursor;

/// Result of asking a connection for more items.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// Items appended to the window.
    Appended(usize),
    /// A fetch for this connection is already in flight; load-more and
    /// refetch are serialized per key.
    Busy,
    /// The store confirmed there is nothing further.
    End,
}

/// Cursor-based forward pagination over moderation queues.
#[derive(Clone)]
pub struct Paginator {
    store: Arc<dyn CommentStore>,
    default_limit: i64,
    max_limit: i64,
}

impl Paginator {
    pub fn new(store: Arc<dyn CommentStore>, default_limit: i64, max_limit: i64) -> Self {
        Paginator {
            store,
            default_limit: default_limit.max(1),
            max_limit: max_limit.max(1),
        }
    }

    pub fn clamp_limit(&self, limit: Option<i64>) -> i64 {
        limit.unwrap_or(self.default_limit).clamp(1, self.max_limit)
    }

    /// Raw page fetch; `cursor = None` starts from the head of the
    /// queue's sort order.
    pub async fn fetch_page(
        &self,
        key: &QueueKey,
        cursor: Option<Cursor>,
        limit: Option<i64>,
    ) -> Result<Page, MutationError> {
        let limit = self.clamp_limit(limit);
        self.store.fetch_page(key, cursor, limit).await
    }

    /// Load the first page into a fresh or reset connection window.
    pub async fn load_first(
        &self,
        conn: &mut QueueConnection,
        limit: Option<i64>,
    ) -> Result<LoadOutcome, MutationError> {
        if !conn.begin_fetch() {
            return Ok(LoadOutcome::Busy);
        }
        let result = self
            .store
            .fetch_page(&conn.key, None, self.clamp_limit(limit))
            .await;
        conn.finish_fetch();
        let page = result?;
        Ok(LoadOutcome::Appended(conn.absorb_page(page)))
    }

    /// Fetch the next page after the connection's cursor.
    pub async fn load_more(
        &self,
        conn: &mut QueueConnection,
        limit: Option<i64>,
    ) -> Result<LoadOutcome, MutationError> {
        if !conn.has_more() {
            return Ok(LoadOutcome::End);
        }
        if !conn.begin_fetch() {
            return Ok(LoadOutcome::Busy);
        }
        let cursor = conn.next_cursor();
        let result = self
            .store
            .fetch_page(&conn.key, cursor, self.clamp_limit(limit))
            .await;
        conn.finish_fetch();
        let page = result?;
        let appended = conn.absorb_page(page);
        if appended == 0 && !conn.has_more() {
            return Ok(LoadOutcome::End);
        }
        Ok(LoadOutcome::Appended(appended))
    }

    /// Throw the window away and rebuild it from the store. Used after
    /// a sort-order change and after a degraded-subscription signal.
    pub async fn refetch(
        &self,
        conn: &mut QueueConnection,
        limit: Option<i64>,
    ) -> Result<LoadOutcome, MutationError> {
        if !conn.begin_fetch() {
            return Ok(LoadOutcome::Busy);
        }
        conn.reset();
        let result = self
            .store
            .fetch_page(&conn.key, None, self.clamp_limit(limit))
            .await;
        conn.finish_fetch();
        let page = result?;
        Ok(LoadOutcome::Appended(conn.absorb_page(page)))
    }
}
