use std::collections::{HashMap, HashSet};

use uuid::Uuid;

use crate::domain::comment::entity::Comment;
use crate::domain::comment::store::Page;
use crate::domain::queue::QueueKey;
use crate::domain::shared::cursor::Cursor;

/// Author-account annotation attached to window items when account
/// events arrive. Does not change queue membership.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthorStatus {
    Suspended,
    Banned,
}

/// One entry of an in-memory queue window.
#[derive(Debug, Clone)]
pub struct QueueItem {
    pub comment: Comment,
    /// The comment's status no longer matches the queue's filter, but
    /// it has not been acknowledged away yet. Display policy is the
    /// presentation layer's problem; this is a pure data flag.
    pub dangling: bool,
    pub flagged: bool,
    pub flag_reason: Option<String>,
    pub author_status: Option<AuthorStatus>,
}

impl QueueItem {
    fn new(comment: Comment) -> Self {
        QueueItem {
            comment,
            dangling: false,
            flagged: false,
            flag_reason: None,
            author_status: None,
        }
    }
}

/// The client-visible window over one moderation queue.
///
/// This is a cache over the authoritative store: events and page
/// fetches both merge into it, and the store wins on conflict (a
/// refetch rebuilds the window from scratch).
pub struct QueueConnection {
    pub key: QueueKey,
    items: Vec<QueueItem>,
    /// Ids ever admitted in this session, for duplicate suppression
    /// across overlapping pages.
    seen: HashSet<Uuid>,
    next_cursor: Option<Cursor>,
    has_more: bool,
    fetch_in_flight: bool,
    /// Last applied event sequence per subject, for at-least-once
    /// replay safety.
    last_seq: HashMap<Uuid, u64>,
}

impl QueueConnection {
    pub fn new(key: QueueKey) -> Self {
        QueueConnection {
            key,
            items: Vec::new(),
            seen: HashSet::new(),
            next_cursor: None,
            has_more: true,
            fetch_in_flight: false,
            last_seq: HashMap::new(),
        }
    }

    pub fn items(&self) -> &[QueueItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn contains(&self, id: Uuid) -> bool {
        self.items.iter().any(|item| item.comment.id == id)
    }

    pub fn get(&self, id: Uuid) -> Option<&QueueItem> {
        self.items.iter().find(|item| item.comment.id == id)
    }

    pub fn next_cursor(&self) -> Option<Cursor> {
        self.next_cursor
    }

    pub fn has_more(&self) -> bool {
        self.has_more
    }

    pub fn fetch_in_flight(&self) -> bool {
        self.fetch_in_flight
    }

    /// Claim the fetch slot for this connection. Returns false when a
    /// fetch (load-more or refetch) is already running, which callers
    /// must treat as "try again later".
    pub fn begin_fetch(&mut self) -> bool {
        if self.fetch_in_flight {
            return false;
        }
        self.fetch_in_flight = true;
        true
    }

    pub fn finish_fetch(&mut self) {
        self.fetch_in_flight = false;
    }

    /// Merge a fetched page into the window, suppressing items already
    /// present in this session.
    pub fn absorb_page(&mut self, page: Page) -> usize {
        let mut appended = 0;
        for comment in page.items {
            if self.seen.insert(comment.id) {
                self.insert_sorted(comment);
                appended += 1;
            }
        }
        self.next_cursor = page.next_cursor;
        self.has_more = page.has_more;
        appended
    }

    /// Drop all window state except the key, ahead of a refetch.
    pub fn reset(&mut self) {
        self.items.clear();
        self.seen.clear();
        self.next_cursor = None;
        self.has_more = true;
        // last_seq survives: replayed events stay deduplicated across
        // the resync.
    }

    /// Record an event sequence for a subject. Returns false when the
    /// event is a replay (seq <= last seen) and must be discarded.
    pub fn note_seq(&mut self, subject_id: Uuid, seq: u64) -> bool {
        match self.last_seq.get(&subject_id) {
            Some(last) if seq <= *last => false,
            _ => {
                self.last_seq.insert(subject_id, seq);
                true
            }
        }
    }

    /// Insert at the position implied by the queue's sort key.
    pub fn insert_sorted(&mut self, comment: Comment) {
        self.seen.insert(comment.id);
        let position = self
            .items
            .partition_point(|item| self.key.compare(&item.comment, &comment).is_lt());
        self.items.insert(position, QueueItem::new(comment));
    }

    /// Replace the snapshot for an existing item, keeping annotations.
    pub fn update_comment(&mut self, comment: Comment) -> bool {
        if let Some(item) = self.items.iter_mut().find(|i| i.comment.id == comment.id) {
            item.comment = comment;
            item.dangling = false;
            true
        } else {
            false
        }
    }

    pub fn mark_dangling(&mut self, comment: Comment) -> bool {
        if let Some(item) = self.items.iter_mut().find(|i| i.comment.id == comment.id) {
            item.comment = comment;
            item.dangling = true;
            true
        } else {
            false
        }
    }

    pub fn mark_flagged(&mut self, id: Uuid, reason: String) -> bool {
        if let Some(item) = self.items.iter_mut().find(|i| i.comment.id == id) {
            item.flagged = true;
            item.flag_reason = Some(reason);
            true
        } else {
            false
        }
    }

    pub fn annotate_author(&mut self, author_id: Uuid, status: AuthorStatus) -> usize {
        let mut touched = 0;
        for item in &mut self.items {
            if item.comment.author_id == author_id {
                item.author_status = Some(status);
                touched += 1;
            }
        }
        touched
    }

    /// Explicit moderator acknowledgment of a dangling item: only now
    /// does it leave the visible window.
    pub fn acknowledge(&mut self, id: Uuid) -> bool {
        let before = self.items.len();
        self.items
            .retain(|item| !(item.comment.id == id && item.dangling));
        self.items.len() != before
    }
}
