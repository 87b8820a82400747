use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

use crate::domain::comment::entity::{Comment, CommentStatus};
use crate::domain::shared::cursor::Cursor;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[ts(export)]
pub enum QueueSort {
    NewestFirst,
    OldestFirst,
}

impl Default for QueueSort {
    fn default() -> Self {
        QueueSort::NewestFirst
    }
}

/// Identifies one logical moderation queue: a status filter narrowed by
/// optional story/site/section, under a fixed sort order.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueueKey {
    pub status: CommentStatus,
    pub story_id: Option<Uuid>,
    pub site_id: Option<Uuid>,
    pub section: Option<String>,
    pub sort: QueueSort,
}

impl QueueKey {
    pub fn for_status(status: CommentStatus) -> Self {
        QueueKey {
            status,
            story_id: None,
            site_id: None,
            section: None,
            sort: QueueSort::default(),
        }
    }

    pub fn with_site(mut self, site_id: Uuid) -> Self {
        self.site_id = Some(site_id);
        self
    }

    pub fn with_story(mut self, story_id: Uuid) -> Self {
        self.story_id = Some(story_id);
        self
    }

    pub fn with_section(mut self, section: impl Into<String>) -> Self {
        self.section = Some(section.into());
        self
    }

    pub fn with_sort(mut self, sort: QueueSort) -> Self {
        self.sort = sort;
        self
    }

    /// Whether a comment belongs in this queue right now.
    pub fn admits(&self, comment: &Comment) -> bool {
        if comment.deleted || comment.status != self.status {
            return false;
        }
        if let Some(story_id) = self.story_id {
            if comment.story_id != story_id {
                return false;
            }
        }
        if let Some(site_id) = self.site_id {
            if comment.site_id != site_id {
                return false;
            }
        }
        if let Some(section) = &self.section {
            if comment.section.as_deref() != Some(section.as_str()) {
                return false;
            }
        }
        true
    }

    /// Comparison under this queue's sort order, ties broken by id so
    /// the ordering is total and cursors are unambiguous.
    pub fn compare(&self, a: &Comment, b: &Comment) -> std::cmp::Ordering {
        let by_time = match self.sort {
            QueueSort::NewestFirst => b.created_at.cmp(&a.created_at),
            QueueSort::OldestFirst => a.created_at.cmp(&b.created_at),
        };
        by_time.then_with(|| b.id.cmp(&a.id))
    }

    /// Whether a comment sorts strictly after the given cursor
    /// position, i.e. belongs on pages following it.
    pub fn after_cursor(&self, cursor: &Cursor, comment: &Comment) -> bool {
        if comment.created_at == cursor.created_at {
            return comment.id < cursor.id;
        }
        match self.sort {
            QueueSort::NewestFirst => comment.created_at < cursor.created_at,
            QueueSort::OldestFirst => comment.created_at > cursor.created_at,
        }
    }
}

impl std::fmt::Display for QueueKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self.status)?;
        if let Some(story_id) = self.story_id {
            write!(f, ":story={}", story_id)?;
        }
        if let Some(site_id) = self.site_id {
            write!(f, ":site={}", site_id)?;
        }
        if let Some(section) = &self.section {
            write!(f, ":section={}", section)?;
        }
        write!(f, ":{:?}", self.sort)
    }
}
