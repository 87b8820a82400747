use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::domain::comment::entity::{Comment, CommentStatus, ModerationAction, NewComment};
use crate::domain::comment::errors::{ErrorCode, MutationError};
use crate::domain::comment::store::{CommentStore, Page};
use crate::domain::queue::{QueueKey, QueueSort};
use crate::domain::shared::cursor::Cursor;

pub struct SqlxCommentStore {
    pub pool: PgPool,
}

impl SqlxCommentStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn storage(e: sqlx::Error) -> MutationError {
    MutationError::Storage(e.to_string())
}

fn status_str(status: CommentStatus) -> &'static str {
    match status {
        CommentStatus::Unmoderated => "UNMODERATED",
        CommentStatus::Approved => "APPROVED",
        CommentStatus::Rejected => "REJECTED",
    }
}

fn parse_status(raw: &str) -> Result<CommentStatus, MutationError> {
    match raw {
        "UNMODERATED" => Ok(CommentStatus::Unmoderated),
        "APPROVED" => Ok(CommentStatus::Approved),
        "REJECTED" => Ok(CommentStatus::Rejected),
        other => Err(MutationError::Storage(format!(
            "unknown comment status in storage: {other}"
        ))),
    }
}

#[derive(sqlx::FromRow)]
struct CommentRow {
    id: Uuid,
    story_id: Uuid,
    site_id: Uuid,
    section: Option<String>,
    author_id: Uuid,
    body: String,
    status: String,
    tags: serde_json::Value,
    media: Option<serde_json::Value>,
    rating: Option<i32>,
    revision: i64,
    deleted: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<CommentRow> for Comment {
    type Error = MutationError;

    fn try_from(row: CommentRow) -> Result<Self, Self::Error> {
        let tags = serde_json::from_value(row.tags)
            .map_err(|e| MutationError::Storage(format!("invalid tags column: {e}")))?;
        let media = row
            .media
            .map(serde_json::from_value)
            .transpose()
            .map_err(|e| MutationError::Storage(format!("invalid media column: {e}")))?;
        Ok(Comment {
            id: row.id,
            story_id: row.story_id,
            site_id: row.site_id,
            section: row.section,
            author_id: row.author_id,
            body: row.body,
            status: parse_status(&row.status)?,
            tags,
            media,
            rating: row.rating,
            revision: row.revision,
            deleted: row.deleted,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

const SELECT_COLUMNS: &str = "id, story_id, site_id, section, author_id, body, status, tags, \
     media, rating, revision, deleted, created_at, updated_at";

#[async_trait]
impl CommentStore for SqlxCommentStore {
    async fn ping(&self) -> Result<(), MutationError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(storage)?;
        Ok(())
    }

    async fn get(&self, id: Uuid) -> Result<Option<Comment>, MutationError> {
        let row = sqlx::query_as::<_, CommentRow>(&format!(
            "SELECT {SELECT_COLUMNS} FROM comments WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(storage)?;
        row.map(Comment::try_from).transpose()
    }

    async fn create(
        &self,
        new: NewComment,
        initial_status: CommentStatus,
    ) -> Result<Comment, MutationError> {
        let id = Uuid::now_v7();
        let media = new
            .media
            .as_ref()
            .map(serde_json::to_value)
            .transpose()
            .map_err(|e| MutationError::Storage(e.to_string()))?;

        let row = sqlx::query_as::<_, CommentRow>(&format!(
            "INSERT INTO comments (id, story_id, site_id, section, author_id, body, status, tags, media, rating) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, '[]'::jsonb, $8, $9) \
             RETURNING {SELECT_COLUMNS}"
        ))
        .bind(id)
        .bind(new.story_id)
        .bind(new.site_id)
        .bind(&new.section)
        .bind(new.author_id)
        .bind(&new.body)
        .bind(status_str(initial_status))
        .bind(media)
        .bind(new.rating)
        .fetch_one(&self.pool)
        .await
        .map_err(storage)?;

        row.try_into()
    }

    async fn apply(
        &self,
        id: Uuid,
        action: ModerationAction,
        expected_revision: i64,
        moderator: &str,
    ) -> Result<Comment, MutationError> {
        let mut tx = self.pool.begin().await.map_err(storage)?;

        let row = sqlx::query_as::<_, CommentRow>(&format!(
            "SELECT {SELECT_COLUMNS} FROM comments WHERE id = $1 FOR UPDATE"
        ))
        .bind(id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(storage)?
        .ok_or_else(|| MutationError::invalid(ErrorCode::CommentNotFound))?;

        let mut comment = Comment::try_from(row)?;
        if comment.revision != expected_revision {
            return Err(MutationError::StaleRevision {
                expected: expected_revision,
                actual: comment.revision,
            });
        }

        comment.transition(action)?;
        comment.revision += 1;

        let tags = serde_json::to_value(&comment.tags)
            .map_err(|e| MutationError::Storage(e.to_string()))?;
        let updated_at = sqlx::query_scalar::<_, DateTime<Utc>>(
            "UPDATE comments \
             SET status = $1, tags = $2, revision = $3, moderated_by = $4, updated_at = NOW() \
             WHERE id = $5 \
             RETURNING updated_at",
        )
        .bind(status_str(comment.status))
        .bind(tags)
        .bind(comment.revision)
        .bind(moderator)
        .bind(id)
        .fetch_one(&mut *tx)
        .await
        .map_err(storage)?;
        tx.commit().await.map_err(storage)?;

        comment.updated_at = updated_at;
        Ok(comment)
    }

    async fn fetch_page(
        &self,
        key: &QueueKey,
        cursor: Option<Cursor>,
        limit: i64,
    ) -> Result<Page, MutationError> {
        let limit = limit.max(1);
        let mut qb: QueryBuilder<Postgres> = QueryBuilder::new(format!(
            "SELECT {SELECT_COLUMNS} FROM comments WHERE deleted = FALSE AND status = "
        ));
        qb.push_bind(status_str(key.status));
        if let Some(story_id) = key.story_id {
            qb.push(" AND story_id = ");
            qb.push_bind(story_id);
        }
        if let Some(site_id) = key.site_id {
            qb.push(" AND site_id = ");
            qb.push_bind(site_id);
        }
        if let Some(section) = &key.section {
            qb.push(" AND section = ");
            qb.push_bind(section.clone());
        }
        if let Some(cursor) = &cursor {
            // Strict keyset predicate so pages stay stable under
            // concurrent inserts at the head.
            let op = match key.sort {
                QueueSort::NewestFirst => "<",
                QueueSort::OldestFirst => ">",
            };
            qb.push(format!(" AND (created_at {op} "));
            qb.push_bind(cursor.created_at);
            qb.push(" OR (created_at = ");
            qb.push_bind(cursor.created_at);
            qb.push(" AND id < ");
            qb.push_bind(cursor.id);
            qb.push("))");
        }
        match key.sort {
            QueueSort::NewestFirst => qb.push(" ORDER BY created_at DESC, id DESC LIMIT "),
            QueueSort::OldestFirst => qb.push(" ORDER BY created_at ASC, id DESC LIMIT "),
        };
        qb.push_bind(limit + 1);

        let rows = qb
            .build_query_as::<CommentRow>()
            .fetch_all(&self.pool)
            .await
            .map_err(storage)?;

        let has_more = rows.len() as i64 > limit;
        let mut items = rows
            .into_iter()
            .map(Comment::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        items.truncate(limit as usize);
        let next_cursor = items
            .last()
            .map(|comment| Cursor::new(comment.created_at, comment.id));

        Ok(Page {
            items,
            next_cursor,
            has_more,
        })
    }
}
