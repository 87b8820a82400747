use axum::{
    Json,
    extract::{Extension, Path, Query, State},
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::application::moderation::service::ModeratorContext;
use crate::domain::comment::entity::{Comment, CommentStatus};
use crate::domain::queue::{QueueKey, QueueSort};
use crate::domain::shared::cursor::Cursor;
use crate::presentation::http::{errors::AppError, state::AppState};

#[derive(Debug, Deserialize)]
pub struct QueueQuery {
    pub cursor: Option<String>,
    pub limit: Option<i64>,
    pub story_id: Option<Uuid>,
    pub site_id: Option<Uuid>,
    pub section: Option<String>,
    pub sort: Option<QueueSort>,
}

#[derive(Debug, Serialize)]
pub struct QueuePageResponse {
    pub items: Vec<Comment>,
    pub next_cursor: Option<String>,
    pub has_more: bool,
}

/// One page of a moderation queue, addressed by status and narrowed by
/// the optional query filters.
pub async fn get_queue(
    State(state): State<AppState>,
    Extension(moderator): Extension<ModeratorContext>,
    Path(status): Path<CommentStatus>,
    Query(query): Query<QueueQuery>,
) -> Result<Json<QueuePageResponse>, AppError> {
    if moderator.scope.is_scoped() {
        let site_id = query.site_id.ok_or_else(|| {
            AppError::Forbidden("Scoped moderators must filter by site".to_string())
        })?;
        if !moderator.scope.allows(Some(site_id)) {
            return Err(AppError::Forbidden("Out of moderation scope".to_string()));
        }
    }

    let cursor = query
        .cursor
        .as_deref()
        .map(Cursor::decode)
        .transpose()
        .map_err(|_| AppError::BadRequest("Invalid cursor".to_string()))?;

    let mut key = QueueKey::for_status(status).with_sort(query.sort.unwrap_or_default());
    if let Some(story_id) = query.story_id {
        key = key.with_story(story_id);
    }
    if let Some(site_id) = query.site_id {
        key = key.with_site(site_id);
    }
    if let Some(section) = query.section {
        key = key.with_section(section);
    }

    let page = state.paginator.fetch_page(&key, cursor, query.limit).await?;

    Ok(Json(QueuePageResponse {
        next_cursor: page.next_cursor.map(|c| c.encode()),
        has_more: page.has_more,
        items: page.items,
    }))
}
