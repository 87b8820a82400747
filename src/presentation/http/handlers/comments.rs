use axum::{Json, extract::State, http::StatusCode};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use crate::domain::comment::entity::{AuthorStanding, Comment, NewComment};
use crate::domain::comment::media::CommentMedia;
use crate::presentation::http::{errors::AppError, state::AppState};

fn default_true() -> bool {
    true
}

fn default_standing() -> AuthorStanding {
    AuthorStanding::Good
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateCommentRequest {
    pub story_id: Uuid,
    pub site_id: Uuid,
    pub section: Option<String>,
    pub author_id: Uuid,
    /// Account standing as reported by the authorization collaborator
    /// fronting this service.
    #[serde(default = "default_standing")]
    pub author_standing: AuthorStanding,
    #[validate(length(min = 2, max = 2000))]
    pub body: String,
    #[validate(range(min = 1, max = 5))]
    pub rating: Option<i32>,
    pub media: Option<CommentMedia>,
    /// With nudging on, a suspect comment is bounced back to the author
    /// once before being stored flagged for review.
    #[serde(default = "default_true")]
    pub nudge: bool,
}

pub async fn create_comment(
    State(state): State<AppState>,
    Json(body): Json<CreateCommentRequest>,
) -> Result<(StatusCode, Json<Comment>), AppError> {
    body.validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    let new = NewComment {
        story_id: body.story_id,
        site_id: body.site_id,
        section: body.section,
        author_id: body.author_id,
        body: body.body,
        rating: body.rating,
        media: body.media,
    };

    let created = state
        .moderation
        .create_comment(new, body.author_standing, body.nudge)
        .await?;

    Ok((StatusCode::CREATED, Json(created)))
}
