use axum::{
    Json,
    extract::{Extension, Path, State},
};
use serde::Deserialize;
use uuid::Uuid;

use crate::application::moderation::service::ModeratorContext;
use crate::domain::comment::entity::{Comment, ModerationAction};
use crate::presentation::http::{errors::AppError, state::AppState};

#[derive(Debug, Deserialize)]
pub struct ActionRequest {
    /// Revision the client last saw. A mismatch means someone else got
    /// there first and the request is rejected with a conflict.
    pub expected_revision: i64,
}

async fn run(
    state: AppState,
    moderator: ModeratorContext,
    action: ModerationAction,
    id: Uuid,
    body: ActionRequest,
) -> Result<Json<Comment>, AppError> {
    let comment = state
        .moderation
        .perform(action, id, body.expected_revision, &moderator)
        .await?;
    Ok(Json(comment))
}

pub async fn approve_comment(
    State(state): State<AppState>,
    Extension(moderator): Extension<ModeratorContext>,
    Path(id): Path<Uuid>,
    Json(body): Json<ActionRequest>,
) -> Result<Json<Comment>, AppError> {
    run(state, moderator, ModerationAction::Approve, id, body).await
}

pub async fn reject_comment(
    State(state): State<AppState>,
    Extension(moderator): Extension<ModeratorContext>,
    Path(id): Path<Uuid>,
    Json(body): Json<ActionRequest>,
) -> Result<Json<Comment>, AppError> {
    run(state, moderator, ModerationAction::Reject, id, body).await
}

pub async fn feature_comment(
    State(state): State<AppState>,
    Extension(moderator): Extension<ModeratorContext>,
    Path(id): Path<Uuid>,
    Json(body): Json<ActionRequest>,
) -> Result<Json<Comment>, AppError> {
    run(state, moderator, ModerationAction::Feature, id, body).await
}

pub async fn unfeature_comment(
    State(state): State<AppState>,
    Extension(moderator): Extension<ModeratorContext>,
    Path(id): Path<Uuid>,
    Json(body): Json<ActionRequest>,
) -> Result<Json<Comment>, AppError> {
    run(state, moderator, ModerationAction::Unfeature, id, body).await
}
