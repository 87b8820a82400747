//! The mutation coordinator: every moderation write goes through here.
//!
//! Actions run against the authoritative store under an
//! optimistic-concurrency check and publish a moderation event on
//! success. Stale revisions and hard request failures are surfaced
//! immediately — repeating a moderation action automatically is
//! unsafe. The one automatic retry in the system is the nudge path on
//! comment creation.

use std::sync::Arc;

use uuid::Uuid;

use crate::application::moderation::filter::{self, FilterVerdict};
use crate::domain::comment::entity::{
    AuthorStanding, Comment, CommentStatus, ModerationAction, NewComment,
};
use crate::domain::comment::errors::{ErrorCode, MutationError};
use crate::domain::comment::store::CommentStore;
use crate::domain::events::{EventKind, EventPayload};
use crate::domain::scope::ModerationScope;
use crate::infrastructure::broker::EventBroker;

const MIN_BODY_CHARS: usize = 2;
const MAX_BODY_CHARS: usize = 2000;

/// Identity and authorization of the acting moderator, supplied by the
/// external authorization collaborator. The coordinator trusts it.
#[derive(Debug, Clone)]
pub struct ModeratorContext {
    pub id: String,
    pub scope: ModerationScope,
}

#[derive(Clone)]
pub struct ModerationService {
    store: Arc<dyn CommentStore>,
    broker: EventBroker,
}

impl ModerationService {
    pub fn new(store: Arc<dyn CommentStore>, broker: EventBroker) -> Self {
        ModerationService { store, broker }
    }

    /// Execute one of the four moderation actions against a comment at
    /// `expected_revision`.
    pub async fn perform(
        &self,
        action: ModerationAction,
        comment_id: Uuid,
        expected_revision: i64,
        moderator: &ModeratorContext,
    ) -> Result<Comment, MutationError> {
        let comment = self
            .store
            .get(comment_id)
            .await?
            .ok_or_else(|| MutationError::invalid(ErrorCode::CommentNotFound))?;

        if !moderator.scope.allows(Some(comment.site_id)) {
            return Err(MutationError::Unauthorized);
        }

        let updated = self
            .store
            .apply(comment_id, action, expected_revision, &moderator.id)
            .await?;

        let kind = match action {
            ModerationAction::Approve => EventKind::CommentAccepted,
            ModerationAction::Reject => EventKind::CommentRejected,
            ModerationAction::Feature | ModerationAction::Unfeature => EventKind::CommentEdited,
        };
        self.broker.publish(
            kind,
            updated.id,
            Some(updated.site_id),
            EventPayload::Comment {
                comment: updated.clone(),
            },
        );

        tracing::info!(
            moderator = %moderator.id,
            comment = %comment_id,
            action = ?action,
            revision = updated.revision,
            "moderation action applied"
        );
        Ok(updated)
    }

    /// Create a comment on behalf of an author.
    ///
    /// With `nudge` on, a suspect verdict from the content filter is
    /// returned as [`MutationError::ModerationNudge`] without creating
    /// anything, and the attempt is repeated exactly once with nudging
    /// off — which stores the comment flagged for review instead. Hard
    /// failures are never retried.
    pub async fn create_comment(
        &self,
        new: NewComment,
        standing: AuthorStanding,
        nudge: bool,
    ) -> Result<Comment, MutationError> {
        if !nudge {
            return self.try_create(new, standing, false).await;
        }
        match self.try_create(new.clone(), standing, true).await {
            Err(MutationError::ModerationNudge(message)) => {
                tracing::debug!(
                    story = %new.story_id,
                    %message,
                    "comment nudged, retrying with reduced nudging"
                );
                self.try_create(new, standing, false).await
            }
            other => other,
        }
    }

    async fn try_create(
        &self,
        new: NewComment,
        standing: AuthorStanding,
        nudge: bool,
    ) -> Result<Comment, MutationError> {
        match standing {
            AuthorStanding::Good => {}
            AuthorStanding::Warned => {
                return Err(MutationError::invalid(ErrorCode::UserWarned));
            }
            AuthorStanding::Suspended => {
                return Err(MutationError::invalid(ErrorCode::UserSuspended));
            }
            AuthorStanding::Banned => {
                return Err(MutationError::invalid(ErrorCode::UserBanned));
            }
        }

        let body = new.body.trim();
        if body.chars().count() < MIN_BODY_CHARS {
            return Err(MutationError::invalid_field(
                ErrorCode::CommentBodyTooShort,
                "body",
                "Comment is too short.",
            ));
        }
        if body.chars().count() > MAX_BODY_CHARS {
            return Err(MutationError::invalid_field(
                ErrorCode::CommentBodyExceedsMaxLength,
                "body",
                "Comment exceeds the maximum length.",
            ));
        }
        if let Some(rating) = new.rating {
            if !(1..=5).contains(&rating) {
                return Err(MutationError::invalid_field(
                    ErrorCode::InvalidRating,
                    "rating",
                    "Rating must be between 1 and 5.",
                ));
            }
        }

        let (initial_status, flag_reason) = match filter::assess(body) {
            FilterVerdict::Clean => (CommentStatus::Unmoderated, None),
            FilterVerdict::Suspect { message, flags } => {
                if nudge {
                    return Err(MutationError::ModerationNudge(message));
                }
                (CommentStatus::Unmoderated, Some(flags.join(",")))
            }
            FilterVerdict::Severe { flags, .. } => {
                (CommentStatus::Rejected, Some(flags.join(",")))
            }
        };

        let created = self.store.create(new, initial_status).await?;

        self.broker.publish(
            EventKind::CommentAdded,
            created.id,
            Some(created.site_id),
            EventPayload::Comment {
                comment: created.clone(),
            },
        );
        if let Some(reason) = flag_reason {
            self.broker.publish(
                EventKind::CommentFlagged,
                created.id,
                Some(created.site_id),
                EventPayload::Flag {
                    comment_id: created.id,
                    reason,
                },
            );
        }

        tracing::info!(comment = %created.id, status = ?created.status, "comment created");
        Ok(created)
    }
}
