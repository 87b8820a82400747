use chrono::{Duration, Utc};
use uuid::Uuid;

use modstream::domain::comment::entity::{
    Comment, CommentStatus, CommentTag, ModerationAction,
};
use modstream::domain::comment::errors::{ErrorCode, MutationError};
use modstream::domain::comment::media::CommentMedia;
use modstream::domain::queue::{QueueKey, QueueSort};
use modstream::domain::shared::cursor::Cursor;

fn comment(status: CommentStatus, age_secs: i64) -> Comment {
    let created = Utc::now() - Duration::seconds(age_secs);
    Comment {
        id: Uuid::now_v7(),
        story_id: Uuid::now_v7(),
        site_id: Uuid::now_v7(),
        section: None,
        author_id: Uuid::now_v7(),
        body: "body".to_string(),
        status,
        tags: vec![],
        media: None,
        rating: None,
        revision: 0,
        deleted: false,
        created_at: created,
        updated_at: created,
    }
}

#[test]
fn queue_key_admits_by_status_site_and_section() {
    let mut c = comment(CommentStatus::Unmoderated, 1);
    c.section = Some("politics".to_string());

    let key = QueueKey::for_status(CommentStatus::Unmoderated)
        .with_site(c.site_id)
        .with_section("politics");
    assert!(key.admits(&c));

    let wrong_section = QueueKey::for_status(CommentStatus::Unmoderated)
        .with_site(c.site_id)
        .with_section("sports");
    assert!(!wrong_section.admits(&c));

    let wrong_status = QueueKey::for_status(CommentStatus::Rejected).with_site(c.site_id);
    assert!(!wrong_status.admits(&c));
}

#[test]
fn deleted_comments_are_never_admitted() {
    let mut c = comment(CommentStatus::Unmoderated, 1);
    c.deleted = true;
    assert!(!QueueKey::for_status(CommentStatus::Unmoderated).admits(&c));
}

#[test]
fn newest_first_sorts_recent_items_ahead() {
    let newer = comment(CommentStatus::Unmoderated, 1);
    let older = comment(CommentStatus::Unmoderated, 100);
    let key = QueueKey::for_status(CommentStatus::Unmoderated);
    assert!(key.compare(&newer, &older).is_lt());

    let oldest_first = key.with_sort(QueueSort::OldestFirst);
    assert!(oldest_first.compare(&older, &newer).is_lt());
}

#[test]
fn equal_timestamps_break_ties_by_id() {
    let a = comment(CommentStatus::Unmoderated, 1);
    let mut b = comment(CommentStatus::Unmoderated, 1);
    b.created_at = a.created_at;
    let key = QueueKey::for_status(CommentStatus::Unmoderated);
    let ordering = key.compare(&a, &b);
    assert!(ordering.is_ne(), "ordering must be total");
    assert_eq!(key.compare(&b, &a), ordering.reverse());
}

#[test]
fn after_cursor_excludes_the_cursor_position_itself() {
    let c = comment(CommentStatus::Unmoderated, 10);
    let key = QueueKey::for_status(CommentStatus::Unmoderated);
    let cursor = Cursor::new(c.created_at, c.id);
    assert!(!key.after_cursor(&cursor, &c));

    let older = comment(CommentStatus::Unmoderated, 100);
    assert!(key.after_cursor(&cursor, &older));

    let newer = comment(CommentStatus::Unmoderated, 1);
    assert!(!key.after_cursor(&cursor, &newer));
}

#[test]
fn cursor_tokens_are_opaque_and_stable() {
    let cursor = Cursor::new(Utc::now(), Uuid::now_v7());
    let token = cursor.encode();
    assert!(!token.contains(':'), "raw form must not leak");
    let decoded = Cursor::decode(&token).unwrap();
    assert_eq!(decoded.id, cursor.id);
}

#[test]
fn cursor_rejects_malformed_tokens() {
    assert!(Cursor::decode("!!definitely not base64!!").is_err());
    assert!(Cursor::decode("").is_err());
}

#[test]
fn reject_strips_the_featured_tag() {
    let mut c = comment(CommentStatus::Approved, 1);
    c.tags.push(CommentTag::Featured);
    c.transition(ModerationAction::Reject).unwrap();
    assert_eq!(c.status, CommentStatus::Rejected);
    assert!(!c.is_featured());
}

#[test]
fn feature_is_idempotent_on_the_tag_list() {
    let mut c = comment(CommentStatus::Approved, 1);
    c.transition(ModerationAction::Feature).unwrap();
    c.transition(ModerationAction::Feature).unwrap();
    assert_eq!(
        c.tags.iter().filter(|t| **t == CommentTag::Featured).count(),
        1
    );
}

#[test]
fn rejected_comments_cannot_be_featured() {
    let mut c = comment(CommentStatus::Rejected, 1);
    let err = c.transition(ModerationAction::Feature).unwrap_err();
    assert!(matches!(
        err,
        MutationError::InvalidRequest {
            code: ErrorCode::CannotFeatureRejectedComment,
            ..
        }
    ));
}

#[test]
fn media_serializes_with_provider_tag() {
    let media = CommentMedia::Giphy {
        url: "https://giphy.com/gifs/abc".to_string(),
        still: "https://media.giphy.com/abc_s.gif".to_string(),
        video: "https://media.giphy.com/abc.mp4".to_string(),
        title: None,
    };
    let json = serde_json::to_value(&media).unwrap();
    assert_eq!(json["type"], "giphy");
    assert_eq!(media.url(), "https://giphy.com/gifs/abc");
}

#[test]
fn statuses_serialize_screaming_snake() {
    assert_eq!(
        serde_json::to_value(CommentStatus::Unmoderated).unwrap(),
        "UNMODERATED"
    );
    assert_eq!(
        serde_json::to_value(ModerationAction::Unfeature).unwrap(),
        "UNFEATURE"
    );
}
