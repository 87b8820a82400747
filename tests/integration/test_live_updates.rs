//! Live-view behavior end to end: service mutations flow through the
//! broker into open queue windows, and degraded subscriptions recover
//! by refetching from the store.

use std::sync::Arc;

use uuid::Uuid;

use modstream::application::moderation::service::{ModerationService, ModeratorContext};
use modstream::application::queues::paginator::Paginator;
use modstream::application::queues::view::{QueueView, ViewUpdate};
use modstream::domain::comment::entity::{CommentStatus, ModerationAction, NewComment};
use modstream::domain::events::EventKind;
use modstream::domain::queue::QueueKey;
use modstream::domain::scope::ModerationScope;
use modstream::infrastructure::broker::EventBroker;
use modstream::infrastructure::repositories::memory_comment_store::MemoryCommentStore;

use crate::helpers::{seed_comment, spawn_app};

fn moderator() -> ModeratorContext {
    ModeratorContext {
        id: "mod@example.com".to_string(),
        scope: ModerationScope::Unscoped,
    }
}

fn view_for(app: &crate::helpers::TestApp, scope: ModerationScope) -> QueueView {
    let paginator = Paginator::new(app.store.clone(), 20, 100);
    let subscription = app.broker.subscribe(EventKind::COMMENT_TOPICS, scope);
    QueueView::new(paginator, subscription)
}

#[tokio::test]
async fn new_comment_appears_in_an_open_queue_window() {
    let app = spawn_app();
    let site = Uuid::now_v7();
    let mut view = view_for(&app, ModerationScope::Unscoped);
    let key = QueueKey::for_status(CommentStatus::Unmoderated).with_site(site);
    view.open(key.clone()).await.unwrap();
    assert!(view.connection(&key).unwrap().is_empty());

    let created = app
        .moderation
        .create_comment(
            NewComment {
                story_id: Uuid::now_v7(),
                site_id: site,
                section: None,
                author_id: Uuid::now_v7(),
                body: "fresh and friendly".to_string(),
                rating: None,
                media: None,
            },
            modstream::domain::comment::entity::AuthorStanding::Good,
            true,
        )
        .await
        .unwrap();

    let updates = view.drain().await.unwrap();
    assert_eq!(updates, vec![ViewUpdate::Applied(EventKind::CommentAdded)]);
    assert!(view.connection(&key).unwrap().contains(created.id));
}

#[tokio::test]
async fn approval_leaves_the_item_dangling_until_acknowledged() {
    let app = spawn_app();
    let site = Uuid::now_v7();
    let comment = seed_comment(&app, CommentStatus::Unmoderated, site, 1);

    let mut view = view_for(&app, ModerationScope::Unscoped);
    let key = QueueKey::for_status(CommentStatus::Unmoderated).with_site(site);
    view.open(key.clone()).await.unwrap();
    assert!(view.connection(&key).unwrap().contains(comment.id));

    app.moderation
        .perform(ModerationAction::Approve, comment.id, 0, &moderator())
        .await
        .unwrap();

    view.drain().await.unwrap();
    let conn = view.connection(&key).unwrap();
    let item = conn.get(comment.id).expect("item still in the window");
    assert!(item.dangling, "moved-away items stay visible as dangling");
    assert_eq!(item.comment.status, CommentStatus::Approved);

    let conn = view.connection_mut(&key).unwrap();
    assert!(conn.acknowledge(comment.id));
    assert!(!conn.contains(comment.id));
}

#[tokio::test]
async fn scoped_view_never_sees_other_sites() {
    let app = spawn_app();
    let my_site = Uuid::now_v7();
    let other_site = Uuid::now_v7();
    let mine = seed_comment(&app, CommentStatus::Unmoderated, my_site, 1);
    let theirs = seed_comment(&app, CommentStatus::Unmoderated, other_site, 1);

    let mut view = view_for(&app, ModerationScope::sites([my_site]));
    let key = QueueKey::for_status(CommentStatus::Unmoderated).with_site(my_site);
    view.open(key.clone()).await.unwrap();

    app.moderation
        .perform(ModerationAction::Approve, mine.id, 0, &moderator())
        .await
        .unwrap();
    app.moderation
        .perform(ModerationAction::Approve, theirs.id, 0, &moderator())
        .await
        .unwrap();

    let updates = view.drain().await.unwrap();
    // Only the in-scope event was delivered at all.
    assert_eq!(
        updates,
        vec![ViewUpdate::Applied(EventKind::CommentAccepted)]
    );
}

#[tokio::test]
async fn degraded_subscription_resyncs_from_the_store() {
    let store = Arc::new(MemoryCommentStore::new());
    // Capacity 2 so a burst of publishes overflows the subscriber.
    let broker = EventBroker::new(2);
    let moderation = ModerationService::new(store.clone(), broker.clone());
    let site = Uuid::now_v7();

    let paginator = Paginator::new(store.clone(), 20, 100);
    let subscription = broker.subscribe(EventKind::COMMENT_TOPICS, ModerationScope::Unscoped);
    let mut view = QueueView::new(paginator, subscription);
    let key = QueueKey::for_status(CommentStatus::Unmoderated).with_site(site);
    view.open(key.clone()).await.unwrap();

    for i in 0..10 {
        moderation
            .create_comment(
                NewComment {
                    story_id: Uuid::now_v7(),
                    site_id: site,
                    section: None,
                    author_id: Uuid::now_v7(),
                    body: format!("burst comment number {}", i),
                    rating: None,
                    media: None,
                },
                modstream::domain::comment::entity::AuthorStanding::Good,
                false,
            )
            .await
            .unwrap();
    }

    let updates = view.drain().await.unwrap();
    assert!(
        updates.contains(&ViewUpdate::Resynced),
        "overflow must force a resync, got {:?}",
        updates
    );
    // After the resync the window matches the store exactly.
    assert_eq!(view.connection(&key).unwrap().len(), 10);
}
