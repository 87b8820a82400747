use std::collections::HashSet;

use axum::http::StatusCode;
use uuid::Uuid;

use modstream::domain::comment::entity::{Comment, CommentStatus};

use crate::helpers::*;

#[derive(serde::Deserialize)]
struct PageBody {
    items: Vec<Comment>,
    next_cursor: Option<String>,
    has_more: bool,
}

#[tokio::test]
async fn pages_walk_the_queue_without_duplicates() {
    let app = spawn_app();
    let site = Uuid::now_v7();
    for age in 1..=7 {
        seed_comment(&app, CommentStatus::Unmoderated, site, age * 10);
    }
    let token = moderator_token(&app);

    let mut seen = HashSet::new();
    let mut cursor: Option<String> = None;
    let mut pages = 0;
    loop {
        let uri = match &cursor {
            Some(c) => format!("/api/v1/moderate/queues/UNMODERATED?limit=3&cursor={}", c),
            None => "/api/v1/moderate/queues/UNMODERATED?limit=3".to_string(),
        };
        let res = send(&app.app, get_request(&uri, Some(&token))).await;
        let res = expect_status(res, StatusCode::OK).await;
        let page: PageBody = read_json(res).await;

        for item in &page.items {
            assert!(seen.insert(item.id), "duplicate item across pages");
        }
        pages += 1;
        if !page.has_more {
            break;
        }
        cursor = page.next_cursor;
        assert!(cursor.is_some(), "has_more implies a cursor");
    }

    assert_eq!(seen.len(), 7);
    assert_eq!(pages, 3);
}

#[tokio::test]
async fn newest_first_is_the_default_order() {
    let app = spawn_app();
    let site = Uuid::now_v7();
    for age in 1..=4 {
        seed_comment(&app, CommentStatus::Unmoderated, site, age * 10);
    }
    let token = moderator_token(&app);

    let res = send(
        &app.app,
        get_request("/api/v1/moderate/queues/UNMODERATED", Some(&token)),
    )
    .await;
    let res = expect_status(res, StatusCode::OK).await;
    let page: PageBody = read_json(res).await;
    let times: Vec<_> = page.items.iter().map(|c| c.created_at).collect();
    let mut sorted = times.clone();
    sorted.sort_by(|a, b| b.cmp(a));
    assert_eq!(times, sorted);
}

#[tokio::test]
async fn oldest_first_sort_is_honored() {
    let app = spawn_app();
    let site = Uuid::now_v7();
    for age in 1..=4 {
        seed_comment(&app, CommentStatus::Unmoderated, site, age * 10);
    }
    let token = moderator_token(&app);

    let res = send(
        &app.app,
        get_request(
            "/api/v1/moderate/queues/UNMODERATED?sort=OLDEST_FIRST",
            Some(&token),
        ),
    )
    .await;
    let res = expect_status(res, StatusCode::OK).await;
    let page: PageBody = read_json(res).await;
    let times: Vec<_> = page.items.iter().map(|c| c.created_at).collect();
    let mut sorted = times.clone();
    sorted.sort();
    assert_eq!(times, sorted);
}

#[tokio::test]
async fn status_and_site_filters_apply() {
    let app = spawn_app();
    let site_a = Uuid::now_v7();
    let site_b = Uuid::now_v7();
    seed_comment(&app, CommentStatus::Unmoderated, site_a, 10);
    seed_comment(&app, CommentStatus::Unmoderated, site_b, 20);
    seed_comment(&app, CommentStatus::Rejected, site_a, 30);
    let token = moderator_token(&app);

    let res = send(
        &app.app,
        get_request(
            &format!("/api/v1/moderate/queues/UNMODERATED?site_id={}", site_a),
            Some(&token),
        ),
    )
    .await;
    let res = expect_status(res, StatusCode::OK).await;
    let page: PageBody = read_json(res).await;
    assert_eq!(page.items.len(), 1);
    assert_eq!(page.items[0].site_id, site_a);

    let res = send(
        &app.app,
        get_request("/api/v1/moderate/queues/REJECTED", Some(&token)),
    )
    .await;
    let res = expect_status(res, StatusCode::OK).await;
    let page: PageBody = read_json(res).await;
    assert_eq!(page.items.len(), 1);
    assert_eq!(page.items[0].status, CommentStatus::Rejected);
}

#[tokio::test]
async fn invalid_cursor_is_a_bad_request() {
    let app = spawn_app();
    let token = moderator_token(&app);

    let res = send(
        &app.app,
        get_request(
            "/api/v1/moderate/queues/UNMODERATED?cursor=not-a-cursor",
            Some(&token),
        ),
    )
    .await;
    expect_status(res, StatusCode::BAD_REQUEST).await;
}

#[tokio::test]
async fn scoped_moderator_must_name_a_site_they_hold() {
    let app = spawn_app();
    let site = Uuid::now_v7();
    seed_comment(&app, CommentStatus::Unmoderated, site, 10);
    let token = scoped_token(&app, &[site]);

    // No site filter at all.
    let res = send(
        &app.app,
        get_request("/api/v1/moderate/queues/UNMODERATED", Some(&token)),
    )
    .await;
    expect_status(res, StatusCode::FORBIDDEN).await;

    // A site outside the scope.
    let res = send(
        &app.app,
        get_request(
            &format!("/api/v1/moderate/queues/UNMODERATED?site_id={}", Uuid::now_v7()),
            Some(&token),
        ),
    )
    .await;
    expect_status(res, StatusCode::FORBIDDEN).await;

    // Their own site works.
    let res = send(
        &app.app,
        get_request(
            &format!("/api/v1/moderate/queues/UNMODERATED?site_id={}", site),
            Some(&token),
        ),
    )
    .await;
    let res = expect_status(res, StatusCode::OK).await;
    let page: PageBody = read_json(res).await;
    assert_eq!(page.items.len(), 1);
}

#[tokio::test]
async fn cursor_stays_valid_while_new_comments_arrive() {
    let app = spawn_app();
    let site = Uuid::now_v7();
    for age in 1..=6 {
        seed_comment(&app, CommentStatus::Unmoderated, site, age * 10);
    }
    let token = moderator_token(&app);

    let res = send(
        &app.app,
        get_request("/api/v1/moderate/queues/UNMODERATED?limit=3", Some(&token)),
    )
    .await;
    let res = expect_status(res, StatusCode::OK).await;
    let first: PageBody = read_json(res).await;
    let first_ids: HashSet<Uuid> = first.items.iter().map(|c| c.id).collect();

    // New comments land at the head of the queue between fetches.
    seed_comment(&app, CommentStatus::Unmoderated, site, 0);
    seed_comment(&app, CommentStatus::Unmoderated, site, 0);

    let res = send(
        &app.app,
        get_request(
            &format!(
                "/api/v1/moderate/queues/UNMODERATED?limit=3&cursor={}",
                first.next_cursor.expect("first page has a cursor")
            ),
            Some(&token),
        ),
    )
    .await;
    let res = expect_status(res, StatusCode::OK).await;
    let second: PageBody = read_json(res).await;

    assert_eq!(second.items.len(), 3);
    for item in &second.items {
        assert!(
            !first_ids.contains(&item.id),
            "page 2 shifted under head inserts"
        );
    }
}
