use std::sync::Arc;

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, header},
};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{EncodingKey, Header, encode};
use serde::de::DeserializeOwned;
use tower::ServiceExt;
use uuid::Uuid;

use modstream::{
    application::{moderation::service::ModerationService, queues::paginator::Paginator},
    config::Config,
    domain::comment::entity::{Comment, CommentStatus},
    infrastructure::{
        broker::EventBroker, repositories::memory_comment_store::MemoryCommentStore,
    },
    presentation::http::{
        middleware::moderator::ModeratorClaims, routes::create_router, state::AppState,
    },
};

pub struct TestApp {
    pub app: Router,
    pub store: Arc<MemoryCommentStore>,
    pub broker: EventBroker,
    pub moderation: Arc<ModerationService>,
    pub paginator: Arc<Paginator>,
    pub moderator_email: String,
    pub moderator_password: String,
    pub jwt_secret: String,
}

fn build_config(moderator_password_hash: String) -> Config {
    Config {
        database_url: "postgres://unused".to_string(),
        database_max_connections: 5,
        host: "127.0.0.1".to_string(),
        port: 0,
        jwt_secret: "test-jwt-secret".to_string(),
        moderator_email: "moderator@example.com".to_string(),
        moderator_password_hash,
        subscriber_queue_capacity: 64,
        default_page_size: 20,
        max_page_size: 100,
        janitor_interval_seconds: 60,
        ignore_missing_migrations: true,
        allowed_origins: vec![],
    }
}

/// Build an app over the in-memory store; no database or network.
pub fn spawn_app() -> TestApp {
    let moderator_password = "ModeratorPassword123!".to_string();
    let moderator_password_hash =
        bcrypt::hash(&moderator_password, 4).expect("failed to hash moderator password");
    let config = build_config(moderator_password_hash);

    let store = Arc::new(MemoryCommentStore::new());
    let broker = EventBroker::new(config.subscriber_queue_capacity);
    let moderation = Arc::new(ModerationService::new(store.clone(), broker.clone()));
    let paginator = Arc::new(Paginator::new(
        store.clone(),
        config.default_page_size,
        config.max_page_size,
    ));

    let state = AppState {
        store: store.clone(),
        broker: broker.clone(),
        moderation: moderation.clone(),
        paginator: paginator.clone(),
        config: config.clone(),
    };

    TestApp {
        app: create_router(state),
        store,
        broker,
        moderation,
        paginator,
        moderator_email: config.moderator_email,
        moderator_password,
        jwt_secret: config.jwt_secret,
    }
}

fn issue_token(app: &TestApp, scoped: bool, site_ids: Vec<Uuid>) -> String {
    let exp = (Utc::now() + Duration::hours(1)).timestamp() as usize;
    let claims = ModeratorClaims {
        sub: app.moderator_email.clone(),
        scoped,
        site_ids,
        exp,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(app.jwt_secret.as_bytes()),
    )
    .expect("failed to sign token")
}

pub fn moderator_token(app: &TestApp) -> String {
    issue_token(app, false, vec![])
}

pub fn scoped_token(app: &TestApp, site_ids: &[Uuid]) -> String {
    issue_token(app, true, site_ids.to_vec())
}

pub async fn send(app: &Router, req: Request<Body>) -> axum::response::Response {
    app.clone().oneshot(req).await.expect("request failed")
}

pub async fn read_json<T: DeserializeOwned>(res: axum::response::Response) -> T {
    let bytes = to_bytes(res.into_body(), usize::MAX)
        .await
        .expect("failed to read body");
    serde_json::from_slice(&bytes).expect("failed to parse json")
}

pub async fn read_text(res: axum::response::Response) -> String {
    let bytes = to_bytes(res.into_body(), usize::MAX)
        .await
        .expect("failed to read body");
    String::from_utf8(bytes.to_vec()).expect("invalid utf8")
}

pub async fn expect_status(
    res: axum::response::Response,
    expected: http::StatusCode,
) -> axum::response::Response {
    let actual = res.status();

    if actual == expected {
        return res;
    }

    let body = read_text(res).await;
    panic!(
        "HTTP status mismatch. Expected {}, got {}. Response body: {}",
        expected, actual, body
    );
}

pub fn json_request(
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: serde_json::Value,
) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder
        .body(Body::from(body.to_string()))
        .expect("failed to build request")
}

pub fn get_request(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(Body::empty()).expect("failed to build request")
}

fn micros_now() -> DateTime<Utc> {
    DateTime::from_timestamp_micros(Utc::now().timestamp_micros()).expect("timestamp in range")
}

/// Seed a comment directly into the store, bypassing the filter.
pub fn seed_comment(app: &TestApp, status: CommentStatus, site_id: Uuid, age_secs: i64) -> Comment {
    let created = micros_now() - Duration::seconds(age_secs);
    let comment = Comment {
        id: Uuid::now_v7(),
        story_id: Uuid::now_v7(),
        site_id,
        section: None,
        author_id: Uuid::now_v7(),
        body: "seeded comment".to_string(),
        status,
        tags: vec![],
        media: None,
        rating: None,
        revision: 0,
        deleted: false,
        created_at: created,
        updated_at: created,
    };
    app.store.put(comment.clone());
    comment
}
