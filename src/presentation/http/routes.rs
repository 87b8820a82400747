use super::{
    handlers::{actions, auth, comments, health, queues, stream},
    middleware::moderator::require_moderator,
    middleware::request_id::request_id_middleware,
    state::AppState,
};
use axum::{
    Router, middleware,
    routing::{get, post},
};

pub fn create_router(state: AppState) -> Router {
    let moderator_routes = Router::new()
        .route("/api/v1/moderate/queues/{status}", get(queues::get_queue))
        .route(
            "/api/v1/moderate/comments/{id}/approve",
            post(actions::approve_comment),
        )
        .route(
            "/api/v1/moderate/comments/{id}/reject",
            post(actions::reject_comment),
        )
        .route(
            "/api/v1/moderate/comments/{id}/feature",
            post(actions::feature_comment),
        )
        .route(
            "/api/v1/moderate/comments/{id}/unfeature",
            post(actions::unfeature_comment),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_moderator,
        ));

    Router::new()
        // Health
        .route("/health", get(health::health_check))
        // Comment submission
        .route("/api/v1/comments", post(comments::create_comment))
        // WebSocket live moderation feed (token in query string)
        .route("/ws/moderation", get(stream::stream_handler))
        // Moderator login (unprotected)
        .route("/api/v1/moderate/login", post(auth::login))
        // Moderation (protected by JWT middleware)
        .merge(moderator_routes)
        .layer(middleware::from_fn(request_id_middleware))
        .with_state(state)
}
