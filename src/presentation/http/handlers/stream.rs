//! Live moderation event feed over WebSocket.
//!
//! Each connection gets its own broker subscription filtered to the
//! caller's moderation scope. When the subscriber falls behind and
//! events are dropped, a resync control frame is sent instead; the
//! client refetches its open queues from the page API.

use axum::{
    extract::{
        Query, State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    http::StatusCode,
    response::IntoResponse,
};
use futures_util::{SinkExt, StreamExt};
use serde::Deserialize;
use serde_json::json;

use crate::domain::events::EventKind;
use crate::domain::scope::ModerationScope;
use crate::infrastructure::broker::SubscriptionMessage;
use crate::presentation::http::{middleware::moderator::decode_moderator_claims, state::AppState};

#[derive(Debug, Deserialize)]
pub struct StreamQuery {
    /// Browsers cannot set headers on WebSocket upgrades, so the
    /// moderator token rides in the query string.
    pub token: String,
}

pub async fn stream_handler(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
    Query(query): Query<StreamQuery>,
) -> Result<impl IntoResponse, StatusCode> {
    let claims = decode_moderator_claims(&query.token, &state.config.jwt_secret)
        .map_err(|_| StatusCode::UNAUTHORIZED)?;
    let scope = claims.scope();
    Ok(ws.on_upgrade(move |socket| stream_events(socket, state, scope)))
}

async fn stream_events(socket: WebSocket, state: AppState, scope: ModerationScope) {
    let (mut sender, _) = socket.split();
    let mut subscription = state.broker.subscribe(EventKind::ALL, scope);

    while let Some(message) = subscription.next().await {
        let text = match message {
            SubscriptionMessage::Event(event) => serde_json::to_string(&event),
            SubscriptionMessage::Degraded { missed } => {
                serde_json::to_string(&json!({ "control": "RESYNC", "missed": missed }))
            }
        };
        let Ok(text) = text else {
            continue;
        };
        if sender.send(Message::Text(text.into())).await.is_err() {
            break;
        }
    }
}
