use axum::{
    extract::State,
    http::{StatusCode, header},
    middleware::Next,
    response::Response,
};
use jsonwebtoken::{DecodingKey, Validation, decode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::application::moderation::service::ModeratorContext;
use crate::domain::scope::ModerationScope;
use crate::presentation::http::state::AppState;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModeratorClaims {
    pub sub: String,
    /// When set, `site_ids` limits what the bearer may moderate.
    /// Unscoped tokens moderate everything.
    #[serde(default)]
    pub scoped: bool,
    #[serde(default)]
    pub site_ids: Vec<Uuid>,
    pub exp: usize,
}

impl ModeratorClaims {
    pub fn scope(&self) -> ModerationScope {
        if self.scoped {
            ModerationScope::sites(self.site_ids.iter().copied())
        } else {
            ModerationScope::Unscoped
        }
    }

    pub fn context(&self) -> ModeratorContext {
        ModeratorContext {
            id: self.sub.clone(),
            scope: self.scope(),
        }
    }
}

pub fn decode_moderator_claims(
    token: &str,
    jwt_secret: &str,
) -> Result<ModeratorClaims, jsonwebtoken::errors::Error> {
    Ok(decode::<ModeratorClaims>(
        token,
        &DecodingKey::from_secret(jwt_secret.as_bytes()),
        &Validation::default(),
    )?
    .claims)
}

pub async fn require_moderator(
    State(state): State<AppState>,
    mut req: axum::extract::Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let auth_header = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or(StatusCode::UNAUTHORIZED)?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or(StatusCode::UNAUTHORIZED)?;

    let claims = decode_moderator_claims(token, &state.config.jwt_secret)
        .map_err(|_| StatusCode::UNAUTHORIZED)?;

    req.extensions_mut().insert(claims.context());

    Ok(next.run(req).await)
}
