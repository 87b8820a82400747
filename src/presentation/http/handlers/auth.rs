use axum::{Json, extract::State};
use bcrypt::verify;
use jsonwebtoken::{EncodingKey, Header, encode};
use serde::{Deserialize, Serialize};

use crate::presentation::http::{
    errors::AppError, middleware::moderator::ModeratorClaims, state::AppState,
};

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
}

/// Credential login for the bootstrap moderator configured via the
/// environment. Issues an unscoped token; scoped tokens come from the
/// organization's identity provider.
pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    let email = body.email.trim().to_lowercase();
    if email != state.config.moderator_email.to_lowercase() {
        return Err(AppError::Forbidden("Invalid credentials".to_string()));
    }

    let valid = verify(&body.password, &state.config.moderator_password_hash)
        .map_err(|_| AppError::Internal("Password verification failed".to_string()))?;
    if !valid {
        return Err(AppError::Forbidden("Invalid credentials".to_string()));
    }

    let exp = (chrono::Utc::now() + chrono::Duration::hours(12)).timestamp() as usize;
    let claims = ModeratorClaims {
        sub: email,
        scoped: false,
        site_ids: vec![],
        exp,
    };
    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(state.config.jwt_secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(format!("Token generation failed: {}", e)))?;

    Ok(Json(LoginResponse { token }))
}
