use axum::extract::State;
use axum::Json;
use linkhub_protocol::hub::is_valid_slug;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::auth::{hash_password, verify_password};
use crate::error::{ApiError, ApiResult};
use crate::routes::AppState;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    #[serde(default)]
    pub email: Option<String>,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: UserSummary,
}

#[derive(Debug, Serialize)]
pub struct UserSummary {
    pub id: Uuid,
    pub username: String,
}

/// `POST /api/auth/register`
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> ApiResult<Json<AuthResponse>> {
    // Usernames share the slug charset: they form the public URL path.
    if !is_valid_slug(&payload.username) {
        return Err(ApiError::bad_request(
            "username must be at least 3 characters of lowercase letters, digits or hyphens",
        ));
    }
    if payload.password.len() < 8 {
        return Err(ApiError::bad_request(
            "password must be at least 8 characters",
        ));
    }

    let password_hash = hash_password(&payload.password)?;
    let user = state
        .repository
        .create_user(&payload.username, payload.email.as_deref(), &password_hash)
        .await?;
    info!(username = %user.username, "user registered");

    let token = state.auth.issue(user.id, &user.username)?;
    Ok(Json(AuthResponse {
        token,
        user: UserSummary {
            id: user.id,
            username: user.username,
        },
    }))
}

/// `POST /api/auth/login`
///
/// An unknown username and a wrong password answer identically.
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> ApiResult<Json<AuthResponse>> {
    let invalid = || ApiError::unauthorized("invalid credentials");

    let user = state
        .repository
        .find_user_by_username(&payload.username)
        .await?
        .ok_or_else(invalid)?;

    if !verify_password(&payload.password, &user.password_hash) {
        return Err(invalid());
    }

    let token = state.auth.issue(user.id, &user.username)?;
    Ok(Json(AuthResponse {
        token,
        user: UserSummary {
            id: user.id,
            username: user.username,
        },
    }))
}
