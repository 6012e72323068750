use axum::extract::{Path, State};
use axum::Json;
use linkhub_protocol::hub::{is_valid_slug, Hub};
use serde::Deserialize;
use serde_json::Value;
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::error::{ApiError, ApiResult};
use crate::routes::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateHubRequest {
    pub slug: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub theme: Option<Value>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateHubRequest {
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub theme: Option<Value>,
    #[serde(default)]
    pub is_active: Option<bool>,
}

/// Loads a hub and verifies it belongs to the authenticated caller. The
/// resource's existence is already known to an authenticated caller, so a
/// foreign hub answers 403, not 404.
pub(crate) async fn owned_hub(state: &AppState, auth: &AuthUser, hub_id: Uuid) -> ApiResult<Hub> {
    let hub = state
        .repository
        .get_hub(hub_id)
        .await?
        .ok_or_else(|| ApiError::not_found("hub not found"))?;

    if hub.user_id != auth.user_id {
        return Err(ApiError::forbidden("hub belongs to another user"));
    }
    Ok(hub)
}

/// `POST /api/hubs`
pub async fn create(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<CreateHubRequest>,
) -> ApiResult<Json<Hub>> {
    if !is_valid_slug(&payload.slug) {
        return Err(invalid_slug());
    }

    let hub = state
        .repository
        .create_hub(
            auth.user_id,
            &payload.slug,
            &payload.title,
            payload.description.as_deref(),
            payload.theme.unwrap_or_else(|| Value::Object(Default::default())),
        )
        .await?;
    Ok(Json(hub))
}

/// `GET /api/hubs`
pub async fn list(State(state): State<AppState>, auth: AuthUser) -> ApiResult<Json<Vec<Hub>>> {
    let hubs = state.repository.list_hubs_for_user(auth.user_id).await?;
    Ok(Json(hubs))
}

/// `GET /api/hubs/:id`
pub async fn get(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Hub>> {
    let hub = owned_hub(&state, &auth, id).await?;
    Ok(Json(hub))
}

/// `PUT /api/hubs/:id`
pub async fn update(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateHubRequest>,
) -> ApiResult<Json<Hub>> {
    let mut hub = owned_hub(&state, &auth, id).await?;

    if let Some(slug) = payload.slug {
        if !is_valid_slug(&slug) {
            return Err(invalid_slug());
        }
        hub.slug = slug;
    }
    if let Some(title) = payload.title {
        hub.title = title;
    }
    if let Some(description) = payload.description {
        hub.description = Some(description);
    }
    if let Some(theme) = payload.theme {
        hub.theme = theme;
    }
    if let Some(is_active) = payload.is_active {
        hub.is_active = is_active;
    }

    let hub = state.repository.update_hub(&hub).await?;
    Ok(Json(hub))
}

/// `DELETE /api/hubs/:id` — links and rules cascade.
pub async fn remove(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Value>> {
    let hub = owned_hub(&state, &auth, id).await?;
    state.repository.delete_hub(hub.id).await?;
    Ok(Json(serde_json::json!({ "message": "hub deleted" })))
}

fn invalid_slug() -> ApiError {
    ApiError::bad_request(
        "slug must be at least 3 characters of lowercase letters, digits or hyphens",
    )
}
