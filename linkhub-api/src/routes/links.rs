use axum::extract::{Path, State};
use axum::Json;
use linkhub_protocol::link::Link;
use serde::Deserialize;
use serde_json::Value;
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::error::{ApiError, ApiResult};
use crate::routes::hubs::owned_hub;
use crate::routes::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateLinkRequest {
    pub title: String,
    pub url: String,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default)]
    pub style: Option<Value>,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

#[derive(Debug, Deserialize)]
pub struct UpdateLinkRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default)]
    pub style: Option<Value>,
    #[serde(default)]
    pub is_active: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct ReorderEntry {
    pub id: Uuid,
    pub position: i32,
}

/// `GET /api/hubs/:id/links`
pub async fn list(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(hub_id): Path<Uuid>,
) -> ApiResult<Json<Vec<Link>>> {
    let hub = owned_hub(&state, &auth, hub_id).await?;
    let links = state.repository.list_links(hub.id).await?;
    Ok(Json(links))
}

/// `POST /api/hubs/:id/links` — appends at the end of the hub.
pub async fn create(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(hub_id): Path<Uuid>,
    Json(payload): Json<CreateLinkRequest>,
) -> ApiResult<Json<Link>> {
    let hub = owned_hub(&state, &auth, hub_id).await?;
    let link = state
        .repository
        .create_link(
            hub.id,
            &payload.title,
            &payload.url,
            payload.icon.as_deref(),
            payload.style,
            payload.is_active,
        )
        .await?;
    Ok(Json(link))
}

/// `PUT /api/links/:id`
pub async fn update(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateLinkRequest>,
) -> ApiResult<Json<Link>> {
    let mut link = state
        .repository
        .get_link(id)
        .await?
        .ok_or_else(link_not_found)?;
    owned_hub(&state, &auth, link.hub_id).await?;

    if let Some(title) = payload.title {
        link.title = title;
    }
    if let Some(url) = payload.url {
        link.url = url;
    }
    if let Some(icon) = payload.icon {
        link.icon = Some(icon);
    }
    if let Some(style) = payload.style {
        link.style = Some(style);
    }
    if let Some(is_active) = payload.is_active {
        link.is_active = is_active;
    }

    let link = state.repository.update_link(&link).await?;
    Ok(Json(link))
}

/// `DELETE /api/links/:id` — soft delete; history stays.
pub async fn remove(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Value>> {
    let link = state
        .repository
        .get_link(id)
        .await?
        .ok_or_else(link_not_found)?;
    owned_hub(&state, &auth, link.hub_id).await?;

    if !state.repository.soft_delete_link(link.id).await? {
        return Err(link_not_found());
    }
    Ok(Json(serde_json::json!({ "message": "link deleted" })))
}

/// `PUT /api/hubs/:id/links/reorder` — batch position overwrite. The whole
/// batch must reference links of the caller's hub; it is rejected whole
/// otherwise.
pub async fn reorder(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(hub_id): Path<Uuid>,
    Json(payload): Json<Vec<ReorderEntry>>,
) -> ApiResult<Json<Value>> {
    let hub = owned_hub(&state, &auth, hub_id).await?;
    let pairs: Vec<(Uuid, i32)> = payload
        .iter()
        .map(|entry| (entry.id, entry.position))
        .collect();
    state.repository.reorder_links(hub.id, &pairs).await?;
    Ok(Json(serde_json::json!({ "message": "links reordered" })))
}

fn link_not_found() -> ApiError {
    ApiError::not_found("link not found")
}
