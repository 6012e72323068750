use std::net::SocketAddr;

use axum::extract::{ConnectInfo, Path, State};
use axum::http::HeaderMap;
use axum::Json;
use linkhub_protocol::hub::Hub;
use linkhub_protocol::link::Link;
use linkhub_protocol::visit::Visit;
use linkhub_protocol::visitor::VisitorContext;
use linkhub_rules::{HubView, RuleEngine};
use serde::Serialize;
use serde_json::Value;
use tracing::warn;
use uuid::Uuid;

use crate::context::build_context;
use crate::error::{ApiError, ApiResult};
use crate::routes::AppState;

/// Response body for a resolved public page: either the hub with its
/// visible links, or a redirect target. The rules payload itself is never
/// part of this shape.
#[derive(Debug, Serialize, PartialEq)]
#[serde(untagged)]
pub enum PublicHubResponse {
    Redirect { redirect: String },
    Hub { hub: PublicHub },
}

#[derive(Debug, Serialize, PartialEq)]
pub struct PublicHub {
    pub id: Uuid,
    pub slug: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub theme: Value,
    pub links: Vec<PublicLink>,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct PublicLink {
    pub id: Uuid,
    pub title: String,
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub style: Option<Value>,
}

impl From<Link> for PublicLink {
    fn from(link: Link) -> Self {
        Self {
            id: link.id,
            title: link.title,
            url: link.url,
            icon: link.icon,
            style: link.style,
        }
    }
}

/// `GET /public/:username/:slug` — resolves and serves a public hub.
///
/// An unknown slug, an inactive hub and an owner/username mismatch are
/// indistinguishable to the caller. The visit record is fired without being
/// awaited; its failure never affects the response.
pub async fn view_hub(
    State(state): State<AppState>,
    Path((username, slug)): Path<(String, String)>,
    ConnectInfo(remote_addr): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
) -> ApiResult<Json<PublicHubResponse>> {
    let data = state
        .repository
        .find_public_hub(&slug)
        .await?
        .ok_or_else(hub_not_found)?;

    if !data.hub.is_active || data.owner_username != username {
        return Err(hub_not_found());
    }

    let ctx = build_context(&headers, remote_addr, &state.geo, state.trust_forwarded);

    let visit = Visit::capture(data.hub.id, &ctx);
    let repository = state.repository.clone();
    tokio::spawn(async move {
        if let Err(err) = repository.record_visit(&visit).await {
            warn!(%err, hub_id = %visit.hub_id, "failed to record visit");
        }
    });

    let engine = RuleEngine::new(data.rules);
    Ok(Json(assemble(&data.hub, &data.links, &engine, &ctx)))
}

/// Shapes the final response from already-fetched data. Pure composition:
/// everything the engine needs is in its arguments.
pub fn assemble(
    hub: &Hub,
    links: &[Link],
    engine: &RuleEngine,
    ctx: &VisitorContext,
) -> PublicHubResponse {
    match HubView::resolve(engine, links, ctx) {
        HubView::Redirect { url } => PublicHubResponse::Redirect { redirect: url },
        HubView::Links { links } => PublicHubResponse::Hub {
            hub: PublicHub {
                id: hub.id,
                slug: hub.slug.clone(),
                title: hub.title.clone(),
                description: hub.description.clone(),
                theme: hub.theme.clone(),
                links: links.into_iter().map(Into::into).collect(),
            },
        },
    }
}

/// `POST /public/links/:id/click` — appends a click and bumps the counter.
pub async fn click(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Value>> {
    if state.repository.record_click(id).await? {
        Ok(Json(serde_json::json!({ "message": "click recorded" })))
    } else {
        Err(ApiError::not_found("link not found"))
    }
}

fn hub_not_found() -> ApiError {
    ApiError::not_found("hub not found")
}
