use std::sync::Arc;

use axum::routing::{get, post, put};
use axum::Router;

use crate::auth::AuthKeys;
use crate::geoip::GeoResolver;
use crate::repository::HubRepository;

pub mod accounts;
pub mod hubs;
pub mod links;
pub mod public;
pub mod rules;

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub repository: HubRepository,
    pub auth: AuthKeys,
    pub geo: Arc<GeoResolver>,
    pub trust_forwarded: bool,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/auth/register", post(accounts::register))
        .route("/api/auth/login", post(accounts::login))
        .route("/api/hubs", get(hubs::list).post(hubs::create))
        .route(
            "/api/hubs/:id",
            get(hubs::get).put(hubs::update).delete(hubs::remove),
        )
        .route("/api/hubs/:id/links", get(links::list).post(links::create))
        .route("/api/hubs/:id/links/reorder", put(links::reorder))
        .route("/api/links/:id", put(links::update).delete(links::remove))
        .route("/api/hubs/:id/rules", get(rules::list).post(rules::create))
        .route("/api/rules/:id", put(rules::update).delete(rules::remove))
        .route("/public/:username/:slug", get(public::view_hub))
        .route("/public/links/:id/click", post(public::click))
        .with_state(state)
}

async fn health() -> &'static str {
    "ok"
}
