use axum::extract::{Path, State};
use axum::Json;
use linkhub_rules::{Rule, RuleAction, RuleCondition};
use serde::Deserialize;
use serde_json::Value;
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::error::{ApiError, ApiResult};
use crate::routes::hubs::owned_hub;
use crate::routes::AppState;

/// Rule payloads arrive already shaped as the tagged condition/action
/// variants; malformed bodies are rejected at this boundary before anything
/// reaches storage.
#[derive(Debug, Deserialize)]
pub struct CreateRuleRequest {
    pub name: String,
    #[serde(default)]
    pub priority: i32,
    #[serde(default = "default_active")]
    pub is_active: bool,
    #[serde(default)]
    pub conditions: Vec<RuleCondition>,
    #[serde(default)]
    pub actions: Vec<RuleAction>,
}

fn default_active() -> bool {
    true
}

#[derive(Debug, Deserialize)]
pub struct UpdateRuleRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub priority: Option<i32>,
    #[serde(default)]
    pub is_active: Option<bool>,
    #[serde(default)]
    pub conditions: Option<Vec<RuleCondition>>,
    #[serde(default)]
    pub actions: Option<Vec<RuleAction>>,
}

/// `GET /api/hubs/:id/rules` — owner view, inactive rules included.
pub async fn list(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(hub_id): Path<Uuid>,
) -> ApiResult<Json<Vec<Rule>>> {
    let hub = owned_hub(&state, &auth, hub_id).await?;
    let rules = state.repository.list_rules(hub.id).await?;
    Ok(Json(rules))
}

/// `POST /api/hubs/:id/rules`
pub async fn create(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(hub_id): Path<Uuid>,
    Json(payload): Json<CreateRuleRequest>,
) -> ApiResult<Json<Rule>> {
    if payload.name.trim().is_empty() {
        return Err(ApiError::bad_request("rule name must not be empty"));
    }

    let hub = owned_hub(&state, &auth, hub_id).await?;
    let rule = state
        .repository
        .create_rule(
            hub.id,
            &payload.name,
            payload.priority,
            payload.is_active,
            &payload.conditions,
            &payload.actions,
        )
        .await?;
    Ok(Json(rule))
}

/// `PUT /api/rules/:id`
pub async fn update(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateRuleRequest>,
) -> ApiResult<Json<Rule>> {
    let mut rule = state
        .repository
        .get_rule(id)
        .await?
        .ok_or_else(rule_not_found)?;
    owned_hub(&state, &auth, rule.hub_id).await?;

    if let Some(name) = payload.name {
        if name.trim().is_empty() {
            return Err(ApiError::bad_request("rule name must not be empty"));
        }
        rule.name = name;
    }
    if let Some(priority) = payload.priority {
        rule.priority = priority;
    }
    if let Some(is_active) = payload.is_active {
        rule.is_active = is_active;
    }
    if let Some(conditions) = payload.conditions {
        rule.conditions = conditions;
    }
    if let Some(actions) = payload.actions {
        rule.actions = actions;
    }

    let rule = state.repository.update_rule(&rule).await?;
    Ok(Json(rule))
}

/// `DELETE /api/rules/:id`
pub async fn remove(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Value>> {
    let rule = state
        .repository
        .get_rule(id)
        .await?
        .ok_or_else(rule_not_found)?;
    owned_hub(&state, &auth, rule.hub_id).await?;

    if !state.repository.delete_rule(rule.id).await? {
        return Err(rule_not_found());
    }
    Ok(Json(serde_json::json!({ "message": "rule deleted" })))
}

fn rule_not_found() -> ApiError {
    ApiError::not_found("rule not found")
}
