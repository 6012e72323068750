use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::action::RuleAction;
use crate::condition::RuleCondition;
use crate::error::RuleError;

/// A prioritized conditional policy attached to a hub. All conditions must
/// pass (AND) for the actions to apply, in list order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Rule {
    pub id: Uuid,
    pub hub_id: Uuid,
    pub name: String,
    /// Higher priorities are evaluated first. Equal priorities keep
    /// creation order (`created_at`, then id).
    #[serde(default)]
    pub priority: i32,
    /// Inactive rules are skipped entirely.
    #[serde(default = "Rule::default_active")]
    pub is_active: bool,
    #[serde(default)]
    pub conditions: Vec<RuleCondition>,
    #[serde(default)]
    pub actions: Vec<RuleAction>,
    pub created_at: DateTime<Utc>,
}

impl Rule {
    pub fn default_active() -> bool {
        true
    }

    /// Lifts a stored rule row into typed form, validating the condition and
    /// action payloads. This is the boundary where MalformedRuleData is
    /// detected; callers skip (and log) rules that fail here.
    #[allow(clippy::too_many_arguments)]
    pub fn from_stored(
        id: Uuid,
        hub_id: Uuid,
        name: String,
        priority: i32,
        is_active: bool,
        conditions: Value,
        actions: Value,
        created_at: DateTime<Utc>,
    ) -> Result<Self, RuleError> {
        let conditions: Vec<RuleCondition> = serde_json::from_value(conditions)
            .map_err(|source| RuleError::MalformedConditions {
                rule_id: id,
                source,
            })?;
        let actions: Vec<RuleAction> = serde_json::from_value(actions)
            .map_err(|source| RuleError::MalformedActions {
                rule_id: id,
                source,
            })?;

        Ok(Self {
            id,
            hub_id,
            name,
            priority,
            is_active,
            conditions,
            actions,
            created_at,
        })
    }
}
