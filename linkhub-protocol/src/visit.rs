use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::visitor::{DeviceClass, VisitorContext};

/// Append-only record of one public hub view. Never updated after insert;
/// consumed only by analytics aggregation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Visit {
    pub id: Uuid,
    pub hub_id: Uuid,
    pub ip_address: String,
    pub user_agent: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    pub device_type: DeviceClass,
    pub visited_at: DateTime<Utc>,
}

impl Visit {
    /// Captures a visit from the request context. Values are copied so the
    /// recording task owns its data independently of the response path.
    pub fn capture(hub_id: Uuid, ctx: &VisitorContext) -> Self {
        Self {
            id: Uuid::new_v4(),
            hub_id,
            ip_address: ctx.ip.clone(),
            user_agent: ctx.user_agent.clone(),
            country: ctx.country.clone(),
            device_type: ctx.device,
            visited_at: Utc::now(),
        }
    }
}

/// Append-only record of one outbound link click, paired with an atomic
/// increment of the link's click counter at the storage layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Click {
    pub id: Uuid,
    pub link_id: Uuid,
    pub clicked_at: DateTime<Utc>,
}
