use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// One outbound URL entry within a hub.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Link {
    pub id: Uuid,
    pub hub_id: Uuid,
    pub title: String,
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    /// Opaque per-link styling blob, never interpreted by the engine.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub style: Option<Value>,
    /// Static default visibility. Rules may override it per request.
    pub is_active: bool,
    /// Display order, ascending. Ties keep insertion order.
    pub position: i32,
    pub click_count: i64,
    /// Soft-delete marker. Deleted links never appear in any view, but
    /// click/visit history referencing them remains.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Link {
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }
}
