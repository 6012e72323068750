use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Effect applied against the visibility set when a rule's conditions all
/// pass. Wire shape matches the stored payloads (`type` tag, camelCase
/// fields); an unrecognized action type fails deserialization, which marks
/// the owning rule malformed and inert.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(
    tag = "type",
    rename_all = "SCREAMING_SNAKE_CASE",
    rename_all_fields = "camelCase"
)]
pub enum RuleAction {
    /// Adds the link to the visibility set. No-op when the id does not
    /// belong to the hub.
    ShowLink { link_id: Uuid },
    /// Removes the link from the visibility set, whether or not present.
    HideLink { link_id: Uuid },
    /// Short-circuits the whole evaluation: the visitor is redirected and
    /// no further rules or links are considered.
    Redirect { url: String },
}
