use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// A user's public link-in-bio page.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Hub {
    pub id: Uuid,
    pub user_id: Uuid,
    /// Public URL component. Lowercase alphanumeric plus hyphens, length >= 3.
    pub slug: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Opaque theme blob. Stored and echoed back, never interpreted.
    #[serde(default)]
    pub theme: Value,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Validates a hub slug: lowercase ASCII alphanumeric and hyphens, minimum
/// length 3.
pub fn is_valid_slug(slug: &str) -> bool {
    slug.len() >= 3
        && slug
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_well_formed_slugs() {
        assert!(is_valid_slug("abc"));
        assert!(is_valid_slug("my-page-42"));
        assert!(is_valid_slug("123"));
    }

    #[test]
    fn rejects_short_or_invalid_slugs() {
        assert!(!is_valid_slug("ab"));
        assert!(!is_valid_slug(""));
        assert!(!is_valid_slug("My-Page"));
        assert!(!is_valid_slug("under_score"));
        assert!(!is_valid_slug("com espaço"));
    }
}
