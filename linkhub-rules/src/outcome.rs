use std::collections::HashSet;

use uuid::Uuid;

/// Result of one engine pass over a hub's active rules.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    /// A matched REDIRECT action short-circuited the evaluation; the caller
    /// must answer with the redirect target and no link list.
    Redirect { url: String },
    /// The final visibility set after every matching rule's actions were
    /// applied. Membership only; display order comes from link positions.
    Visible { link_ids: HashSet<Uuid> },
}

impl Resolution {
    pub fn is_redirect(&self) -> bool {
        matches!(self, Resolution::Redirect { .. })
    }
}
