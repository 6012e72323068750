use std::collections::HashSet;

use linkhub_protocol::link::Link;
use linkhub_protocol::visitor::VisitorContext;
use uuid::Uuid;

use crate::engine::RuleEngine;
use crate::outcome::Resolution;

/// Final shape of a resolved public page: either a redirect target or the
/// ordered links to render.
#[derive(Debug, Clone, PartialEq)]
pub enum HubView {
    Redirect { url: String },
    Links { links: Vec<Link> },
}

impl HubView {
    /// Runs the engine and materializes the ordered link list. Rules decide
    /// membership only; order is always the stored `position`, ascending,
    /// with ties keeping the fetched order.
    pub fn resolve(engine: &RuleEngine, links: &[Link], ctx: &VisitorContext) -> HubView {
        match engine.resolve(links, ctx) {
            Resolution::Redirect { url } => HubView::Redirect { url },
            Resolution::Visible { link_ids } => HubView::Links {
                links: visible_links(links, &link_ids),
            },
        }
    }
}

/// Filters the hub's link list down to the visibility set, position
/// ascending. Soft-deleted links never appear, whatever the set contains.
pub fn visible_links(links: &[Link], visible: &HashSet<Uuid>) -> Vec<Link> {
    let mut resolved: Vec<Link> = links
        .iter()
        .filter(|link| !link.is_deleted() && visible.contains(&link.id))
        .cloned()
        .collect();
    resolved.sort_by_key(|link| link.position);
    resolved
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Utc};

    fn link(position: i32) -> Link {
        Link {
            id: Uuid::new_v4(),
            hub_id: Uuid::new_v4(),
            title: format!("link-{position}"),
            url: "https://example.com".into(),
            icon: None,
            style: None,
            is_active: true,
            position,
            click_count: 0,
            deleted_at: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn orders_by_position_ascending() {
        let c = link(9);
        let a = link(0);
        let b = link(3);
        let visible = HashSet::from([a.id, b.id, c.id]);

        let resolved = visible_links(&[c.clone(), a.clone(), b.clone()], &visible);
        let ids: Vec<Uuid> = resolved.iter().map(|l| l.id).collect();
        assert_eq!(ids, vec![a.id, b.id, c.id]);
    }

    #[test]
    fn position_ties_keep_fetch_order() {
        let first = link(1);
        let second = link(1);
        let visible = HashSet::from([first.id, second.id]);

        let resolved = visible_links(&[first.clone(), second.clone()], &visible);
        let ids: Vec<Uuid> = resolved.iter().map(|l| l.id).collect();
        assert_eq!(ids, vec![first.id, second.id]);
    }

    #[test]
    fn membership_filters_and_deleted_links_stay_out() {
        let shown = link(0);
        let mut deleted = link(1);
        deleted.deleted_at = Some(Utc::now());
        let excluded = link(2);
        // Even a set that names the deleted link cannot resurrect it.
        let visible = HashSet::from([shown.id, deleted.id]);

        let resolved = visible_links(&[shown.clone(), deleted, excluded], &visible);
        let ids: Vec<Uuid> = resolved.iter().map(|l| l.id).collect();
        assert_eq!(ids, vec![shown.id]);
    }

    #[test]
    fn hub_view_resolves_through_the_engine() {
        let ctx = VisitorContext::new(
            NaiveDate::from_ymd_opt(2024, 6, 3)
                .unwrap()
                .and_hms_opt(12, 0, 0)
                .unwrap(),
            "203.0.113.4",
            "Mozilla/5.0 (X11; Linux)",
            None,
        );
        let a = link(0);
        let view = HubView::resolve(&RuleEngine::new(vec![]), &[a.clone()], &ctx);
        assert_eq!(view, HubView::Links { links: vec![a] });
    }
}
