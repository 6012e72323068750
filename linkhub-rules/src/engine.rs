use std::collections::HashSet;

use linkhub_protocol::link::Link;
use linkhub_protocol::visitor::VisitorContext;
use uuid::Uuid;

use crate::action::RuleAction;
use crate::observer::{EvaluationObserver, TracingObserver};
use crate::outcome::Resolution;
use crate::rule::Rule;

/// Runtime executor that resolves the per-request visibility of a hub's
/// links. Evaluation is pure computation over already-fetched data: no I/O,
/// no suspension, deterministic for a fixed (rules, links, context) triple.
#[derive(Debug, Default, Clone)]
pub struct RuleEngine {
    rules: Vec<Rule>,
}

impl RuleEngine {
    /// Constructs an engine from the provided rules, sorting them by
    /// priority descending. Equal priorities keep creation order
    /// (`created_at` ascending, then id) so evaluation order is total and
    /// deterministic.
    pub fn new(mut rules: Vec<Rule>) -> Self {
        rules.sort_by(|a, b| {
            b.priority
                .cmp(&a.priority)
                .then_with(|| a.created_at.cmp(&b.created_at))
                .then_with(|| a.id.cmp(&b.id))
        });
        Self { rules }
    }

    /// Borrow the underlying rule set in evaluation order.
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Resolves the visibility set for the given links and context, logging
    /// each step at debug level.
    pub fn resolve(&self, links: &[Link], ctx: &VisitorContext) -> Resolution {
        self.resolve_with_observer(links, ctx, &mut TracingObserver)
    }

    /// Resolves with a caller-supplied observer receiving every condition
    /// and action step.
    ///
    /// The visibility set is seeded from each non-deleted link's static
    /// `is_active` flag. Rules run in priority order; a rule applies its
    /// actions only when all of its conditions pass, and a REDIRECT action
    /// stops the whole evaluation immediately.
    pub fn resolve_with_observer(
        &self,
        links: &[Link],
        ctx: &VisitorContext,
        observer: &mut dyn EvaluationObserver,
    ) -> Resolution {
        let known: HashSet<Uuid> = links
            .iter()
            .filter(|link| !link.is_deleted())
            .map(|link| link.id)
            .collect();
        let mut visible: HashSet<Uuid> = links
            .iter()
            .filter(|link| !link.is_deleted() && link.is_active)
            .map(|link| link.id)
            .collect();

        for rule in &self.rules {
            if !rule.is_active {
                continue;
            }

            let mut matched = true;
            for condition in &rule.conditions {
                let passed = condition.evaluate(ctx);
                observer.condition_evaluated(rule, condition, passed);
                if !passed {
                    matched = false;
                    break;
                }
            }

            if !matched {
                observer.rule_skipped(rule);
                continue;
            }
            observer.rule_matched(rule);

            for action in &rule.actions {
                observer.action_applied(rule, action);
                match action {
                    RuleAction::ShowLink { link_id } => {
                        if known.contains(link_id) {
                            visible.insert(*link_id);
                        }
                    }
                    RuleAction::HideLink { link_id } => {
                        visible.remove(link_id);
                    }
                    RuleAction::Redirect { url } => {
                        return Resolution::Redirect { url: url.clone() };
                    }
                }
            }
        }

        Resolution::Visible { link_ids: visible }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::condition::RuleCondition;
    use crate::observer::{RecordingObserver, TraceEvent};
    use chrono::{NaiveDate, TimeZone, Utc};
    use linkhub_protocol::visitor::DeviceClass;

    fn link(id: Uuid, hub_id: Uuid, position: i32, is_active: bool) -> Link {
        Link {
            id,
            hub_id,
            title: format!("link-{position}"),
            url: "https://example.com".into(),
            icon: None,
            style: None,
            is_active,
            position,
            click_count: 0,
            deleted_at: None,
            created_at: Utc::now(),
        }
    }

    fn rule(hub_id: Uuid, priority: i32, actions: Vec<RuleAction>) -> Rule {
        rule_with_conditions(hub_id, priority, vec![], actions)
    }

    fn rule_with_conditions(
        hub_id: Uuid,
        priority: i32,
        conditions: Vec<RuleCondition>,
        actions: Vec<RuleAction>,
    ) -> Rule {
        Rule {
            id: Uuid::new_v4(),
            hub_id,
            name: format!("rule-p{priority}"),
            priority,
            is_active: true,
            conditions,
            actions,
            created_at: Utc::now(),
        }
    }

    fn desktop_ctx() -> VisitorContext {
        let now = NaiveDate::from_ymd_opt(2024, 6, 3)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap();
        VisitorContext::new(now, "203.0.113.4", "Mozilla/5.0 (X11; Linux)", None)
    }

    fn mobile_ctx() -> VisitorContext {
        let now = NaiveDate::from_ymd_opt(2024, 6, 3)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap();
        VisitorContext::new(now, "203.0.113.4", "Mozilla/5.0 (iPhone)", None)
    }

    fn visible_ids(resolution: Resolution) -> HashSet<Uuid> {
        match resolution {
            Resolution::Visible { link_ids } => link_ids,
            Resolution::Redirect { url } => panic!("unexpected redirect to {url}"),
        }
    }

    #[test]
    fn default_visibility_without_rules() {
        let hub_id = Uuid::new_v4();
        let shown = link(Uuid::new_v4(), hub_id, 0, true);
        let hidden = link(Uuid::new_v4(), hub_id, 1, false);
        let engine = RuleEngine::new(vec![]);

        let ids = visible_ids(engine.resolve(&[shown.clone(), hidden], &desktop_ctx()));
        assert_eq!(ids, HashSet::from([shown.id]));
    }

    #[test]
    fn resolution_is_deterministic() {
        let hub_id = Uuid::new_v4();
        let links = vec![
            link(Uuid::new_v4(), hub_id, 0, true),
            link(Uuid::new_v4(), hub_id, 1, false),
        ];
        let rules = vec![
            rule(hub_id, 3, vec![RuleAction::ShowLink { link_id: links[1].id }]),
            rule(hub_id, 7, vec![RuleAction::HideLink { link_id: links[0].id }]),
        ];
        let engine = RuleEngine::new(rules);
        let ctx = desktop_ctx();

        let first = engine.resolve(&links, &ctx);
        for _ in 0..5 {
            assert_eq!(engine.resolve(&links, &ctx), first);
        }
    }

    #[test]
    fn higher_priority_rules_apply_first() {
        // HIDE at priority 10 runs before SHOW at priority 5; the later
        // application wins, so the link ends visible. The test pins this
        // exact ordering semantics.
        let hub_id = Uuid::new_v4();
        let x = link(Uuid::new_v4(), hub_id, 0, false);
        let hide_high = rule(hub_id, 10, vec![RuleAction::HideLink { link_id: x.id }]);
        let show_low = rule(hub_id, 5, vec![RuleAction::ShowLink { link_id: x.id }]);
        let engine = RuleEngine::new(vec![show_low.clone(), hide_high.clone()]);

        assert_eq!(
            engine.rules().iter().map(|r| r.id).collect::<Vec<_>>(),
            vec![hide_high.id, show_low.id],
        );
        let ids = visible_ids(engine.resolve(&[x.clone()], &desktop_ctx()));
        assert!(ids.contains(&x.id));
    }

    #[test]
    fn equal_priority_keeps_creation_order() {
        let hub_id = Uuid::new_v4();
        let x = link(Uuid::new_v4(), hub_id, 0, true);
        let mut older = rule(hub_id, 4, vec![RuleAction::HideLink { link_id: x.id }]);
        older.created_at = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let mut newer = rule(hub_id, 4, vec![RuleAction::ShowLink { link_id: x.id }]);
        newer.created_at = Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap();

        let engine = RuleEngine::new(vec![newer.clone(), older.clone()]);
        assert_eq!(
            engine.rules().iter().map(|r| r.id).collect::<Vec<_>>(),
            vec![older.id, newer.id],
        );

        // Older HIDE applies first, newer SHOW lands last.
        let ids = visible_ids(engine.resolve(&[x.clone()], &desktop_ctx()));
        assert!(ids.contains(&x.id));
    }

    #[test]
    fn redirect_short_circuits_remaining_rules() {
        let hub_id = Uuid::new_v4();
        let y = link(Uuid::new_v4(), hub_id, 0, true);
        let first = rule(
            hub_id,
            100,
            vec![
                RuleAction::HideLink { link_id: y.id },
                RuleAction::Redirect {
                    url: "https://x.test".into(),
                },
            ],
        );
        let second = rule(hub_id, 50, vec![RuleAction::ShowLink { link_id: y.id }]);
        let engine = RuleEngine::new(vec![first.clone(), second.clone()]);

        let mut observer = RecordingObserver::default();
        let resolution = engine.resolve_with_observer(&[y], &desktop_ctx(), &mut observer);
        assert_eq!(
            resolution,
            Resolution::Redirect {
                url: "https://x.test".into()
            }
        );
        // The second rule never ran.
        assert!(!observer
            .events
            .iter()
            .any(|event| matches!(event, TraceEvent::RuleMatched { rule_id } if *rule_id == second.id)));
    }

    #[test]
    fn inactive_rules_are_skipped_entirely() {
        let hub_id = Uuid::new_v4();
        let x = link(Uuid::new_v4(), hub_id, 0, true);
        let mut hide = rule(hub_id, 1, vec![RuleAction::HideLink { link_id: x.id }]);
        hide.is_active = false;
        let engine = RuleEngine::new(vec![hide]);

        let mut observer = RecordingObserver::default();
        let ids = visible_ids(engine.resolve_with_observer(&[x.clone()], &desktop_ctx(), &mut observer));
        assert!(ids.contains(&x.id));
        assert!(observer.events.is_empty());
    }

    #[test]
    fn show_link_ignores_foreign_and_deleted_ids() {
        let hub_id = Uuid::new_v4();
        let mut deleted = link(Uuid::new_v4(), hub_id, 0, true);
        deleted.deleted_at = Some(Utc::now());
        let live = link(Uuid::new_v4(), hub_id, 1, true);
        let engine = RuleEngine::new(vec![rule(
            hub_id,
            1,
            vec![
                RuleAction::ShowLink {
                    link_id: Uuid::new_v4(),
                },
                RuleAction::ShowLink {
                    link_id: deleted.id,
                },
            ],
        )]);

        let ids = visible_ids(engine.resolve(&[deleted.clone(), live.clone()], &desktop_ctx()));
        assert_eq!(ids, HashSet::from([live.id]));
    }

    #[test]
    fn rules_may_resurrect_inactive_links_per_device() {
        // End-to-end scenario: A(active), B(inactive); a mobile-only rule
        // shows B. Mobile sees both, desktop sees only A.
        let hub_id = Uuid::new_v4();
        let a = link(Uuid::new_v4(), hub_id, 0, true);
        let b = link(Uuid::new_v4(), hub_id, 1, false);
        let engine = RuleEngine::new(vec![rule_with_conditions(
            hub_id,
            1,
            vec![RuleCondition::DeviceType {
                devices: Some(vec!["mobile".into()]),
            }],
            vec![RuleAction::ShowLink { link_id: b.id }],
        )]);
        let links = vec![a.clone(), b.clone()];

        let mobile = visible_ids(engine.resolve(&links, &mobile_ctx()));
        assert_eq!(mobile, HashSet::from([a.id, b.id]));

        let desktop = visible_ids(engine.resolve(&links, &desktop_ctx()));
        assert_eq!(desktop, HashSet::from([a.id]));
    }

    #[test]
    fn empty_condition_list_always_matches() {
        let hub_id = Uuid::new_v4();
        let x = link(Uuid::new_v4(), hub_id, 0, true);
        let engine = RuleEngine::new(vec![rule(
            hub_id,
            1,
            vec![RuleAction::HideLink { link_id: x.id }],
        )]);
        let ids = visible_ids(engine.resolve(&[x], &desktop_ctx()));
        assert!(ids.is_empty());
    }

    #[test]
    fn observer_sees_every_step() {
        let hub_id = Uuid::new_v4();
        let x = link(Uuid::new_v4(), hub_id, 0, true);
        let matching = rule_with_conditions(
            hub_id,
            2,
            vec![RuleCondition::DeviceType { devices: None }],
            vec![RuleAction::HideLink { link_id: x.id }],
        );
        let skipped = rule_with_conditions(
            hub_id,
            1,
            vec![RuleCondition::Location {
                countries: Some(vec!["US".into()]),
            }],
            vec![RuleAction::ShowLink { link_id: x.id }],
        );
        let engine = RuleEngine::new(vec![matching.clone(), skipped.clone()]);

        let mut observer = RecordingObserver::default();
        let ctx = desktop_ctx();
        assert_eq!(ctx.device, DeviceClass::Desktop);
        let _ = engine.resolve_with_observer(&[x], &ctx, &mut observer);

        assert_eq!(
            observer.events,
            vec![
                TraceEvent::ConditionEvaluated {
                    rule_id: matching.id,
                    passed: true
                },
                TraceEvent::RuleMatched {
                    rule_id: matching.id
                },
                TraceEvent::ActionApplied {
                    rule_id: matching.id
                },
                TraceEvent::ConditionEvaluated {
                    rule_id: skipped.id,
                    passed: false
                },
                TraceEvent::RuleSkipped {
                    rule_id: skipped.id
                },
            ]
        );
    }
}
