use tracing::debug;
use uuid::Uuid;

use crate::action::RuleAction;
use crate::condition::RuleCondition;
use crate::rule::Rule;

/// Structured hook invoked as the engine walks rules, conditions and
/// actions. Callers opt into evaluation verbosity by supplying an
/// implementation; there is no global verbose flag.
pub trait EvaluationObserver {
    fn condition_evaluated(&mut self, rule: &Rule, condition: &RuleCondition, passed: bool) {
        let _ = (rule, condition, passed);
    }

    fn rule_matched(&mut self, rule: &Rule) {
        let _ = rule;
    }

    fn rule_skipped(&mut self, rule: &Rule) {
        let _ = rule;
    }

    fn action_applied(&mut self, rule: &Rule, action: &RuleAction) {
        let _ = (rule, action);
    }
}

/// Default observer: forwards every step to `tracing` at debug level.
#[derive(Debug, Default)]
pub struct TracingObserver;

impl EvaluationObserver for TracingObserver {
    fn condition_evaluated(&mut self, rule: &Rule, condition: &RuleCondition, passed: bool) {
        debug!(rule_id = %rule.id, ?condition, passed, "condition evaluated");
    }

    fn rule_matched(&mut self, rule: &Rule) {
        debug!(rule_id = %rule.id, rule = %rule.name, "rule matched");
    }

    fn rule_skipped(&mut self, rule: &Rule) {
        debug!(rule_id = %rule.id, rule = %rule.name, "rule skipped");
    }

    fn action_applied(&mut self, rule: &Rule, action: &RuleAction) {
        debug!(rule_id = %rule.id, ?action, "action applied");
    }
}

/// Flat record of one evaluation step, kept by [`RecordingObserver`].
#[derive(Debug, Clone, PartialEq)]
pub enum TraceEvent {
    ConditionEvaluated { rule_id: Uuid, passed: bool },
    RuleMatched { rule_id: Uuid },
    RuleSkipped { rule_id: Uuid },
    ActionApplied { rule_id: Uuid },
}

/// Observer that accumulates trace events, useful in tests and diagnostics
/// endpoints.
#[derive(Debug, Default)]
pub struct RecordingObserver {
    pub events: Vec<TraceEvent>,
}

impl EvaluationObserver for RecordingObserver {
    fn condition_evaluated(&mut self, rule: &Rule, _condition: &RuleCondition, passed: bool) {
        self.events.push(TraceEvent::ConditionEvaluated {
            rule_id: rule.id,
            passed,
        });
    }

    fn rule_matched(&mut self, rule: &Rule) {
        self.events.push(TraceEvent::RuleMatched { rule_id: rule.id });
    }

    fn rule_skipped(&mut self, rule: &Rule) {
        self.events.push(TraceEvent::RuleSkipped { rule_id: rule.id });
    }

    fn action_applied(&mut self, rule: &Rule, _action: &RuleAction) {
        self.events.push(TraceEvent::ActionApplied { rule_id: rule.id });
    }
}
