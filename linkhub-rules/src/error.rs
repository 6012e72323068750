use thiserror::Error;
use uuid::Uuid;

/// Errors produced when stored rule payloads are lifted into typed form at
/// the data-store boundary. A malformed rule contributes no effect to
/// evaluation; the error is logged for operators and never surfaced to the
/// anonymous caller.
#[derive(Debug, Error)]
pub enum RuleError {
    #[error("rule {rule_id} carries malformed conditions: {source}")]
    MalformedConditions {
        rule_id: Uuid,
        #[source]
        source: serde_json::Error,
    },
    #[error("rule {rule_id} carries malformed actions: {source}")]
    MalformedActions {
        rule_id: Uuid,
        #[source]
        source: serde_json::Error,
    },
}
