//! Visibility rule engine for public LinkHub pages.
//!
//! Given a hub's links, its prioritized conditional rules and a visitor
//! context (server-local time, device class, resolved country), the engine
//! computes the final set of links to display or an override redirect.
//! Evaluation is synchronous pure computation: all data is fetched up front
//! and two concurrent requests share nothing mutable.

mod action;
mod condition;
mod engine;
mod error;
mod observer;
mod outcome;
mod resolver;
mod rule;

pub use action::RuleAction;
pub use condition::RuleCondition;
pub use engine::RuleEngine;
pub use error::RuleError;
pub use observer::{EvaluationObserver, RecordingObserver, TraceEvent, TracingObserver};
pub use outcome::Resolution;
pub use resolver::{visible_links, HubView};
pub use rule::Rule;
