//! Rewrite engine.
//!
//! Rules are data: a [`RewritePlan`] is an ordered list of named
//! [`RewriteRule`]s folded over the artifact text. Literal rules never fail;
//! regex-anchored rules fail the whole plan when their anchor is absent.

pub mod errors;
pub mod plan;
pub mod rule;

pub use errors::RuleError;
pub use plan::{RewritePlan, RuleStep, StepTrace};
pub use rule::{filter_imports, RewriteRule, RuleKind, StepOutcome};
