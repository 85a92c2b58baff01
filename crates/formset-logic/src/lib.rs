//! Formset Logic
//!
//! Evaluation of the declarative parts of a form schema:
//! - conditional visibility (`show` / `when` / `eq`)
//! - logic rule triggers (simple conditionals, named events)
//! - logic rule actions (property writes, schema merges)
//!
//! Evaluation never fails: a rule the evaluator cannot interpret simply does
//! not fire.

mod context;
mod evaluator;
mod interpolate;
mod standard;

pub use context::{lookup_path, EvaluationContext};
pub use evaluator::{ConditionEvaluator, TriggerResult};
pub use interpolate::interpolate;
pub use standard::StandardEvaluator;
