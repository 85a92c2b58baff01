//! The condition evaluator contract

use serde::{Deserialize, Serialize};
use serde_json::Value;

use formset_schema::{Action, Conditional, SchemaNode, Trigger};

use crate::context::EvaluationContext;

/// What a fired trigger hands to its actions: `true` for data-driven
/// triggers, the event arguments for event triggers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TriggerResult(pub Value);

impl TriggerResult {
    pub fn fired() -> Self {
        Self(Value::Bool(true))
    }

    pub fn from_event_args(args: Vec<Value>) -> Self {
        Self(Value::Array(args))
    }

    pub fn value(&self) -> &Value {
        &self.0
    }
}

/// Pure evaluation of conditionals and logic rules.
///
/// Implementations must not fail: anything they cannot interpret evaluates
/// to "not fired" or "no change". The only side effect allowed is the
/// mutation of the node handed to [`ConditionEvaluator::apply_actions`].
pub trait ConditionEvaluator {
    /// Whether a conditional is present and has anything to evaluate
    fn has_condition(&self, conditional: Option<&Conditional>) -> bool {
        conditional.is_some_and(Conditional::is_set)
    }

    /// Whether a component guarded by `conditional` should be shown
    fn check_condition(&self, conditional: &Conditional, ctx: &EvaluationContext<'_>) -> bool;

    /// Evaluate a trigger against the current state of `node`
    fn check_trigger(
        &self,
        node: &dyn SchemaNode,
        trigger: &Trigger,
        ctx: &EvaluationContext<'_>,
    ) -> Option<TriggerResult>;

    /// Apply actions to `node`, returning whether it changed
    fn apply_actions(
        &self,
        node: &mut dyn SchemaNode,
        actions: &[Action],
        result: &TriggerResult,
        ctx: &EvaluationContext<'_>,
    ) -> bool;
}
