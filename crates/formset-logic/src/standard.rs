//! Built-in evaluator for simple conditionals and property/merge actions

use serde_json::Value;

use formset_schema::{
    value_as_flag, Action, ActionType, Conditional, SchemaNode, Trigger, TriggerType,
};

use crate::context::EvaluationContext;
use crate::evaluator::{ConditionEvaluator, TriggerResult};
use crate::interpolate::interpolate;

/// Evaluates simple conditionals and `simple` triggers.
///
/// JSON-logic and script conditions are left to external evaluators: a
/// JSON-only conditional shows its component, and such triggers never fire.
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardEvaluator;

impl StandardEvaluator {
    pub fn new() -> Self {
        Self
    }

    fn apply_action(
        &self,
        node: &mut dyn SchemaNode,
        action: &Action,
        ctx: &EvaluationContext<'_>,
    ) -> bool {
        let outcome = match action.action_type {
            ActionType::Property => {
                let Some(property) = &action.property else {
                    tracing::warn!(action = ?action.name, "Property action without a target");
                    return false;
                };
                let value = match property.property_type.as_deref() {
                    Some("string") => Value::String(
                        action
                            .text
                            .as_deref()
                            .map(|text| interpolate(text, ctx))
                            .unwrap_or_default(),
                    ),
                    Some("boolean") => {
                        Value::Bool(action.state.as_ref().is_some_and(value_as_flag))
                    }
                    _ => action.state.clone().unwrap_or(Value::Null),
                };
                node.set_property(&property.value, value)
            }
            ActionType::MergeComponentSchema => match &action.schema_definition {
                Some(definition) => node.merge_schema(definition),
                None => Ok(false),
            },
            ActionType::Value | ActionType::CustomAction => {
                tracing::trace!(action = ?action.name, "Action does not touch the schema");
                Ok(false)
            }
            ActionType::Unknown => {
                tracing::warn!(action = ?action.name, "Unsupported action type");
                Ok(false)
            }
        };

        outcome.unwrap_or_else(|e| {
            tracing::warn!(action = ?action.name, error = %e, "Logic action failed");
            false
        })
    }
}

impl ConditionEvaluator for StandardEvaluator {
    fn check_condition(&self, conditional: &Conditional, ctx: &EvaluationContext<'_>) -> bool {
        let show = conditional.show_flag().unwrap_or(true);

        match conditional.when.as_deref().filter(|w| !w.is_empty()) {
            Some(when) => {
                let expected = conditional
                    .eq
                    .clone()
                    .unwrap_or_else(|| Value::String(String::new()));
                if values_match(ctx.value_of(when), &expected) {
                    show
                } else {
                    !show
                }
            }
            None if conditional.show_flag().is_none() && conditional.json.is_some() => {
                tracing::debug!(
                    component = %ctx.component_key,
                    "JSON conditional needs an external evaluator, showing component"
                );
                true
            }
            None => show,
        }
    }

    fn check_trigger(
        &self,
        _node: &dyn SchemaNode,
        trigger: &Trigger,
        ctx: &EvaluationContext<'_>,
    ) -> Option<TriggerResult> {
        match trigger.trigger_type {
            TriggerType::Simple => {
                let conditional = trigger.simple.as_ref()?;
                self.has_condition(Some(conditional))
                    .then(|| self.check_condition(conditional, ctx))
                    .filter(|fired| *fired)
                    .map(|_| TriggerResult::fired())
            }
            // Event triggers fire through event subscriptions, never on data changes
            TriggerType::Event => None,
            TriggerType::Javascript | TriggerType::Json | TriggerType::Unknown => {
                tracing::trace!(
                    component = %ctx.component_key,
                    trigger = ?trigger.trigger_type,
                    "Trigger type not evaluated"
                );
                None
            }
        }
    }

    fn apply_actions(
        &self,
        node: &mut dyn SchemaNode,
        actions: &[Action],
        _result: &TriggerResult,
        ctx: &EvaluationContext<'_>,
    ) -> bool {
        actions.iter().fold(false, |changed, action| {
            self.apply_action(node, action, ctx) || changed
        })
    }
}

/// Loose comparison: arrays match if any element matches, scalars compare
/// by their text form so `"1"` equals `1`.
fn values_match(actual: Option<&Value>, expected: &Value) -> bool {
    match actual {
        Some(Value::Array(items)) => items.iter().any(|item| loose_eq(item, expected)),
        Some(value) => loose_eq(value, expected),
        None => loose_eq(&Value::Null, expected),
    }
}

fn loose_eq(a: &Value, b: &Value) -> bool {
    a == b || as_text(a) == as_text(b)
}

fn as_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use formset_schema::TabItemSchema;
    use serde_json::{json, Map};

    #[test]
    fn test_show_only_conditional() {
        let data = json!({});
        let ctx = EvaluationContext::new(&data);
        let evaluator = StandardEvaluator::new();

        assert!(!evaluator.check_condition(&Conditional::show(false), &ctx));
        assert!(evaluator.check_condition(&Conditional::show(true), &ctx));
    }

    #[test]
    fn test_when_eq_conditional() {
        let evaluator = StandardEvaluator::new();
        let cond = Conditional::show_when(true, "plan", "pro");

        let data = json!({"plan": "pro"});
        assert!(evaluator.check_condition(&cond, &EvaluationContext::new(&data)));

        let data = json!({"plan": "free"});
        assert!(!evaluator.check_condition(&cond, &EvaluationContext::new(&data)));

        // Hide-when flips the outcome
        let hide = Conditional::show_when(false, "plan", "pro");
        assert!(evaluator.check_condition(&hide, &EvaluationContext::new(&data)));
    }

    #[test]
    fn test_loose_matching() {
        let evaluator = StandardEvaluator::new();
        let cond = Conditional::show_when(true, "count", "2");
        let data = json!({"count": 2});
        assert!(evaluator.check_condition(&cond, &EvaluationContext::new(&data)));

        let cond = Conditional::show_when(true, "tags", "b");
        let data = json!({"tags": ["a", "b"]});
        assert!(evaluator.check_condition(&cond, &EvaluationContext::new(&data)));

        let cond = Conditional::show_when(true, "missing", "");
        assert!(evaluator.check_condition(&cond, &EvaluationContext::new(&data)));
    }

    #[test]
    fn test_simple_trigger() {
        let evaluator = StandardEvaluator::new();
        let tab = TabItemSchema::new("A", "a");
        let trigger = Trigger::simple(Conditional::show_when(true, "lock", true));

        let data = json!({"lock": true});
        assert_eq!(
            evaluator.check_trigger(&tab, &trigger, &EvaluationContext::new(&data)),
            Some(TriggerResult::fired())
        );

        let data = json!({"lock": false});
        assert!(evaluator
            .check_trigger(&tab, &trigger, &EvaluationContext::new(&data))
            .is_none());

        assert!(evaluator
            .check_trigger(&tab, &Trigger::event("x"), &EvaluationContext::new(&data))
            .is_none());
    }

    #[test]
    fn test_apply_actions() {
        let evaluator = StandardEvaluator::new();
        let data = json!({"name": "Ada"});
        let ctx = EvaluationContext::new(&data);
        let mut tab = TabItemSchema::new("A", "a");

        let mut patch = Map::new();
        patch.insert("hidden".to_string(), json!(true));

        let actions = vec![
            Action::set_flag("disabled", true),
            Action::set_text("label", "Hello {{ data.name }}"),
            Action::merge(patch),
        ];
        assert!(evaluator.apply_actions(&mut tab, &actions, &TriggerResult::fired(), &ctx));
        assert!(tab.disabled);
        assert!(tab.hidden);
        assert_eq!(tab.label, "Hello Ada");

        // Re-applying is not a change
        assert!(!evaluator.apply_actions(&mut tab, &actions, &TriggerResult::fired(), &ctx));
    }

    #[test]
    fn test_failed_action_is_not_a_change() {
        let evaluator = StandardEvaluator::new();
        let data = json!({});
        let ctx = EvaluationContext::new(&data);
        let mut tab = TabItemSchema::new("A", "a");

        // "label" is a string; writing a number cannot be parsed back
        let action: Action = serde_json::from_value(json!({
            "type": "property",
            "property": {"value": "label"},
            "state": 5
        }))
        .unwrap();
        assert!(!evaluator.apply_actions(&mut tab, &[action], &TriggerResult::fired(), &ctx));
        assert_eq!(tab.label, "A");
    }
}
