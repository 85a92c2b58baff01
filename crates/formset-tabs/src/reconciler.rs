//! Tab reconciliation
//!
//! Walks the declared tab items, keeps the ones that are currently visible
//! and brings the live instance list in line with them. A slot whose tab
//! definition is still the same keeps its children untouched, so their state
//! survives any number of passes.

use std::fmt;
use std::sync::Arc;

use formset_logic::{ConditionEvaluator, EvaluationContext};
use formset_schema::TabItemSchema;

use crate::component::{ComponentFactory, FormComponent};
use crate::options::ReusePolicy;
use crate::Result;

/// One active tab: its definition and the live children built from it
pub struct TabInstance {
    pub schema: Arc<TabItemSchema>,
    pub components: Vec<Box<dyn FormComponent>>,
}

impl TabInstance {
    pub fn has_error(&self) -> bool {
        self.components.iter().any(|c| c.error().is_some())
    }

    pub fn component_ids(&self) -> Vec<String> {
        self.components.iter().map(|c| c.id().to_string()).collect()
    }

    fn detach(&mut self) {
        for component in &mut self.components {
            if component.is_attached() {
                component.detach();
            }
        }
    }
}

impl fmt::Debug for TabInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TabInstance")
            .field("key", &self.schema.key)
            .field("components", &self.components.len())
            .finish()
    }
}

/// Collaborators and flags for a reconciliation pass
pub struct ReconcileEnv<'a> {
    pub evaluator: &'a dyn ConditionEvaluator,
    pub factory: &'a dyn ComponentFactory,
    pub ctx: EvaluationContext<'a>,
    /// Builder or preview: every declared tab is active
    pub show_all: bool,
    /// First pass: build every active tab
    pub init: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconcileOutcome {
    /// Declared indices of the active tabs, in display order
    pub active: Vec<usize>,
    pub current_tab: usize,
    /// Active positions whose children were (re)built in this pass
    pub rebuilt: Vec<usize>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TabReconciler {
    policy: ReusePolicy,
}

impl TabReconciler {
    pub fn new(policy: ReusePolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> ReusePolicy {
        self.policy
    }

    fn same_tab(&self, a: &Arc<TabItemSchema>, b: &Arc<TabItemSchema>) -> bool {
        match self.policy {
            ReusePolicy::Identity => Arc::ptr_eq(a, b),
            ReusePolicy::KeyAndContent => Arc::ptr_eq(a, b) || (a.key == b.key && a == b),
        }
    }

    fn is_active(&self, tab: &TabItemSchema, env: &ReconcileEnv<'_>) -> bool {
        if env.show_all {
            return true;
        }
        match tab.conditional.as_ref() {
            Some(conditional) if env.evaluator.has_condition(Some(conditional)) => {
                env.evaluator.check_condition(conditional, &env.ctx)
            }
            _ => !tab.hidden,
        }
    }

    fn build(
        &self,
        tab: &Arc<TabItemSchema>,
        position: usize,
        env: &ReconcileEnv<'_>,
    ) -> Result<TabInstance> {
        let components = tab
            .components
            .iter()
            .map(|child| {
                let mut component = env.factory.create(child)?;
                component.set_tab(position);
                Ok(component)
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(TabInstance {
            schema: Arc::clone(tab),
            components,
        })
    }

    /// Bring `instances` in line with `declared`.
    ///
    /// `instances` is edited in place; on return it holds exactly one entry
    /// per active tab. Factory failures abort the pass and propagate.
    pub fn reconcile(
        &self,
        declared: &[Arc<TabItemSchema>],
        instances: &mut Vec<TabInstance>,
        current_tab: usize,
        env: &ReconcileEnv<'_>,
    ) -> Result<ReconcileOutcome> {
        let current = instances
            .get(current_tab)
            .map(|instance| Arc::clone(&instance.schema));

        let mut active = Vec::new();
        let mut rebuilt = Vec::new();
        let mut cursor = 0;

        for (declared_index, tab) in declared.iter().enumerate() {
            if !self.is_active(tab, env) {
                continue;
            }

            let reusable = !env.init
                && instances
                    .get(cursor)
                    .is_some_and(|instance| self.same_tab(&instance.schema, tab));

            if reusable {
                // Track the newest definition so later identity checks see it
                instances[cursor].schema = Arc::clone(tab);
            } else {
                let instance = self.build(tab, cursor, env)?;
                match instances.get_mut(cursor) {
                    Some(slot) => {
                        slot.detach();
                        *slot = instance;
                    }
                    None => instances.push(instance),
                }
                rebuilt.push(cursor);
            }

            active.push(declared_index);
            cursor += 1;
        }

        if instances.len() > cursor {
            for stale in &mut instances[cursor..] {
                stale.detach();
            }
            instances.truncate(cursor);
        }

        let current_tab = match current {
            Some(previous) => instances
                .iter()
                .position(|instance| self.same_tab(&instance.schema, &previous))
                .unwrap_or(0),
            None if current_tab < instances.len() => current_tab,
            None => 0,
        };

        tracing::debug!(
            active = ?active,
            rebuilt = ?rebuilt,
            current_tab,
            "Reconciled tabs"
        );

        Ok(ReconcileOutcome {
            active,
            current_tab,
            rebuilt,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::DefaultComponentFactory;
    use formset_logic::StandardEvaluator;
    use formset_schema::{ComponentSchema, Conditional};
    use serde_json::{json, Value};

    fn tab(key: &str, fields: &[&str]) -> Arc<TabItemSchema> {
        Arc::new(
            TabItemSchema::new(key.to_uppercase(), key).with_components(
                fields
                    .iter()
                    .map(|f| ComponentSchema::new("textfield", *f))
                    .collect(),
            ),
        )
    }

    fn env<'a>(data: &'a Value, init: bool) -> ReconcileEnv<'a> {
        ReconcileEnv {
            evaluator: &StandardEvaluator,
            factory: &DefaultComponentFactory,
            ctx: EvaluationContext::new(data),
            show_all: false,
            init,
        }
    }

    fn ids(instances: &[TabInstance]) -> Vec<Vec<String>> {
        instances.iter().map(TabInstance::component_ids).collect()
    }

    #[test]
    fn test_idempotent_pass() {
        let data = json!({});
        let declared = vec![tab("a", &["a1", "a2"]), tab("b", &["b1"])];
        let reconciler = TabReconciler::default();
        let mut instances = Vec::new();

        let first = reconciler
            .reconcile(&declared, &mut instances, 0, &env(&data, true))
            .unwrap();
        let before = ids(&instances);

        let second = reconciler
            .reconcile(&declared, &mut instances, first.current_tab, &env(&data, false))
            .unwrap();

        assert_eq!(first.active, second.active);
        assert!(second.rebuilt.is_empty());
        assert_eq!(before, ids(&instances));
    }

    #[test]
    fn test_children_tagged_with_position() {
        let data = json!({"show": "no"});
        let hidden = Arc::new(
            TabItemSchema::new("Hidden", "h").with_conditional(Conditional::show_when(true, "show", "yes")),
        );
        let declared = vec![hidden, tab("b", &["b1"])];
        let mut instances = Vec::new();

        TabReconciler::default()
            .reconcile(&declared, &mut instances, 0, &env(&data, true))
            .unwrap();

        assert_eq!(instances.len(), 1);
        assert_eq!(instances[0].components[0].tab(), Some(0));
    }

    #[test]
    fn test_only_replaced_tab_rebuilds() {
        let data = json!({});
        let mut declared = vec![tab("a", &["a1"]), tab("b", &["b1"]), tab("c", &["c1"])];
        let reconciler = TabReconciler::default();
        let mut instances = Vec::new();
        reconciler
            .reconcile(&declared, &mut instances, 0, &env(&data, true))
            .unwrap();
        let before = ids(&instances);

        declared[1] = Arc::new(TabItemSchema::clone(&declared[1]));
        let outcome = reconciler
            .reconcile(&declared, &mut instances, 0, &env(&data, false))
            .unwrap();

        let after = ids(&instances);
        assert_eq!(outcome.rebuilt, vec![1]);
        assert_eq!(before[0], after[0]);
        assert_ne!(before[1], after[1]);
        assert_eq!(before[2], after[2]);
    }

    #[test]
    fn test_key_and_content_policy_keeps_clones() {
        let data = json!({});
        let mut declared = vec![tab("a", &["a1"]), tab("b", &["b1"])];
        let reconciler = TabReconciler::new(ReusePolicy::KeyAndContent);
        let mut instances = Vec::new();
        reconciler
            .reconcile(&declared, &mut instances, 0, &env(&data, true))
            .unwrap();
        let before = ids(&instances);

        declared = declared
            .iter()
            .map(|t| Arc::new(TabItemSchema::clone(t)))
            .collect();
        let outcome = reconciler
            .reconcile(&declared, &mut instances, 1, &env(&data, false))
            .unwrap();

        assert!(outcome.rebuilt.is_empty());
        assert_eq!(outcome.current_tab, 1);
        assert_eq!(before, ids(&instances));
        assert!(Arc::ptr_eq(&instances[0].schema, &declared[0]));
    }

    #[test]
    fn test_current_tab_follows_or_resets() {
        let declared = vec![
            Arc::new(
                TabItemSchema::new("A", "a")
                    .with_conditional(Conditional::show_when(true, "showA", true)),
            ),
            tab("b", &[]),
            Arc::new(
                TabItemSchema::new("C", "c")
                    .with_conditional(Conditional::show_when(true, "showC", true)),
            ),
        ];
        let reconciler = TabReconciler::default();
        let mut instances = Vec::new();

        let data = json!({"showA": true, "showC": true});
        reconciler
            .reconcile(&declared, &mut instances, 0, &env(&data, true))
            .unwrap();

        // Current is "b" at position 1; hiding "a" shifts it to 0
        let data = json!({"showA": false, "showC": true});
        let outcome = reconciler
            .reconcile(&declared, &mut instances, 1, &env(&data, false))
            .unwrap();
        assert_eq!(outcome.active, vec![1, 2]);
        assert_eq!(outcome.current_tab, 0);

        // Current is "c" at position 1; hiding it resets to 0
        let data = json!({"showA": false, "showC": false});
        let outcome = reconciler
            .reconcile(&declared, &mut instances, 1, &env(&data, false))
            .unwrap();
        assert_eq!(outcome.active, vec![1]);
        assert_eq!(outcome.current_tab, 0);
        assert_eq!(instances.len(), 1);
    }

    #[test]
    fn test_show_all_ignores_conditionals() {
        let data = json!({});
        let declared = vec![
            Arc::new(TabItemSchema::new("A", "a").with_conditional(Conditional::show(false))),
            Arc::new(TabItemSchema {
                hidden: true,
                ..TabItemSchema::new("B", "b")
            }),
        ];
        let mut instances = Vec::new();
        let env = ReconcileEnv {
            show_all: true,
            ..env(&data, true)
        };

        let outcome = TabReconciler::default()
            .reconcile(&declared, &mut instances, 0, &env)
            .unwrap();
        assert_eq!(outcome.active, vec![0, 1]);
    }

    #[test]
    fn test_factory_failure_propagates() {
        let data = json!({});
        let declared = vec![Arc::new(
            TabItemSchema::new("A", "a").with_components(vec![ComponentSchema::new("", "x")]),
        )];
        let mut instances = Vec::new();

        let result =
            TabReconciler::default().reconcile(&declared, &mut instances, 0, &env(&data, true));
        assert!(result.is_err());
    }
}
