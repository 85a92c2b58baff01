//! Trigger/action replay for a tabs container
//!
//! Data-driven rules run as one pass over a scratch copy of the original
//! schema. The live schema is only ever replaced as a whole, and only when
//! the pass produced something structurally different.
//!
//! Event-driven rules are kept in per-event observer lists that exist
//! between attach and detach.

use serde_json::Value;
use std::sync::Arc;

use formset_logic::{interpolate, ConditionEvaluator, EvaluationContext, TriggerResult};
use formset_schema::{TabItemSchema, TabsSchema};

use crate::events::{EventSubscription, EventSubscriptions};

#[derive(Debug, Default)]
pub struct TabLogicEngine {
    subscriptions: EventSubscriptions,
}

impl TabLogicEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run every data-driven rule of `original` and commit the result to `live`.
    ///
    /// Returns `true` if any action reported a change or the live schema was
    /// replaced. Without any rules this returns `false` straight away and
    /// `live` keeps its identity.
    pub fn apply_component_logic(
        &self,
        original: &TabsSchema,
        live: &mut Arc<TabsSchema>,
        evaluator: &dyn ConditionEvaluator,
        ctx: &EvaluationContext<'_>,
    ) -> bool {
        if !original.has_logic() {
            return false;
        }

        let mut scratch = original.deep_clone();

        let container_rules = scratch.logic.clone();
        let mut changed = container_rules.iter().fold(false, |changed, rule| {
            let fired = match evaluator.check_trigger(&scratch, &rule.trigger, ctx) {
                Some(result) => {
                    tracing::trace!(rule = ?rule.name, "Container rule fired");
                    evaluator.apply_actions(&mut scratch, &rule.actions, &result, ctx)
                }
                None => false,
            };
            fired || changed
        });

        for tab in scratch.components.iter_mut() {
            if !tab.has_logic() {
                continue;
            }
            // The scratch copy owns fresh tab items, so this never clones
            let tab = Arc::make_mut(tab);
            let rules = tab.logic.clone();
            for rule in &rules {
                if let Some(result) = evaluator.check_trigger(&*tab, &rule.trigger, ctx) {
                    tracing::trace!(tab = %tab.key, rule = ?rule.name, "Tab rule fired");
                    changed =
                        evaluator.apply_actions(&mut *tab, &rule.actions, &result, ctx) || changed;
                }
            }
        }

        if **live != scratch {
            tracing::info!(tabs_key = %scratch.key, "Logic replaced tabs schema");
            *live = Arc::new(scratch);
            changed = true;
        }

        changed
    }

    /// Register every event-triggered tab item rule of `schema`
    pub fn subscribe(&mut self, schema: &TabsSchema, ctx: &EvaluationContext<'_>) {
        for (tab_index, tab) in schema.components.iter().enumerate() {
            for rule in tab.logic.iter().filter(|rule| rule.trigger.is_event()) {
                let Some(event) = rule.trigger.event.as_deref() else {
                    tracing::warn!(tab = %tab.key, rule = ?rule.name, "Event trigger without an event name");
                    continue;
                };
                let event = interpolate(event, ctx);
                tracing::debug!(tab = %tab.key, event = %event, "Subscribed logic event");
                self.subscriptions.subscribe(EventSubscription {
                    event,
                    tab_index,
                    rule: rule.clone(),
                });
            }
        }
    }

    pub fn unsubscribe_all(&mut self) {
        if !self.subscriptions.is_empty() {
            tracing::debug!(count = self.subscriptions.len(), "Unsubscribed logic events");
        }
        self.subscriptions.clear();
    }

    pub fn subscribed_events(&self) -> Vec<&str> {
        self.subscriptions.events()
    }

    pub fn subscription_count(&self) -> usize {
        self.subscriptions.len()
    }

    /// Fire the rules subscribed to `event`.
    ///
    /// Each rule works on a copy of its tab item only; a changed copy
    /// replaces that single entry of `live`, the other tab items keep their
    /// identity. Returns `true` if a redraw is needed.
    pub fn handle_event(
        &self,
        event: &str,
        args: &[Value],
        live: &mut Arc<TabsSchema>,
        evaluator: &dyn ConditionEvaluator,
        ctx: &EvaluationContext<'_>,
    ) -> bool {
        let mut redraw = false;

        for subscription in self.subscriptions.subscribers(event) {
            let Some(current) = live.components.get(subscription.tab_index) else {
                continue;
            };

            let mut candidate = TabItemSchema::clone(current);
            let result = TriggerResult::from_event_args(args.to_vec());
            if !evaluator.apply_actions(&mut candidate, &subscription.rule.actions, &result, ctx) {
                continue;
            }
            if **current == candidate {
                continue;
            }

            tracing::debug!(
                event = %event,
                tab = %candidate.key,
                "Event logic replaced tab item"
            );
            Arc::make_mut(live).components[subscription.tab_index] = Arc::new(candidate);
            redraw = true;
        }

        redraw
    }
}
