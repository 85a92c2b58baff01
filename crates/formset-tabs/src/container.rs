//! The tabs container component

use serde_json::Value;
use std::sync::Arc;

use formset_logic::{ConditionEvaluator, EvaluationContext};
use formset_schema::{TabItemSchema, TabsSchema};

use crate::component::{ComponentFactory, FormComponent};
use crate::dom::{ElementRef, TabRefs};
use crate::events::{Listeners, TabsEvent, TabsEventKind};
use crate::logic::TabLogicEngine;
use crate::options::TabsOptions;
use crate::reconciler::{ReconcileEnv, TabInstance, TabReconciler};
use crate::state::{
    SwitchRejection, TabSwitch, HAS_ERROR, INVALID, LINK_ACTIVE, LINK_CONTAINER_ACTIVE,
    PANEL_ACTIVE, TAB_ERROR,
};
use crate::template::{RenderVariant, Surface, TabRefKeys, TabTemplateContext};
use crate::Result;

/// A `tabs` layout component with its live tab instances.
///
/// Every call that reads data takes an [`EvaluationContext`]; the container
/// keeps no copy of the submission.
pub struct TabsComponent {
    /// Definition as constructed; logic passes start from a copy of it
    original: TabsSchema,
    /// Committed definition, replaced wholesale by logic
    schema: Arc<TabsSchema>,
    options: TabsOptions,
    evaluator: Arc<dyn ConditionEvaluator>,
    factory: Arc<dyn ComponentFactory>,
    surface: Arc<dyn Surface>,
    reconciler: TabReconciler,
    logic: TabLogicEngine,
    tabs: Vec<TabInstance>,
    /// Declared indices of `tabs`, in display order
    active: Vec<usize>,
    current_tab: usize,
    refs: Option<TabRefs>,
    disabled: bool,
    parent_disabled: bool,
    listeners: Listeners,
}

impl TabsComponent {
    pub fn new(
        schema: TabsSchema,
        options: TabsOptions,
        evaluator: Arc<dyn ConditionEvaluator>,
        factory: Arc<dyn ComponentFactory>,
        surface: Arc<dyn Surface>,
    ) -> Self {
        let reconciler = TabReconciler::new(options.reuse_policy);
        let disabled = options.read_only || schema.disabled;

        Self {
            schema: Arc::new(schema.clone()),
            original: schema,
            options,
            evaluator,
            factory,
            surface,
            reconciler,
            logic: TabLogicEngine::new(),
            tabs: Vec::new(),
            active: Vec::new(),
            current_tab: 0,
            refs: None,
            disabled,
            parent_disabled: false,
            listeners: Listeners::default(),
        }
    }

    // === Accessors ===

    pub fn key(&self) -> &str {
        &self.schema.key
    }

    pub fn tab_key(&self) -> String {
        format!("tab-{}", self.schema.key)
    }

    pub fn tab_li_key(&self) -> String {
        format!("tabLi-{}", self.schema.key)
    }

    pub fn tab_link_key(&self) -> String {
        format!("tabLink-{}", self.schema.key)
    }

    pub fn ref_keys(&self) -> TabRefKeys {
        TabRefKeys::for_component(&self.schema.key)
    }

    /// The committed definition
    pub fn live_schema(&self) -> &Arc<TabsSchema> {
        &self.schema
    }

    pub fn options(&self) -> &TabsOptions {
        &self.options
    }

    pub fn tabs(&self) -> &[TabInstance] {
        &self.tabs
    }

    /// Declared indices of the active tabs
    pub fn active_tabs(&self) -> &[usize] {
        &self.active
    }

    pub fn current_tab(&self) -> usize {
        self.current_tab
    }

    pub fn refs(&self) -> Option<&TabRefs> {
        self.refs.as_ref()
    }

    pub fn is_attached(&self) -> bool {
        self.refs.is_some()
    }

    pub fn is_disabled(&self) -> bool {
        self.disabled
    }

    pub fn subscribed_events(&self) -> Vec<&str> {
        self.logic.subscribed_events()
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    pub fn find_component(&self, id: &str) -> Option<&dyn FormComponent> {
        self.tabs
            .iter()
            .flat_map(|tab| tab.components.iter())
            .find(|c| c.id() == id)
            .map(|c| &**c)
    }

    /// The current definition, with each active tab's children taken from
    /// the live components
    pub fn schema(&self) -> TabsSchema {
        let mut schema = self.schema.deep_clone();
        for (position, declared_index) in self.active.iter().enumerate() {
            let (Some(tab), Some(instance)) = (
                schema.components.get_mut(*declared_index),
                self.tabs.get(position),
            ) else {
                continue;
            };
            Arc::make_mut(tab).components = instance
                .components
                .iter()
                .map(|c| c.schema().clone())
                .collect();
        }
        schema
    }

    // === Lifecycle ===

    pub fn on_event(&mut self, listener: impl Fn(&TabsEvent) + 'static) {
        self.listeners.add(Box::new(listener));
    }

    /// Build every active tab from scratch
    pub fn init(&mut self, ctx: &EvaluationContext<'_>) -> Result<()> {
        self.reconcile(ctx, true)
    }

    fn reconcile(&mut self, ctx: &EvaluationContext<'_>, init: bool) -> Result<()> {
        let env = ReconcileEnv {
            evaluator: self.evaluator.as_ref(),
            factory: self.factory.as_ref(),
            ctx: *ctx,
            show_all: self.options.shows_all_tabs(),
            init,
        };
        let outcome = self.reconciler.reconcile(
            &self.schema.components,
            &mut self.tabs,
            self.current_tab,
            &env,
        )?;
        self.active = outcome.active;
        self.current_tab = outcome.current_tab;
        Ok(())
    }

    /// Re-evaluate tab visibility; redraws if the set of active tab
    /// definitions changed. Returns whether it did.
    pub fn check_conditions(&mut self, ctx: &EvaluationContext<'_>) -> Result<bool> {
        let before: Vec<Arc<TabItemSchema>> =
            self.tabs.iter().map(|t| Arc::clone(&t.schema)).collect();
        self.reconcile(ctx, false)?;

        let changed = !before.iter().eq(self.tabs.iter().map(|t| &t.schema));
        if changed {
            self.redraw(ctx)?;
        }
        Ok(changed)
    }

    pub fn render(&self) -> String {
        let keys = self.ref_keys();
        let ctx = TabTemplateContext {
            tab_key: keys.panel,
            tab_link_key: keys.link,
            tab_likey: keys.link_container,
            current_tab: self.current_tab,
            vertical_layout: self.schema.vertical_layout,
            tab_item_components: self.tabs.iter().map(|t| Arc::clone(&t.schema)).collect(),
            tab_components: self
                .tabs
                .iter()
                .map(|tab| tab.components.iter().map(|c| c.render()).collect())
                .collect(),
        };
        let variant = if self.options.is_flat() {
            RenderVariant::Flat
        } else {
            RenderVariant::Default
        };
        self.surface.render_template("tab", &ctx, variant)
    }

    /// Render and mount through the surface, then attach
    pub fn mount(&mut self, ctx: &EvaluationContext<'_>) -> Result<()> {
        let markup = self.render();
        let refs = self.surface.mount(&markup, &self.ref_keys())?;
        self.attach(refs, ctx);
        Ok(())
    }

    /// Take over mounted elements: children attach to their panels and
    /// event-triggered logic starts listening
    pub fn attach(&mut self, refs: TabRefs, ctx: &EvaluationContext<'_>) {
        if self.is_attached() {
            self.detach();
        }

        if !self.options.shows_all_tabs() {
            let ctx = ctx.with_component_key(&self.schema.key);
            self.logic.subscribe(&self.schema, &ctx);
        }

        for (panel, tab) in refs.panels.iter().zip(self.tabs.iter_mut()) {
            for component in &mut tab.components {
                component.attach(Arc::clone(panel));
            }
        }

        self.refs = Some(refs);
        if !self.options.is_flat() {
            self.paint_current_tab();
        }

        tracing::info!(
            tabs_key = %self.schema.key,
            tabs = self.tabs.len(),
            current_tab = self.current_tab,
            "Attached tabs"
        );
    }

    pub fn detach(&mut self) {
        self.logic.unsubscribe_all();
        for tab in &mut self.tabs {
            for component in &mut tab.components {
                if component.is_attached() {
                    component.detach();
                }
            }
        }
        if self.refs.take().is_some() {
            tracing::info!(tabs_key = %self.schema.key, "Detached tabs");
        }
    }

    /// Detach and drop every tab instance and listener
    pub fn destroy(&mut self) {
        self.detach();
        self.tabs.clear();
        self.active.clear();
        self.current_tab = 0;
        self.listeners.clear();
    }

    /// Reconcile, then render and re-attach if currently attached
    pub fn redraw(&mut self, ctx: &EvaluationContext<'_>) -> Result<()> {
        self.reconcile(ctx, false)?;
        if self.is_attached() {
            self.detach();
            self.mount(ctx)?;
        }
        self.emit(TabsEventKind::Redraw);
        Ok(())
    }

    // === Logic ===

    /// Run the data-driven logic pass; on change the container is redrawn
    /// before this returns
    pub fn apply_logic(&mut self, ctx: &EvaluationContext<'_>) -> Result<bool> {
        if self.options.builder_mode {
            return Ok(false);
        }

        let key = self.original.key.clone();
        let ctx = ctx.with_component_key(&key);
        let before = Arc::clone(&self.schema);
        let changed = self.logic.apply_component_logic(
            &self.original,
            &mut self.schema,
            self.evaluator.as_ref(),
            &ctx,
        );

        if !Arc::ptr_eq(&before, &self.schema) {
            self.update_disabled();
        }
        if changed {
            self.redraw(&ctx)?;
        }
        Ok(changed)
    }

    /// Deliver a named event to event-triggered rules
    pub fn handle_event(
        &mut self,
        event: &str,
        args: &[Value],
        ctx: &EvaluationContext<'_>,
    ) -> Result<bool> {
        let key = self.original.key.clone();
        let ctx = ctx.with_component_key(&key);
        let redraw = self.logic.handle_event(
            event,
            args,
            &mut self.schema,
            self.evaluator.as_ref(),
            &ctx,
        );
        if redraw {
            self.redraw(&ctx)?;
        }
        Ok(redraw)
    }

    pub fn set_parent_disabled(&mut self, disabled: bool) {
        self.parent_disabled = disabled;
        self.update_disabled();
    }

    fn update_disabled(&mut self) {
        let disabled = self.options.read_only || self.schema.disabled || self.parent_disabled;
        if disabled != self.disabled {
            tracing::debug!(tabs_key = %self.schema.key, disabled, "Tabs disabled state changed");
            self.disabled = disabled;
        }
    }

    // === Navigation ===

    /// Switch to the active tab at `index`; invalid targets are ignored
    pub fn set_tab(&mut self, index: usize) -> TabSwitch {
        let rejection = match (self.tabs.get(index), self.panel(index)) {
            (None, _) => Some(SwitchRejection::NoInstance),
            (Some(_), None) => Some(SwitchRejection::NoPanel),
            (Some(tab), Some(_)) if tab.schema.disabled => Some(SwitchRejection::Disabled),
            _ => None,
        };
        if let Some(reason) = rejection {
            tracing::debug!(tabs_key = %self.schema.key, index, reason = %reason, "Tab switch ignored");
            return TabSwitch::Rejected(reason);
        }

        let from = self.current_tab;
        self.current_tab = index;
        self.paint_current_tab();
        self.emit(TabsEventKind::Change);

        TabSwitch::Switched { from, to: index }
    }

    /// Bring the tab holding component `id` to the front
    pub fn focus_component(&mut self, id: &str) -> Option<TabSwitch> {
        let index = self
            .tabs
            .iter()
            .position(|tab| tab.components.iter().any(|c| c.id() == id))?;
        if index == self.current_tab {
            return None;
        }
        Some(self.set_tab(index))
    }

    fn panel(&self, index: usize) -> Option<&ElementRef> {
        self.refs.as_ref().and_then(|refs| refs.panel(index))
    }

    fn paint_current_tab(&self) {
        let Some(refs) = self.refs.as_ref() else {
            return;
        };
        let index = self.current_tab;

        for panel in &refs.panels {
            panel.remove_class(PANEL_ACTIVE);
            panel.set_visible(false);
        }
        if let Some(panel) = refs.panel(index) {
            panel.add_class(PANEL_ACTIVE);
            panel.set_visible(true);
        }

        for link in &refs.links {
            link.remove_class(LINK_ACTIVE);
        }
        for container in &refs.link_containers {
            container.remove_class(LINK_CONTAINER_ACTIVE);
        }
        if let Some(container) = refs.link_container(index) {
            container.add_class(LINK_CONTAINER_ACTIVE);
        }
        if let Some(link) = refs.link(index) {
            link.add_class(LINK_ACTIVE);
        }
    }

    // === Events & validation ===

    fn emit(&self, kind: TabsEventKind) {
        let event = TabsEvent::new(kind, self.schema.key.clone(), self.current_tab);
        if kind.affects_validation() && self.is_attached() {
            self.handle_tabs_validation();
        }
        self.listeners.notify(&event);
    }

    /// Set (or clear) a child's validation error and announce it
    pub fn set_component_error(&mut self, id: &str, error: Option<String>) -> bool {
        let Some(component) = self
            .tabs
            .iter_mut()
            .flat_map(|tab| tab.components.iter_mut())
            .find(|c| c.id() == id)
        else {
            return false;
        };
        component.set_error(error);
        self.emit(TabsEventKind::Error);
        true
    }

    /// Active positions holding at least one erroring child
    pub fn invalid_tabs(&self) -> Vec<usize> {
        self.tabs
            .iter()
            .enumerate()
            .filter(|(_, tab)| tab.has_error())
            .map(|(index, _)| index)
            .collect()
    }

    /// Re-mark tab links: clear every error marker, then mark the links of
    /// tabs with an erroring child
    pub fn handle_tabs_validation(&self) {
        let Some(links) = self.refs.as_ref().map(|refs| &refs.links) else {
            return;
        };
        if links.is_empty() || self.tabs.is_empty() {
            return;
        }

        self.clear_error_classes(links);

        let invalid = self.invalid_tabs();
        if invalid.is_empty() {
            return;
        }
        let marked: Vec<&ElementRef> = links
            .iter()
            .enumerate()
            .filter(|(index, _)| invalid.contains(index))
            .map(|(_, link)| link)
            .collect();
        self.set_error_classes(&marked);

        tracing::debug!(tabs_key = %self.schema.key, invalid = ?invalid, "Marked invalid tabs");
    }

    fn set_error_classes(&self, elements: &[&ElementRef]) {
        for element in elements {
            element.add_class(INVALID);
            if element.attribute("ref").as_deref() != Some("openModal") {
                if self.options.highlight_errors {
                    element.add_class(TAB_ERROR);
                } else {
                    element.add_class(HAS_ERROR);
                }
            }
        }
    }

    fn clear_error_classes(&self, elements: &[ElementRef]) {
        for element in elements {
            element.remove_class(INVALID);
            element.remove_class(TAB_ERROR);
            element.remove_class(HAS_ERROR);
        }
    }
}

impl std::fmt::Debug for TabsComponent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TabsComponent")
            .field("key", &self.schema.key)
            .field("active", &self.active)
            .field("current_tab", &self.current_tab)
            .field("attached", &self.is_attached())
            .finish()
    }
}
