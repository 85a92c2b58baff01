//! Root form: submission data plus the component tree built from a definition

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde_json::{Map, Value};
use std::sync::Arc;

use formset_logic::{ConditionEvaluator, EvaluationContext, StandardEvaluator};
use formset_schema::{ComponentSchema, TabsSchema};
use formset_tabs::{
    ComponentFactory, DefaultComponentFactory, FormComponent, Surface, TabsComponent,
    VirtualElement, VirtualSurface,
};

use crate::config::Config;
use crate::error::CoreError;
use crate::Result;

/// A top-level entry of the form
#[derive(Debug)]
pub enum FormNode {
    Tabs(TabsComponent),
    Field(Box<dyn FormComponent>),
}

impl FormNode {
    pub fn key(&self) -> &str {
        match self {
            FormNode::Tabs(tabs) => tabs.key(),
            FormNode::Field(field) => &field.schema().key,
        }
    }

    fn render(&self) -> String {
        match self {
            FormNode::Tabs(tabs) => tabs.render(),
            FormNode::Field(field) => field.render(),
        }
    }
}

/// A rendered form
///
/// Every data change runs to completion: logic, reconciliation and redraw of
/// all tabs containers happen before [`Form::set_value`] returns.
pub struct Form {
    config: Config,
    /// Submission data, shared with hosts that read it
    data: Arc<RwLock<Value>>,
    /// The form definition as loaded
    definition: Value,
    nodes: Vec<FormNode>,
    evaluator: Arc<dyn ConditionEvaluator>,
    factory: Arc<dyn ComponentFactory>,
    surface: Arc<dyn Surface>,
    attached: bool,
    last_change: Option<DateTime<Utc>>,
}

impl Form {
    /// Parse `{ "components": [...] }` with the default collaborators
    pub fn from_json(form_json: &str, config: Config) -> Result<Self> {
        Self::with_collaborators(
            serde_json::from_str(form_json)?,
            config,
            Arc::new(StandardEvaluator),
            Arc::new(DefaultComponentFactory),
            Arc::new(VirtualSurface::new()),
        )
    }

    pub fn with_collaborators(
        definition: Value,
        config: Config,
        evaluator: Arc<dyn ConditionEvaluator>,
        factory: Arc<dyn ComponentFactory>,
        surface: Arc<dyn Surface>,
    ) -> Result<Self> {
        config.validate()?;

        let entries = definition
            .get("components")
            .and_then(Value::as_array)
            .ok_or_else(|| CoreError::InvalidForm("missing components array".to_string()))?;

        let mut nodes = Vec::with_capacity(entries.len());
        for entry in entries {
            let node = if entry.get("type").and_then(Value::as_str) == Some("tabs") {
                FormNode::Tabs(TabsComponent::new(
                    TabsSchema::from_value(entry.clone())?,
                    config.tabs_options(),
                    Arc::clone(&evaluator),
                    Arc::clone(&factory),
                    Arc::clone(&surface),
                ))
            } else {
                let schema: ComponentSchema = serde_json::from_value(entry.clone())?;
                FormNode::Field(factory.create(&schema)?)
            };
            nodes.push(node);
        }

        let data = definition
            .get("data")
            .filter(|data| data.is_object())
            .cloned()
            .unwrap_or_else(|| Value::Object(Map::new()));

        tracing::info!(components = nodes.len(), "Form loaded");

        Ok(Self {
            config,
            data: Arc::new(RwLock::new(data)),
            definition,
            nodes,
            evaluator,
            factory,
            surface,
            attached: false,
            last_change: None,
        })
    }

    // === Accessors ===

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Snapshot of the submission data
    pub fn data(&self) -> Value {
        self.data.read().clone()
    }

    pub fn data_handle(&self) -> Arc<RwLock<Value>> {
        Arc::clone(&self.data)
    }

    pub fn nodes(&self) -> &[FormNode] {
        &self.nodes
    }

    pub fn tabs(&self, key: &str) -> Option<&TabsComponent> {
        self.nodes.iter().find_map(|node| match node {
            FormNode::Tabs(tabs) if tabs.key() == key => Some(tabs),
            _ => None,
        })
    }

    pub fn tabs_mut(&mut self, key: &str) -> Option<&mut TabsComponent> {
        self.nodes.iter_mut().find_map(|node| match node {
            FormNode::Tabs(tabs) if tabs.key() == key => Some(tabs),
            _ => None,
        })
    }

    pub fn is_attached(&self) -> bool {
        self.attached
    }

    pub fn last_change(&self) -> Option<DateTime<Utc>> {
        self.last_change
    }

    pub fn evaluator(&self) -> &Arc<dyn ConditionEvaluator> {
        &self.evaluator
    }

    pub fn factory(&self) -> &Arc<dyn ComponentFactory> {
        &self.factory
    }

    pub fn surface(&self) -> &Arc<dyn Surface> {
        &self.surface
    }

    /// The definition with every tabs container replaced by its current schema
    pub fn schema(&self) -> Result<Value> {
        let mut definition = self.definition.clone();
        if let Some(entries) = definition
            .get_mut("components")
            .and_then(Value::as_array_mut)
        {
            for (entry, node) in entries.iter_mut().zip(&self.nodes) {
                if let FormNode::Tabs(tabs) = node {
                    *entry = serde_json::to_value(tabs.schema())?;
                }
            }
        }
        Ok(definition)
    }

    // === Lifecycle ===

    /// Build every tabs container and run the first data pass
    pub fn init(&mut self) -> Result<()> {
        let data = self.data();
        let ctx = EvaluationContext::new(&data).with_form(&self.definition);

        for node in &mut self.nodes {
            if let FormNode::Tabs(tabs) = node {
                tabs.init(&ctx)?;
                tabs.apply_logic(&ctx)?;
                tabs.check_conditions(&ctx)?;
            }
        }
        Ok(())
    }

    pub fn render(&self) -> String {
        let body: String = self.nodes.iter().map(FormNode::render).collect();
        format!(r#"<div class="formio-form">{}</div>"#, body)
    }

    /// Mount every component through the surface
    pub fn attach(&mut self) -> Result<()> {
        let data = self.data();
        let ctx = EvaluationContext::new(&data).with_form(&self.definition);

        for node in &mut self.nodes {
            match node {
                FormNode::Tabs(tabs) => tabs.mount(&ctx)?,
                FormNode::Field(field) => field.attach(
                    VirtualElement::new("div")
                        .with_attribute("ref", "component")
                        .into_ref(),
                ),
            }
        }
        self.attached = true;
        tracing::info!(components = self.nodes.len(), "Form attached");
        Ok(())
    }

    pub fn detach(&mut self) {
        for node in &mut self.nodes {
            match node {
                FormNode::Tabs(tabs) => tabs.detach(),
                FormNode::Field(field) => field.detach(),
            }
        }
        if self.attached {
            self.attached = false;
            tracing::info!("Form detached");
        }
    }

    pub fn destroy(&mut self) {
        self.detach();
        for node in &mut self.nodes {
            if let FormNode::Tabs(tabs) = node {
                tabs.destroy();
            }
        }
    }

    // === Data ===

    /// Write a top-level value and run the data pass.
    ///
    /// Returns `true` if any tabs container changed.
    pub fn set_value(&mut self, key: &str, value: Value) -> Result<bool> {
        {
            let mut data = self.data.write();
            if !data.is_object() {
                *data = Value::Object(Map::new());
            }
            if let Some(object) = data.as_object_mut() {
                object.insert(key.to_string(), value);
            }
        }
        self.last_change = Some(Utc::now());
        tracing::debug!(key, "Form value changed");

        self.on_change()
    }

    /// Replace the whole submission and run the data pass
    pub fn set_data(&mut self, data: Value) -> Result<bool> {
        if !data.is_object() {
            return Err(CoreError::InvalidForm(
                "submission data must be an object".to_string(),
            ));
        }
        *self.data.write() = data;
        self.last_change = Some(Utc::now());

        self.on_change()
    }

    fn on_change(&mut self) -> Result<bool> {
        let data = self.data();
        let ctx = EvaluationContext::new(&data).with_form(&self.definition);

        let mut changed = false;
        for node in &mut self.nodes {
            if let FormNode::Tabs(tabs) = node {
                let logic = tabs.apply_logic(&ctx)?;
                let conditions = tabs.check_conditions(&ctx)?;
                changed |= logic || conditions;
            }
        }
        Ok(changed)
    }

    // === Events ===

    /// Deliver a named event to the event-triggered rules of every tabs
    /// container. Returns `true` if any of them redrew.
    pub fn emit(&mut self, event: &str, args: &[Value]) -> Result<bool> {
        let data = self.data();
        let ctx = EvaluationContext::new(&data).with_form(&self.definition);

        let mut redrawn = false;
        for node in &mut self.nodes {
            if let FormNode::Tabs(tabs) = node {
                redrawn |= tabs.handle_event(event, args, &ctx)?;
            }
        }
        tracing::debug!(event, redrawn, "Form event delivered");
        Ok(redrawn)
    }

    /// Set or clear the validation error of component `id`, wherever it lives
    pub fn set_component_error(&mut self, id: &str, error: Option<String>) -> bool {
        for node in &mut self.nodes {
            match node {
                FormNode::Tabs(tabs) => {
                    if tabs.set_component_error(id, error.clone()) {
                        return true;
                    }
                }
                FormNode::Field(field) if field.id() == id => {
                    field.set_error(error);
                    return true;
                }
                FormNode::Field(_) => {}
            }
        }
        false
    }
}

impl std::fmt::Debug for Form {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Form")
            .field("config", &self.config)
            .field("nodes", &self.nodes)
            .field("attached", &self.attached)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use formset_tabs::{TabSwitch, TabsEventKind};
    use serde_json::json;

    const FORM: &str = r#"{
        "components": [
            {"type": "textfield", "key": "name", "label": "Name"},
            {
                "type": "tabs",
                "key": "details",
                "components": [
                    {
                        "label": "General",
                        "key": "general",
                        "components": [{"type": "textfield", "key": "email"}]
                    },
                    {
                        "label": "Company",
                        "key": "company",
                        "components": [{"type": "textfield", "key": "vat"}],
                        "conditional": {"show": true, "when": "kind", "eq": "business"}
                    },
                    {
                        "label": "Notes",
                        "key": "notes",
                        "components": [{"type": "textarea", "key": "notes"}],
                        "logic": [
                            {
                                "name": "lock notes",
                                "trigger": {
                                    "type": "simple",
                                    "simple": {"show": true, "when": "locked", "eq": true}
                                },
                                "actions": [
                                    {
                                        "name": "disable",
                                        "type": "property",
                                        "property": {"label": "Disabled", "value": "disabled", "type": "boolean"},
                                        "state": true
                                    }
                                ]
                            },
                            {
                                "name": "rename",
                                "trigger": {"type": "event", "event": "{{ key }}-rename"},
                                "actions": [
                                    {
                                        "name": "relabel",
                                        "type": "property",
                                        "property": {"label": "Label", "value": "label", "type": "string"},
                                        "text": "Remarks"
                                    }
                                ]
                            }
                        ]
                    }
                ]
            }
        ]
    }"#;

    fn form() -> Form {
        let mut form = Form::from_json(FORM, Config::default()).unwrap();
        form.init().unwrap();
        form
    }

    fn active_keys(form: &Form) -> Vec<String> {
        form.tabs("details")
            .unwrap()
            .tabs()
            .iter()
            .map(|tab| tab.schema.key.clone())
            .collect()
    }

    #[test]
    fn test_form_loads_nodes() {
        let form = form();
        assert_eq!(form.nodes().len(), 2);
        assert_eq!(form.nodes()[0].key(), "name");
        assert_eq!(active_keys(&form), vec!["general", "notes"]);
        assert!(form.data().as_object().is_some_and(|data| data.is_empty()));
    }

    #[test]
    fn test_form_rejects_definition_without_components() {
        let result = Form::from_json(r#"{"title": "empty"}"#, Config::default());
        assert!(matches!(result, Err(CoreError::InvalidForm(_))));

        let result = Form::from_json(r#"{"components": [{"key": "x"}]}"#, Config::default());
        assert!(matches!(result, Err(CoreError::Tabs(_))));
    }

    #[test]
    fn test_set_value_shows_conditional_tab() {
        let mut form = form();
        form.attach().unwrap();
        let email_id = form.tabs("details").unwrap().tabs()[0].components[0]
            .id()
            .to_string();

        assert!(form.set_value("kind", json!("business")).unwrap());
        assert_eq!(active_keys(&form), vec!["general", "company", "notes"]);
        assert!(form.last_change().is_some());

        let details = form.tabs("details").unwrap();
        assert_eq!(details.tabs()[0].components[0].id(), email_id);
        assert_eq!(details.refs().map(|refs| refs.panels.len()), Some(3));

        assert!(!form.set_value("unrelated", json!(1)).unwrap());
    }

    #[test]
    fn test_set_value_runs_logic() {
        let mut form = form();
        form.attach().unwrap();

        assert!(form.set_value("locked", json!(true)).unwrap());
        let details = form.tabs_mut("details").unwrap();
        assert!(details.tabs()[1].schema.disabled);
        assert!(matches!(details.set_tab(1), TabSwitch::Rejected(_)));

        assert!(form.set_value("locked", json!(false)).unwrap());
        let details = form.tabs_mut("details").unwrap();
        assert!(details.set_tab(1).is_switched());
    }

    #[test]
    fn test_emit_reaches_event_rules() {
        let mut form = form();
        assert!(!form.emit("details-rename", &[]).unwrap());

        form.attach().unwrap();
        let seen = Arc::new(parking_lot::Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        form.tabs_mut("details")
            .unwrap()
            .on_event(move |event| sink.lock().push(event.kind));

        assert!(form.emit("details-rename", &[json!("now")]).unwrap());
        assert_eq!(form.tabs("details").unwrap().tabs()[1].schema.label, "Remarks");
        assert!(seen.lock().contains(&TabsEventKind::Redraw));

        let schema = form.schema().unwrap();
        assert_eq!(schema["components"][1]["components"][2]["label"], "Remarks");
    }

    #[test]
    fn test_render_and_errors() {
        let mut form = form();
        let html = form.render();
        assert!(html.starts_with(r#"<div class="formio-form">"#));
        assert!(html.contains("formio-component-name"));
        assert!(html.contains("tab-details"));

        form.attach().unwrap();
        let email_id = form.tabs("details").unwrap().tabs()[0].components[0]
            .id()
            .to_string();
        assert!(form.set_component_error(&email_id, Some("Required".to_string())));
        assert_eq!(form.tabs("details").unwrap().invalid_tabs(), vec![0]);
        assert!(!form.set_component_error("missing", None));

        form.destroy();
        assert!(!form.is_attached());
        assert!(form.tabs("details").unwrap().tabs().is_empty());
    }

    #[test]
    fn test_builder_mode_shows_every_tab() {
        let config = Config {
            builder_mode: true,
            ..Config::default()
        };
        let mut form = Form::from_json(FORM, config).unwrap();
        form.init().unwrap();
        assert_eq!(active_keys(&form), vec!["general", "company", "notes"]);
        assert!(!form.set_value("locked", json!(true)).unwrap());
    }

    #[test]
    fn test_set_data_requires_object() {
        let mut form = form();
        assert!(form.set_data(json!([1, 2])).is_err());
        assert!(form.set_data(json!({"kind": "business"})).unwrap());
        assert_eq!(form.data()["kind"], "business");
    }
}
