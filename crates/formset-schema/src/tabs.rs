//! Tabs container and tab item definitions

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::sync::Arc;

use crate::component::ComponentSchema;
use crate::conditional::Conditional;
use crate::error::SchemaError;
use crate::is_false;
use crate::node::{property_of, set_property_of, SchemaNode};
use crate::rule::LogicRule;
use crate::Result;

/// One declared tab: a label, a key and the components shown inside it
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TabItemSchema {
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub key: String,
    #[serde(default)]
    pub components: Vec<ComponentSchema>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conditional: Option<Conditional>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub logic: Vec<LogicRule>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub hidden: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub disabled: bool,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl TabItemSchema {
    pub fn new(label: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            key: key.into(),
            ..Self::default()
        }
    }

    pub fn with_components(mut self, components: Vec<ComponentSchema>) -> Self {
        self.components = components;
        self
    }

    pub fn with_conditional(mut self, conditional: Conditional) -> Self {
        self.conditional = Some(conditional);
        self
    }

    pub fn with_logic(mut self, logic: Vec<LogicRule>) -> Self {
        self.logic = logic;
        self
    }

    pub fn has_logic(&self) -> bool {
        !self.logic.is_empty()
    }
}

impl SchemaNode for TabItemSchema {
    fn property(&self, path: &str) -> Option<Value> {
        property_of(self, path)
    }

    fn set_property(&mut self, path: &str, value: Value) -> Result<bool> {
        set_property_of(self, path, value)
    }
}

/// The `tabs` layout component.
///
/// Missing properties fall back to the defaults of a freshly dropped tabs
/// component, including its single empty "Tab 1".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TabsSchema {
    #[serde(rename = "type")]
    pub component_type: String,
    pub key: String,
    pub label: String,
    pub input: bool,
    pub persistent: bool,
    pub table_view: bool,
    /// Declared tab items; display order is array order
    pub components: Vec<Arc<TabItemSchema>>,
    pub vertical_layout: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub logic: Vec<LogicRule>,
    #[serde(skip_serializing_if = "is_false")]
    pub hidden: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub disabled: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub modal_edit: bool,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Default for TabsSchema {
    fn default() -> Self {
        Self {
            component_type: "tabs".to_string(),
            key: "tabs".to_string(),
            label: "Tabs".to_string(),
            input: false,
            persistent: false,
            table_view: false,
            components: vec![Arc::new(TabItemSchema::new("Tab 1", "tab1"))],
            vertical_layout: false,
            logic: Vec::new(),
            hidden: false,
            disabled: false,
            modal_edit: false,
            extra: Map::new(),
        }
    }
}

impl TabsSchema {
    pub fn new(key: impl Into<String>, tabs: Vec<TabItemSchema>) -> Self {
        Self {
            key: key.into(),
            components: tabs.into_iter().map(Arc::new).collect(),
            ..Self::default()
        }
    }

    /// Parse a tabs component out of a form definition fragment
    pub fn from_value(value: Value) -> Result<Self> {
        let schema: TabsSchema = serde_json::from_value(value)?;
        if schema.component_type != "tabs" {
            return Err(SchemaError::NotTabs(schema.component_type));
        }
        Ok(schema)
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        Self::from_value(serde_json::from_str(json)?)
    }

    /// Whether the container or any declared tab item carries logic rules
    pub fn has_logic(&self) -> bool {
        !self.logic.is_empty() || self.components.iter().any(|tab| tab.has_logic())
    }

    /// Clone down to the tab items, so the copy shares no tab references
    pub fn deep_clone(&self) -> Self {
        Self {
            components: self
                .components
                .iter()
                .map(|tab| Arc::new(TabItemSchema::clone(tab)))
                .collect(),
            ..self.clone()
        }
    }

    /// Position of a tab item by reference
    pub fn position_of(&self, tab: &Arc<TabItemSchema>) -> Option<usize> {
        self.components.iter().position(|t| Arc::ptr_eq(t, tab))
    }
}

impl SchemaNode for TabsSchema {
    fn property(&self, path: &str) -> Option<Value> {
        property_of(self, path)
    }

    fn set_property(&mut self, path: &str, value: Value) -> Result<bool> {
        set_property_of(self, path, value)
    }
}
