//! Trigger/action logic rules
//!
//! A rule reads "when the trigger fires, run these actions". Rules can sit on
//! the tabs container itself or on a single tab item.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::conditional::Conditional;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogicRule {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub trigger: Trigger,
    #[serde(default)]
    pub actions: Vec<Action>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TriggerType {
    /// Fires when a simple conditional holds against the data
    Simple,
    /// Fires when a named event is emitted
    Event,
    /// Script triggers, not evaluated by this renderer
    Javascript,
    /// JSON-logic triggers, only evaluated by an external evaluator
    Json,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trigger {
    #[serde(rename = "type")]
    pub trigger_type: TriggerType,
    /// Event name for event triggers; may contain `{{ key }}` placeholders
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub simple: Option<Conditional>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub json: Option<Value>,
}

impl Trigger {
    pub fn simple(conditional: Conditional) -> Self {
        Self {
            trigger_type: TriggerType::Simple,
            event: None,
            simple: Some(conditional),
            json: None,
        }
    }

    pub fn event(name: impl Into<String>) -> Self {
        Self {
            trigger_type: TriggerType::Event,
            event: Some(name.into()),
            simple: None,
            json: None,
        }
    }

    pub fn is_event(&self) -> bool {
        self.trigger_type == TriggerType::Event
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ActionType {
    /// Set a single schema property
    Property,
    /// Shallow-merge an object into the schema
    MergeComponentSchema,
    /// Data value actions; tabs carry no value so these never change a schema
    Value,
    CustomAction,
    #[serde(other)]
    Unknown,
}

/// The schema property a `property` action targets
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyRef {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Dotted path, e.g. `hidden` or `validate.required`
    pub value: String,
    /// `boolean` takes `state`, `string` takes `text`
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub property_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Action {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub action_type: ActionType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub property: Option<PropertyRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema_definition: Option<Map<String, Value>>,
}

impl Action {
    /// `property` action setting a boolean flag
    pub fn set_flag(path: impl Into<String>, state: bool) -> Self {
        Self {
            name: None,
            action_type: ActionType::Property,
            property: Some(PropertyRef {
                label: None,
                value: path.into(),
                property_type: Some("boolean".to_string()),
            }),
            state: Some(Value::Bool(state)),
            text: None,
            schema_definition: None,
        }
    }

    /// `property` action setting a string property
    pub fn set_text(path: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            name: None,
            action_type: ActionType::Property,
            property: Some(PropertyRef {
                label: None,
                value: path.into(),
                property_type: Some("string".to_string()),
            }),
            state: None,
            text: Some(text.into()),
            schema_definition: None,
        }
    }

    pub fn merge(definition: Map<String, Value>) -> Self {
        Self {
            name: None,
            action_type: ActionType::MergeComponentSchema,
            property: None,
            state: None,
            text: None,
            schema_definition: Some(definition),
        }
    }
}
