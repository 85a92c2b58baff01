//! Child component definitions

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::conditional::Conditional;
use crate::is_false;

/// A field (or any non-tabs component) nested inside a tab item.
///
/// Only the properties the renderer reads are typed; everything else is
/// kept verbatim in `extra` so a schema survives a parse/serialize cycle.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ComponentSchema {
    #[serde(rename = "type", default)]
    pub component_type: String,
    #[serde(default)]
    pub key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub hidden: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub disabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conditional: Option<Conditional>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ComponentSchema {
    pub fn new(component_type: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            component_type: component_type.into(),
            key: key.into(),
            ..Self::default()
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Label to display, falling back to the key
    pub fn display_label(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.key)
    }
}
