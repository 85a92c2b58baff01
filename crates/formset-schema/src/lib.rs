//! Formset Schema
//!
//! Typed form definitions consumed by the renderer:
//! - `tabs` containers and their tab items
//! - child component definitions
//! - conditionals and trigger/action logic rules
//!
//! Schemas are plain data. Tab items live behind `Arc` so the renderer can
//! tell a replaced definition from an untouched one by reference.

mod component;
mod conditional;
mod error;
mod node;
mod rule;
mod tabs;

pub use component::ComponentSchema;
pub use conditional::Conditional;
pub use error::SchemaError;
pub use node::{value_as_flag, SchemaNode};
pub use rule::{Action, ActionType, LogicRule, PropertyRef, Trigger, TriggerType};
pub use tabs::{TabItemSchema, TabsSchema};

pub type Result<T> = std::result::Result<T, SchemaError>;

pub(crate) fn is_false(value: &bool) -> bool {
    !*value
}
