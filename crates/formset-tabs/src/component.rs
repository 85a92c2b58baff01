//! Child components living inside a tab

use std::fmt;
use uuid::Uuid;

use formset_schema::ComponentSchema;

use crate::dom::ElementRef;
use crate::error::TabsError;
use crate::template::escape_html;
use crate::Result;

/// A live component instance built from a child schema
pub trait FormComponent: fmt::Debug {
    /// Instance identity; stays the same for as long as the instance lives
    fn id(&self) -> &str;

    fn schema(&self) -> &ComponentSchema;

    /// Current validation error, if any
    fn error(&self) -> Option<&str>;

    fn set_error(&mut self, error: Option<String>);

    /// Position of the owning tab in the active tab set
    fn tab(&self) -> Option<usize>;

    fn set_tab(&mut self, tab: usize);

    fn render(&self) -> String;

    fn attach(&mut self, element: ElementRef);

    fn detach(&mut self);

    fn is_attached(&self) -> bool;
}

/// Builds live components from child schemas
pub trait ComponentFactory {
    fn create(&self, schema: &ComponentSchema) -> Result<Box<dyn FormComponent>>;
}

/// Generic input field: holds its schema, error state and element
#[derive(Debug)]
pub struct FieldComponent {
    id: String,
    schema: ComponentSchema,
    error: Option<String>,
    tab: Option<usize>,
    element: Option<ElementRef>,
}

impl FieldComponent {
    pub fn new(schema: ComponentSchema) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            schema,
            error: None,
            tab: None,
            element: None,
        }
    }

    pub fn element(&self) -> Option<&ElementRef> {
        self.element.as_ref()
    }
}

impl FormComponent for FieldComponent {
    fn id(&self) -> &str {
        &self.id
    }

    fn schema(&self) -> &ComponentSchema {
        &self.schema
    }

    fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    fn set_error(&mut self, error: Option<String>) {
        self.error = error;
    }

    fn tab(&self) -> Option<usize> {
        self.tab
    }

    fn set_tab(&mut self, tab: usize) {
        self.tab = Some(tab);
    }

    fn render(&self) -> String {
        format!(
            r#"<div ref="component" class="formio-component formio-component-{} formio-component-{}"><label>{}</label></div>"#,
            escape_html(&self.schema.component_type),
            escape_html(&self.schema.key),
            escape_html(self.schema.display_label()),
        )
    }

    fn attach(&mut self, element: ElementRef) {
        self.element = Some(element);
    }

    fn detach(&mut self) {
        self.element = None;
    }

    fn is_attached(&self) -> bool {
        self.element.is_some()
    }
}

/// Turns every typed child schema into a [`FieldComponent`]
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultComponentFactory;

impl ComponentFactory for DefaultComponentFactory {
    fn create(&self, schema: &ComponentSchema) -> Result<Box<dyn FormComponent>> {
        if schema.component_type.trim().is_empty() {
            return Err(TabsError::Factory(format!(
                "component '{}' has no type",
                schema.key
            )));
        }
        Ok(Box::new(FieldComponent::new(schema.clone())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::VirtualElement;

    #[test]
    fn test_factory_creates_distinct_instances() {
        let factory = DefaultComponentFactory;
        let schema = ComponentSchema::new("textfield", "name");

        let a = factory.create(&schema).unwrap();
        let b = factory.create(&schema).unwrap();
        assert_ne!(a.id(), b.id());
        assert_eq!(a.schema().key, "name");
    }

    #[test]
    fn test_factory_rejects_untyped_schema() {
        let factory = DefaultComponentFactory;
        let result = factory.create(&ComponentSchema::new("", "broken"));
        assert!(matches!(result, Err(TabsError::Factory(_))));
    }

    #[test]
    fn test_field_lifecycle() {
        let mut field = FieldComponent::new(ComponentSchema::new("textfield", "email"));
        assert!(!field.is_attached());

        field.attach(VirtualElement::new("div").into_ref());
        assert!(field.is_attached());
        assert!(field.render().contains("formio-component-email"));

        field.set_error(Some("Required".to_string()));
        assert_eq!(field.error(), Some("Required"));

        field.detach();
        assert!(field.element().is_none());
    }
}
