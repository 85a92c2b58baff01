//! Formset Core
//!
//! Root of a rendered form: owns the submission data and drives every tabs
//! container through logic, reconciliation and redraw after each change.

mod config;
mod error;
mod form;

pub use config::Config;
pub use error::CoreError;
pub use form::{Form, FormNode};

// Re-export the component stack
pub use formset_logic::{ConditionEvaluator, EvaluationContext, StandardEvaluator};
pub use formset_schema::{ComponentSchema, SchemaError, TabItemSchema, TabsSchema};
pub use formset_tabs::{
    ComponentFactory, DefaultComponentFactory, FormComponent, ReusePolicy, Surface, TabSwitch,
    TabsComponent, TabsError, TabsEvent, TabsEventKind, TabsOptions, VirtualSurface,
};

pub type Result<T> = std::result::Result<T, CoreError>;

/// Initialize logging
pub fn init_logging() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    fmt().with_env_filter(filter).with_target(true).init();
}
