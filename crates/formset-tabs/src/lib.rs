//! Formset Tabs
//!
//! The `tabs` layout component. A tabs container keeps a live list of tab
//! instances in step with a schema that logic rules may rewrite at runtime:
//! - reconciliation rebuilds only the tabs whose definition was replaced
//! - logic passes mutate a scratch copy and swap it in only when it differs
//! - validation errors of child components are routed to their tab link

mod component;
mod container;
mod dom;
mod error;
mod events;
mod logic;
mod options;
mod reconciler;
mod state;
mod template;

pub use component::{ComponentFactory, DefaultComponentFactory, FieldComponent, FormComponent};
pub use container::TabsComponent;
pub use dom::{DomElement, ElementRef, TabRefs, VirtualElement};
pub use error::TabsError;
pub use events::{EventSubscription, TabsEvent, TabsEventKind};
pub use logic::TabLogicEngine;
pub use options::{ReusePolicy, TabsOptions};
pub use reconciler::{ReconcileEnv, ReconcileOutcome, TabInstance, TabReconciler};
pub use state::{SwitchRejection, TabSwitch};
pub use template::{RenderVariant, Surface, TabRefKeys, TabTemplateContext, VirtualSurface};

pub type Result<T> = std::result::Result<T, TabsError>;
