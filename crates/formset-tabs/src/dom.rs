//! Element handles returned by DOM attachment
//!
//! The container never touches markup after rendering; it only toggles
//! classes and visibility on the handles the surface gives back.

use parking_lot::RwLock;
use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::sync::Arc;

pub trait DomElement: Send + Sync + fmt::Debug {
    fn add_class(&self, class: &str);
    fn remove_class(&self, class: &str);
    fn has_class(&self, class: &str) -> bool;
    fn set_visible(&self, visible: bool);
    fn is_visible(&self) -> bool;
    fn attribute(&self, name: &str) -> Option<String>;
}

pub type ElementRef = Arc<dyn DomElement>;

/// The three reference groups of a mounted tabs container, each indexed
/// like the active tab set
#[derive(Debug, Clone, Default)]
pub struct TabRefs {
    pub panels: Vec<ElementRef>,
    pub links: Vec<ElementRef>,
    pub link_containers: Vec<ElementRef>,
}

impl TabRefs {
    pub fn panel(&self, index: usize) -> Option<&ElementRef> {
        self.panels.get(index)
    }

    pub fn link(&self, index: usize) -> Option<&ElementRef> {
        self.links.get(index)
    }

    pub fn link_container(&self, index: usize) -> Option<&ElementRef> {
        self.link_containers.get(index)
    }
}

#[derive(Debug, Default)]
struct ElementState {
    classes: BTreeSet<String>,
    visible: bool,
    attributes: HashMap<String, String>,
}

/// In-memory element for headless rendering and tests
#[derive(Debug)]
pub struct VirtualElement {
    tag: String,
    state: RwLock<ElementState>,
}

impl VirtualElement {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            state: RwLock::new(ElementState {
                visible: true,
                ..ElementState::default()
            }),
        }
    }

    pub fn with_attribute(self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.state.write().attributes.insert(name.into(), value.into());
        self
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn classes(&self) -> Vec<String> {
        self.state.read().classes.iter().cloned().collect()
    }

    pub fn into_ref(self) -> ElementRef {
        Arc::new(self)
    }
}

impl DomElement for VirtualElement {
    fn add_class(&self, class: &str) {
        self.state.write().classes.insert(class.to_string());
    }

    fn remove_class(&self, class: &str) {
        self.state.write().classes.remove(class);
    }

    fn has_class(&self, class: &str) -> bool {
        self.state.read().classes.contains(class)
    }

    fn set_visible(&self, visible: bool) {
        self.state.write().visible = visible;
    }

    fn is_visible(&self) -> bool {
        self.state.read().visible
    }

    fn attribute(&self, name: &str) -> Option<String> {
        self.state.read().attributes.get(name).cloned()
    }
}
