//! Outbound component events and inbound event-trigger subscriptions

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use formset_schema::LogicRule;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TabsEventKind {
    /// Value or navigation changed
    Change,
    /// Validation state changed
    Error,
    /// The component asks to be drawn again
    Redraw,
}

impl TabsEventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TabsEventKind::Change => "change",
            TabsEventKind::Error => "error",
            TabsEventKind::Redraw => "redraw",
        }
    }

    /// Events after which tab links are re-marked for errors
    pub fn affects_validation(&self) -> bool {
        matches!(self, TabsEventKind::Change | TabsEventKind::Error)
    }
}

impl std::fmt::Display for TabsEventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TabsEvent {
    pub kind: TabsEventKind,
    /// Key of the emitting tabs component
    pub component_key: String,
    /// Current tab at the time of emission
    pub current_tab: usize,
    pub emitted_at: DateTime<Utc>,
}

impl TabsEvent {
    pub fn new(kind: TabsEventKind, component_key: impl Into<String>, current_tab: usize) -> Self {
        Self {
            kind,
            component_key: component_key.into(),
            current_tab,
            emitted_at: Utc::now(),
        }
    }
}

pub(crate) type Listener = Box<dyn Fn(&TabsEvent)>;

/// Observers of a component's outbound events
#[derive(Default)]
pub(crate) struct Listeners {
    listeners: Vec<Listener>,
}

impl Listeners {
    pub fn add(&mut self, listener: Listener) {
        self.listeners.push(listener);
    }

    pub fn notify(&self, event: &TabsEvent) {
        for listener in &self.listeners {
            listener(event);
        }
    }

    pub fn clear(&mut self) {
        self.listeners.clear();
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }
}

/// An event-trigger rule waiting for its event on one tab item
#[derive(Debug, Clone, PartialEq)]
pub struct EventSubscription {
    /// Resolved event name
    pub event: String,
    /// Position of the tab item in the declared list
    pub tab_index: usize,
    pub rule: LogicRule,
}

/// Observer lists keyed by event name
#[derive(Debug, Default)]
pub(crate) struct EventSubscriptions {
    by_event: HashMap<String, Vec<EventSubscription>>,
}

impl EventSubscriptions {
    pub fn subscribe(&mut self, subscription: EventSubscription) {
        self.by_event
            .entry(subscription.event.clone())
            .or_default()
            .push(subscription);
    }

    pub fn subscribers(&self, event: &str) -> &[EventSubscription] {
        self.by_event.get(event).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn events(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.by_event.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn clear(&mut self) {
        self.by_event.clear();
    }

    pub fn len(&self) -> usize {
        self.by_event.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.by_event.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use formset_schema::Trigger;
    use parking_lot::Mutex;
    use std::sync::Arc;

    fn subscription(event: &str, tab_index: usize) -> EventSubscription {
        EventSubscription {
            event: event.to_string(),
            tab_index,
            rule: LogicRule {
                name: None,
                trigger: Trigger::event(event),
                actions: Vec::new(),
            },
        }
    }

    #[test]
    fn test_subscriptions_by_event() {
        let mut subs = EventSubscriptions::default();
        subs.subscribe(subscription("lock", 0));
        subs.subscribe(subscription("lock", 2));
        subs.subscribe(subscription("unlock", 1));

        assert_eq!(subs.len(), 3);
        assert_eq!(subs.subscribers("lock").len(), 2);
        assert_eq!(subs.events(), vec!["lock", "unlock"]);
        assert!(subs.subscribers("other").is_empty());

        subs.clear();
        assert!(subs.is_empty());
    }

    #[test]
    fn test_listeners_notified() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let mut listeners = Listeners::default();
        let sink = Arc::clone(&seen);
        listeners.add(Box::new(move |event: &TabsEvent| sink.lock().push(event.kind)));

        listeners.notify(&TabsEvent::new(TabsEventKind::Change, "tabs", 0));
        listeners.notify(&TabsEvent::new(TabsEventKind::Redraw, "tabs", 0));

        assert_eq!(*seen.lock(), vec![TabsEventKind::Change, TabsEventKind::Redraw]);
        assert_eq!(listeners.len(), 1);
    }
}
