use std::collections::HashMap;
use std::rc::Rc;

use crate::Result;
use crate::dom::NodeId;
use crate::page::Page;

/// Event handlers are plain closures over the page and the in-flight event.
/// They run to completion on the calling thread; a returned error aborts the
/// dispatch that invoked them.
pub type Handler = Rc<dyn Fn(&mut Page, &mut EventState) -> Result<()>>;

/// Mutable state of one dispatched event, threaded through every listener on
/// the propagation path. Keyboard events additionally carry the pressed
/// key's identifier.
#[derive(Debug, Clone)]
pub struct EventState {
    event_type: String,
    target: NodeId,
    current_target: NodeId,
    default_prevented: bool,
    propagation_stopped: bool,
    key: Option<String>,
}

impl EventState {
    pub fn new(event_type: &str, target: NodeId) -> Self {
        Self {
            event_type: event_type.to_string(),
            target,
            current_target: target,
            default_prevented: false,
            propagation_stopped: false,
            key: None,
        }
    }

    pub fn with_key(mut self, key: &str) -> Self {
        self.key = Some(key.to_string());
        self
    }

    pub fn event_type(&self) -> &str {
        &self.event_type
    }

    pub fn target(&self) -> NodeId {
        self.target
    }

    pub fn current_target(&self) -> NodeId {
        self.current_target
    }

    pub(crate) fn set_current_target(&mut self, node: NodeId) {
        self.current_target = node;
    }

    pub fn prevent_default(&mut self) {
        self.default_prevented = true;
    }

    pub fn default_prevented(&self) -> bool {
        self.default_prevented
    }

    pub fn stop_propagation(&mut self) {
        self.propagation_stopped = true;
    }

    pub fn propagation_stopped(&self) -> bool {
        self.propagation_stopped
    }

    pub fn key(&self) -> Option<&str> {
        self.key.as_deref()
    }
}

#[derive(Clone)]
pub(crate) struct Listener {
    pub(crate) capture: bool,
    pub(crate) handler: Handler,
}

#[derive(Default, Clone)]
pub(crate) struct ListenerStore {
    map: HashMap<NodeId, HashMap<String, Vec<Listener>>>,
}

impl ListenerStore {
    pub(crate) fn add(&mut self, node_id: NodeId, event: &str, listener: Listener) {
        let listeners = self
            .map
            .entry(node_id)
            .or_default()
            .entry(event.to_string())
            .or_default();

        // Match browser semantics: dedupe only when the same callback
        // reference is re-registered for the same type/capture pair.
        if listeners.iter().any(|existing| {
            existing.capture == listener.capture
                && Rc::ptr_eq(&existing.handler, &listener.handler)
        }) {
            return;
        }

        listeners.push(listener);
    }

    pub(crate) fn remove(
        &mut self,
        node_id: NodeId,
        event: &str,
        capture: bool,
        handler: &Handler,
    ) -> bool {
        let Some(events) = self.map.get_mut(&node_id) else {
            return false;
        };
        let Some(listeners) = events.get_mut(event) else {
            return false;
        };

        if let Some(pos) = listeners
            .iter()
            .position(|listener| listener.capture == capture && Rc::ptr_eq(&listener.handler, handler))
        {
            listeners.remove(pos);
            if listeners.is_empty() {
                events.remove(event);
            }
            if events.is_empty() {
                self.map.remove(&node_id);
            }
            return true;
        }

        false
    }

    /// Snapshots the matching listeners so dispatch stays stable while a
    /// handler mutates the store.
    pub(crate) fn get(&self, node_id: NodeId, event: &str, capture: bool) -> Vec<Listener> {
        self.map
            .get(&node_id)
            .and_then(|events| events.get(event))
            .map(|listeners| {
                listeners
                    .iter()
                    .filter(|listener| listener.capture == capture)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }
}
