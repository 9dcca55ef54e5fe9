use std::collections::HashMap;

use crate::dom::{Dom, NodeId, NodeType};
use crate::events::{EventState, Handler, Listener, ListenerStore};
use crate::{Error, Result};

const DEFAULT_CONSOLE_LOG_LIMIT: usize = 10_000;

/// One page: an element tree, its listeners, and a captured console stream.
///
/// Elements are created programmatically under [`Page::body`]. Driver
/// methods (`click`, `submit`, `press_key`) address elements by id, run the
/// full dispatch synchronously, and return the final [`EventState`] so
/// callers can observe `default_prevented`.
pub struct Page {
    dom: Dom,
    listeners: ListenerStore,
    console_logs: Vec<String>,
    console_log_limit: usize,
    trace_events: bool,
}

impl Page {
    pub fn new() -> Self {
        Self {
            dom: Dom::new(),
            listeners: ListenerStore::default(),
            console_logs: Vec::new(),
            console_log_limit: DEFAULT_CONSOLE_LOG_LIMIT,
            trace_events: false,
        }
    }

    pub fn body(&self) -> NodeId {
        self.dom.body()
    }

    pub fn append_element(
        &mut self,
        parent: NodeId,
        tag_name: &str,
        attrs: &[(&str, &str)],
    ) -> Result<NodeId> {
        let attrs: HashMap<String, String> = attrs
            .iter()
            .map(|(name, value)| (name.to_string(), value.to_string()))
            .collect();
        self.dom.create_element(parent, tag_name, attrs)
    }

    pub fn append_to_body(&mut self, tag_name: &str, attrs: &[(&str, &str)]) -> Result<NodeId> {
        let body = self.dom.body();
        self.append_element(body, tag_name, attrs)
    }

    pub fn append_text(&mut self, parent: NodeId, text: &str) -> Result<NodeId> {
        self.dom.create_text(parent, text)
    }

    pub fn element_by_id(&self, id: &str) -> Result<NodeId> {
        self.dom.by_id(id)
    }

    pub fn tag_name(&self, node: NodeId) -> Option<&str> {
        self.dom.tag_name(node)
    }

    pub fn attr(&self, node: NodeId, name: &str) -> Option<String> {
        self.dom.attr(node, name)
    }

    pub fn set_attr(&mut self, node: NodeId, name: &str, value: &str) -> Result<()> {
        self.dom.set_attr(node, name, value)
    }

    pub fn has_class(&self, node: NodeId, name: &str) -> bool {
        self.dom.has_class(node, name)
    }

    pub fn add_class(&mut self, node: NodeId, name: &str) -> Result<()> {
        self.dom.add_class(node, name)
    }

    pub fn remove_class(&mut self, node: NodeId, name: &str) -> Result<()> {
        self.dom.remove_class(node, name)
    }

    pub fn style(&self, node: NodeId, property: &str) -> Result<String> {
        self.dom.style_get(node, property)
    }

    pub fn set_style(&mut self, node: NodeId, property: &str, value: &str) -> Result<()> {
        self.dom.style_set(node, property, value)
    }

    /// Concatenated text of the node's direct text children.
    pub fn text_content(&self, node: NodeId) -> String {
        let mut out = String::new();
        for child in self.dom.children(node) {
            if let NodeType::Text(text) = &self.dom.node(*child).node_type {
                out.push_str(text);
            }
        }
        out
    }

    pub fn hide(&mut self, node: NodeId) -> Result<()> {
        self.dom.style_set(node, "display", "none")
    }

    pub fn show(&mut self, node: NodeId) -> Result<()> {
        self.dom.style_set(node, "display", "")
    }

    /// An element is visible unless it or any ancestor carries
    /// `display: none`.
    pub fn is_visible(&self, node: NodeId) -> Result<bool> {
        if self.dom.element(node).is_none() {
            return Err(Error::PageRuntime(
                "visibility target is not an element".into(),
            ));
        }
        let mut cursor = Some(node);
        while let Some(current) = cursor {
            if self.dom.element(current).is_some()
                && self.dom.style_get(current, "display")? == "none"
            {
                return Ok(false);
            }
            cursor = self.dom.parent(current);
        }
        Ok(true)
    }

    pub fn add_event_listener(
        &mut self,
        node: NodeId,
        event_type: &str,
        capture: bool,
        handler: Handler,
    ) {
        self.listeners.add(node, event_type, Listener { capture, handler });
    }

    pub fn remove_event_listener(
        &mut self,
        node: NodeId,
        event_type: &str,
        capture: bool,
        handler: &Handler,
    ) -> bool {
        self.listeners.remove(node, event_type, capture, handler)
    }

    pub fn dispatch_event(&mut self, target: NodeId, event_type: &str) -> Result<EventState> {
        self.run_dispatch(EventState::new(event_type, target))
    }

    pub fn dispatch_key_event(
        &mut self,
        target: NodeId,
        event_type: &str,
        key: &str,
    ) -> Result<EventState> {
        self.run_dispatch(EventState::new(event_type, target).with_key(key))
    }

    /// Clicks an element. A click whose default was not prevented and that
    /// lands on a submit control re-dispatches `submit` on the enclosing
    /// form, the way a browser would.
    pub fn click(&mut self, id: &str) -> Result<EventState> {
        let target = self.element_by_id(id)?;
        if self.attr(target, "disabled").is_some() {
            return Ok(EventState::new("click", target));
        }

        let outcome = self.dispatch_event(target, "click")?;
        if outcome.default_prevented() {
            return Ok(outcome);
        }

        if self.is_submit_control(target) {
            if let Some(form) = self.enclosing_form(target) {
                self.dispatch_event(form, "submit")?;
            }
        }

        Ok(outcome)
    }

    /// Dispatches `submit` on the form with the given id, or on the form
    /// enclosing the given element.
    pub fn submit(&mut self, id: &str) -> Result<EventState> {
        let target = self.element_by_id(id)?;
        let form = if self
            .tag_name(target)
            .is_some_and(|tag| tag.eq_ignore_ascii_case("form"))
        {
            Some(target)
        } else {
            self.enclosing_form(target)
        };

        let Some(form) = form else {
            return Err(Error::TagMismatch {
                id: id.to_string(),
                expected: "form".to_string(),
                actual: self.tag_name(target).unwrap_or_default().to_string(),
            });
        };

        self.dispatch_event(form, "submit")
    }

    pub fn key_down(&mut self, id: &str, key: &str) -> Result<EventState> {
        let target = self.element_by_id(id)?;
        self.dispatch_key_event(target, "keydown", key)
    }

    pub fn key_press(&mut self, id: &str, key: &str) -> Result<EventState> {
        let target = self.element_by_id(id)?;
        self.dispatch_key_event(target, "keypress", key)
    }

    pub fn key_up(&mut self, id: &str, key: &str) -> Result<EventState> {
        let target = self.element_by_id(id)?;
        self.dispatch_key_event(target, "keyup", key)
    }

    /// One full key stroke: keydown, keypress, keyup.
    pub fn press_key(&mut self, id: &str, key: &str) -> Result<()> {
        self.key_down(id, key)?;
        self.key_press(id, key)?;
        self.key_up(id, key)?;
        Ok(())
    }

    pub fn assert_exists(&self, id: &str) -> Result<()> {
        self.element_by_id(id).map(|_| ())
    }

    pub fn assert_visible(&self, id: &str) -> Result<()> {
        let node = self.element_by_id(id)?;
        if self.is_visible(node)? {
            Ok(())
        } else {
            Err(Error::AssertionFailed {
                id: id.to_string(),
                expected: "visible".to_string(),
                actual: "hidden".to_string(),
            })
        }
    }

    pub fn assert_hidden(&self, id: &str) -> Result<()> {
        let node = self.element_by_id(id)?;
        if self.is_visible(node)? {
            Err(Error::AssertionFailed {
                id: id.to_string(),
                expected: "hidden".to_string(),
                actual: "visible".to_string(),
            })
        } else {
            Ok(())
        }
    }

    pub fn console_log(&mut self, line: impl Into<String>) {
        self.console_logs.push(line.into());
        while self.console_logs.len() > self.console_log_limit {
            self.console_logs.remove(0);
        }
    }

    pub fn take_console_logs(&mut self) -> Vec<String> {
        std::mem::take(&mut self.console_logs)
    }

    pub fn set_console_log_limit(&mut self, max_entries: usize) -> Result<()> {
        if max_entries == 0 {
            return Err(Error::PageRuntime(
                "set_console_log_limit requires at least 1 entry".into(),
            ));
        }
        self.console_log_limit = max_entries;
        while self.console_logs.len() > self.console_log_limit {
            self.console_logs.remove(0);
        }
        Ok(())
    }

    /// Mirrors dispatch outcomes into the console stream as `[event]` lines.
    pub fn enable_trace(&mut self, enabled: bool) {
        self.trace_events = enabled;
    }

    fn run_dispatch(&mut self, mut event: EventState) -> Result<EventState> {
        let target = event.target();

        let mut path = Vec::new();
        let mut cursor = Some(target);
        while let Some(node) = cursor {
            path.push(node);
            cursor = self.dom.parent(node);
        }
        path.reverse();

        // Capture phase toward the target.
        if path.len() >= 2 {
            for node in &path[..path.len() - 1] {
                event.set_current_target(*node);
                self.invoke_listeners(*node, &mut event, true)?;
                if event.propagation_stopped() {
                    self.trace_event(&event, "propagation_stopped");
                    return Ok(event);
                }
            }
        }

        // Target phase: capture listeners first, then bubble listeners.
        event.set_current_target(target);
        self.invoke_listeners(target, &mut event, true)?;
        if event.propagation_stopped() {
            self.trace_event(&event, "propagation_stopped");
            return Ok(event);
        }
        self.invoke_listeners(target, &mut event, false)?;
        if event.propagation_stopped() {
            self.trace_event(&event, "propagation_stopped");
            return Ok(event);
        }

        // Bubble phase back toward the root.
        if path.len() >= 2 {
            for node in path[..path.len() - 1].iter().rev() {
                event.set_current_target(*node);
                self.invoke_listeners(*node, &mut event, false)?;
                if event.propagation_stopped() {
                    self.trace_event(&event, "propagation_stopped");
                    return Ok(event);
                }
            }
        }

        self.trace_event(&event, "completed");
        Ok(event)
    }

    fn invoke_listeners(
        &mut self,
        node: NodeId,
        event: &mut EventState,
        capture: bool,
    ) -> Result<()> {
        let listeners = self.listeners.get(node, event.event_type(), capture);
        for listener in listeners {
            (listener.handler.as_ref())(self, event)?;
        }
        Ok(())
    }

    fn is_submit_control(&self, node: NodeId) -> bool {
        match self.tag_name(node) {
            Some(tag) if tag.eq_ignore_ascii_case("button") => !self
                .attr(node, "type")
                .is_some_and(|t| t.eq_ignore_ascii_case("button") || t.eq_ignore_ascii_case("reset")),
            Some(tag) if tag.eq_ignore_ascii_case("input") => self
                .attr(node, "type")
                .is_some_and(|t| t.eq_ignore_ascii_case("submit")),
            _ => false,
        }
    }

    fn enclosing_form(&self, node: NodeId) -> Option<NodeId> {
        let mut cursor = self.dom.parent(node);
        while let Some(current) = cursor {
            if self
                .tag_name(current)
                .is_some_and(|tag| tag.eq_ignore_ascii_case("form"))
            {
                return Some(current);
            }
            cursor = self.dom.parent(current);
        }
        None
    }

    fn node_label(&self, node: NodeId) -> String {
        if let Some(id) = self.attr(node, "id") {
            return format!("#{id}");
        }
        match self.tag_name(node) {
            Some(tag) => format!("<{tag}>"),
            None => "#document".to_string(),
        }
    }

    fn trace_event(&mut self, event: &EventState, outcome: &str) {
        if !self.trace_events {
            return;
        }
        let line = format!(
            "[event] done {} target={} outcome={} default_prevented={}",
            event.event_type(),
            self.node_label(event.target()),
            outcome,
            event.default_prevented(),
        );
        self.console_log(line);
    }
}

impl Default for Page {
    fn default() -> Self {
        Self::new()
    }
}
