use std::collections::HashMap;

use crate::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub(crate) usize);

#[derive(Debug, Clone)]
pub(crate) enum NodeType {
    Document,
    Element(Element),
    Text(String),
}

#[derive(Debug, Clone)]
pub(crate) struct Node {
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    pub(crate) node_type: NodeType,
}

#[derive(Debug, Clone)]
pub(crate) struct Element {
    pub(crate) tag_name: String,
    pub(crate) attrs: HashMap<String, String>,
}

/// Arena-allocated element tree. Node ids index into `nodes` and are never
/// reused; `id_index` always mirrors the `id` attributes present in the tree.
#[derive(Debug, Clone)]
pub(crate) struct Dom {
    nodes: Vec<Node>,
    root: NodeId,
    body: NodeId,
    id_index: HashMap<String, NodeId>,
}

impl Dom {
    pub(crate) fn new() -> Self {
        let root = Node {
            parent: None,
            children: Vec::new(),
            node_type: NodeType::Document,
        };
        let mut dom = Self {
            nodes: vec![root],
            root: NodeId(0),
            body: NodeId(0),
            id_index: HashMap::new(),
        };
        let body = dom.create_node(
            Some(dom.root),
            NodeType::Element(Element {
                tag_name: "body".to_string(),
                attrs: HashMap::new(),
            }),
        );
        dom.body = body;
        dom
    }

    pub(crate) fn body(&self) -> NodeId {
        self.body
    }

    fn create_node(&mut self, parent: Option<NodeId>, node_type: NodeType) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            parent,
            children: Vec::new(),
            node_type,
        });
        if let Some(parent_id) = parent {
            self.nodes[parent_id.0].children.push(id);
        }
        id
    }

    pub(crate) fn create_element(
        &mut self,
        parent: NodeId,
        tag_name: &str,
        attrs: HashMap<String, String>,
    ) -> Result<NodeId> {
        if self.element(parent).is_none() && !matches!(self.nodes[parent.0].node_type, NodeType::Document) {
            return Err(Error::PageRuntime(
                "element parent must be an element or the document".into(),
            ));
        }
        if let Some(id_attr) = attrs.get("id") {
            if self.id_index.contains_key(id_attr) {
                return Err(Error::DuplicateId(id_attr.clone()));
            }
        }
        let element = Element {
            tag_name: tag_name.to_string(),
            attrs,
        };
        let node = self.create_node(Some(parent), NodeType::Element(element));
        if let Some(id_attr) = self
            .element(node)
            .and_then(|element| element.attrs.get("id").cloned())
        {
            self.id_index.insert(id_attr, node);
        }
        Ok(node)
    }

    pub(crate) fn create_text(&mut self, parent: NodeId, text: &str) -> Result<NodeId> {
        if self.element(parent).is_none() {
            return Err(Error::PageRuntime("text parent is not an element".into()));
        }
        Ok(self.create_node(Some(parent), NodeType::Text(text.to_string())))
    }

    pub(crate) fn node(&self, node_id: NodeId) -> &Node {
        &self.nodes[node_id.0]
    }

    pub(crate) fn element(&self, node_id: NodeId) -> Option<&Element> {
        match &self.nodes[node_id.0].node_type {
            NodeType::Element(element) => Some(element),
            _ => None,
        }
    }

    fn element_mut(&mut self, node_id: NodeId) -> Option<&mut Element> {
        match &mut self.nodes[node_id.0].node_type {
            NodeType::Element(element) => Some(element),
            _ => None,
        }
    }

    pub(crate) fn tag_name(&self, node_id: NodeId) -> Option<&str> {
        self.element(node_id).map(|e| e.tag_name.as_str())
    }

    pub(crate) fn parent(&self, node_id: NodeId) -> Option<NodeId> {
        self.nodes[node_id.0].parent
    }

    pub(crate) fn children(&self, node_id: NodeId) -> &[NodeId] {
        &self.nodes[node_id.0].children
    }

    pub(crate) fn by_id(&self, id: &str) -> Result<NodeId> {
        self.id_index
            .get(id)
            .copied()
            .ok_or_else(|| Error::ElementNotFound(id.to_string()))
    }

    pub(crate) fn attr(&self, node_id: NodeId, name: &str) -> Option<String> {
        self.element(node_id)
            .and_then(|element| element.attrs.get(name).cloned())
    }

    pub(crate) fn set_attr(&mut self, node_id: NodeId, name: &str, value: &str) -> Result<()> {
        if self.element(node_id).is_none() {
            return Err(Error::PageRuntime(
                "attribute target is not an element".into(),
            ));
        }
        if name == "id" {
            if let Some(existing) = self.id_index.get(value) {
                if *existing != node_id {
                    return Err(Error::DuplicateId(value.to_string()));
                }
            }
            let old = self
                .element(node_id)
                .and_then(|element| element.attrs.get("id").cloned());
            if let Some(old) = old {
                self.id_index.remove(&old);
            }
            self.id_index.insert(value.to_string(), node_id);
        }
        if let Some(element) = self.element_mut(node_id) {
            element.attrs.insert(name.to_string(), value.to_string());
        }
        Ok(())
    }

    pub(crate) fn style_get(&self, node_id: NodeId, property: &str) -> Result<String> {
        let element = self
            .element(node_id)
            .ok_or_else(|| Error::PageRuntime("style target is not an element".into()))?;
        let decls = parse_style_declarations(element.attrs.get("style").map(String::as_str));
        Ok(decls
            .iter()
            .find(|(prop, _)| prop == property)
            .map(|(_, value)| value.clone())
            .unwrap_or_default())
    }

    /// Setting a property to the empty string removes its declaration, and
    /// removing the last declaration removes the `style` attribute.
    pub(crate) fn style_set(&mut self, node_id: NodeId, property: &str, value: &str) -> Result<()> {
        let element = self
            .element_mut(node_id)
            .ok_or_else(|| Error::PageRuntime("style target is not an element".into()))?;

        let mut decls = parse_style_declarations(element.attrs.get("style").map(String::as_str));
        if let Some(pos) = decls.iter().position(|(prop, _)| prop == property) {
            if value.is_empty() {
                decls.remove(pos);
            } else {
                decls[pos].1 = value.to_string();
            }
        } else if !value.is_empty() {
            decls.push((property.to_string(), value.to_string()));
        }

        if decls.is_empty() {
            element.attrs.remove("style");
        } else {
            element
                .attrs
                .insert("style".to_string(), serialize_style_declarations(&decls));
        }

        Ok(())
    }

    pub(crate) fn has_class(&self, node_id: NodeId, name: &str) -> bool {
        self.attr(node_id, "class").is_some_and(|classes| {
            classes
                .split_ascii_whitespace()
                .any(|class| class == name)
        })
    }

    pub(crate) fn add_class(&mut self, node_id: NodeId, name: &str) -> Result<()> {
        let current = self.attr(node_id, "class").unwrap_or_default();
        let mut classes: Vec<&str> = current.split_ascii_whitespace().collect();
        if !classes.contains(&name) {
            classes.push(name);
        }
        self.set_attr(node_id, "class", &classes.join(" "))
    }

    /// Removing the last class removes the `class` attribute, the same way
    /// `style_set` drops an emptied `style` attribute.
    pub(crate) fn remove_class(&mut self, node_id: NodeId, name: &str) -> Result<()> {
        let current = self.attr(node_id, "class").unwrap_or_default();
        let classes: Vec<&str> = current
            .split_ascii_whitespace()
            .filter(|class| *class != name)
            .collect();
        if classes.is_empty() {
            let Some(element) = self.element_mut(node_id) else {
                return Err(Error::PageRuntime(
                    "attribute target is not an element".into(),
                ));
            };
            element.attrs.remove("class");
            Ok(())
        } else {
            self.set_attr(node_id, "class", &classes.join(" "))
        }
    }
}

fn parse_style_declarations(style_attr: Option<&str>) -> Vec<(String, String)> {
    let mut out = Vec::new();
    let Some(style_attr) = style_attr else {
        return out;
    };

    for decl in style_attr.split(';') {
        let decl = decl.trim();
        if decl.is_empty() {
            continue;
        }
        let Some((name, value)) = decl.split_once(':') else {
            continue;
        };
        let name = name.trim().to_ascii_lowercase();
        if name.is_empty() {
            continue;
        }
        let value = value.trim().to_string();
        if let Some(pos) = out.iter().position(|(existing, _)| existing == &name) {
            out[pos].1 = value;
        } else {
            out.push((name, value));
        }
    }

    out
}

fn serialize_style_declarations(decls: &[(String, String)]) -> String {
    let mut out = String::new();
    for (idx, (name, value)) in decls.iter().enumerate() {
        if idx > 0 {
            out.push(' ');
        }
        out.push_str(name);
        out.push_str(": ");
        out.push_str(value);
        out.push(';');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dom_with_div(id: &str) -> (Dom, NodeId) {
        let mut dom = Dom::new();
        let attrs = HashMap::from([("id".to_string(), id.to_string())]);
        let node = dom.create_element(dom.body(), "div", attrs).unwrap();
        (dom, node)
    }

    #[test]
    fn id_index_follows_id_attribute_updates() {
        let (mut dom, node) = dom_with_div("before");
        assert_eq!(dom.by_id("before").unwrap(), node);

        dom.set_attr(node, "id", "after").unwrap();
        assert_eq!(dom.by_id("after").unwrap(), node);
        assert!(matches!(dom.by_id("before"), Err(Error::ElementNotFound(id)) if id == "before"));
    }

    #[test]
    fn duplicate_id_is_rejected_at_creation_and_mutation() {
        let (mut dom, _node) = dom_with_div("taken");
        let attrs = HashMap::from([("id".to_string(), "taken".to_string())]);
        assert!(matches!(
            dom.create_element(dom.body(), "span", attrs),
            Err(Error::DuplicateId(id)) if id == "taken"
        ));

        let other = dom.create_element(dom.body(), "span", HashMap::new()).unwrap();
        assert!(matches!(
            dom.set_attr(other, "id", "taken"),
            Err(Error::DuplicateId(id)) if id == "taken"
        ));
    }

    #[test]
    fn style_declarations_keep_insertion_order() {
        let (mut dom, node) = dom_with_div("box");
        dom.style_set(node, "display", "none").unwrap();
        dom.style_set(node, "color", "red").unwrap();
        assert_eq!(dom.attr(node, "style").unwrap(), "display: none; color: red;");
        assert_eq!(dom.style_get(node, "display").unwrap(), "none");

        dom.style_set(node, "display", "").unwrap();
        assert_eq!(dom.attr(node, "style").unwrap(), "color: red;");

        dom.style_set(node, "color", "").unwrap();
        assert_eq!(dom.attr(node, "style"), None);
    }

    #[test]
    fn class_list_operations_work_on_the_class_attribute() {
        let (mut dom, node) = dom_with_div("box");
        dom.set_attr(node, "class", "modal fade").unwrap();
        assert!(dom.has_class(node, "modal"));
        assert!(!dom.has_class(node, "show"));

        dom.add_class(node, "show").unwrap();
        assert_eq!(dom.attr(node, "class").unwrap(), "modal fade show");

        // Adding an already-present class is a no-op.
        dom.add_class(node, "show").unwrap();
        assert_eq!(dom.attr(node, "class").unwrap(), "modal fade show");

        dom.remove_class(node, "fade").unwrap();
        assert_eq!(dom.attr(node, "class").unwrap(), "modal show");
    }

    #[test]
    fn removing_the_last_class_removes_the_attribute() {
        let (mut dom, node) = dom_with_div("box");
        dom.set_attr(node, "class", "show").unwrap();
        dom.remove_class(node, "show").unwrap();
        assert_eq!(dom.attr(node, "class"), None);

        // Removing from an element with no class attribute leaves none behind.
        dom.remove_class(node, "show").unwrap();
        assert_eq!(dom.attr(node, "class"), None);
    }

    #[test]
    fn text_nodes_require_an_element_parent() {
        let (mut dom, node) = dom_with_div("box");
        let text = dom.create_text(node, "hello").unwrap();
        assert!(matches!(
            dom.create_text(text, "nested"),
            Err(Error::PageRuntime(_))
        ));
        assert_eq!(dom.children(node), &[text]);
    }
}
