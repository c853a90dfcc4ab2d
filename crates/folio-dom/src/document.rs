//! Arena-backed document tree.

use crate::node::{Element, Node, NodeData, NodeId};

/// HTML document stored as a flat arena of nodes.
///
/// Nodes refer to their parent and children by [`NodeId`]. Detaching a
/// node only unlinks it; its slot stays allocated until the document is
/// dropped.
#[derive(Clone, Debug)]
pub struct Document {
    nodes: Vec<Node>,
    root: NodeId,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// Create a document containing only the root node.
    #[must_use]
    pub fn new() -> Self {
        Self {
            nodes: vec![Node::new(NodeData::Document)],
            root: NodeId(0),
        }
    }

    /// Root node.
    #[must_use]
    pub fn root(&self) -> NodeId {
        self.root
    }

    pub(crate) fn push(&mut self, data: NodeData) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node::new(data));
        id
    }

    /// Create a detached HTML element.
    pub fn create_element(&mut self, name: &str) -> NodeId {
        self.push(NodeData::Element(Element::new(name)))
    }

    /// Create a detached text node.
    pub fn create_text(&mut self, text: impl Into<String>) -> NodeId {
        self.push(NodeData::Text(text.into()))
    }

    /// Create a detached fragment.
    pub fn create_fragment(&mut self) -> NodeId {
        self.push(NodeData::Fragment)
    }

    /// Node payload.
    #[must_use]
    pub fn data(&self, id: NodeId) -> &NodeData {
        &self.nodes[id.0].data
    }

    /// Mutable node payload.
    pub fn data_mut(&mut self, id: NodeId) -> &mut NodeData {
        &mut self.nodes[id.0].data
    }

    /// Element payload, if the node is an element.
    #[must_use]
    pub fn element(&self, id: NodeId) -> Option<&Element> {
        match &self.nodes[id.0].data {
            NodeData::Element(el) => Some(el),
            _ => None,
        }
    }

    /// Mutable element payload, if the node is an element.
    pub fn element_mut(&mut self, id: NodeId) -> Option<&mut Element> {
        match &mut self.nodes[id.0].data {
            NodeData::Element(el) => Some(el),
            _ => None,
        }
    }

    /// True if the node is the HTML element `name`.
    #[must_use]
    pub fn is_element(&self, id: NodeId, name: &str) -> bool {
        self.element(id).is_some_and(|el| el.is(name))
    }

    /// Tag name of an element node.
    #[must_use]
    pub fn tag_name(&self, id: NodeId) -> Option<&str> {
        self.element(id).map(|el| el.name.as_str())
    }

    /// Parent node.
    #[must_use]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].parent
    }

    /// Child nodes in order.
    #[must_use]
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.0].children
    }

    /// Fragment holding a `<template>` element's contents.
    #[must_use]
    pub fn template_contents(&self, id: NodeId) -> Option<NodeId> {
        self.element(id).and_then(|el| el.template_contents)
    }

    /// Element children in order.
    pub fn element_children(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.children(id)
            .iter()
            .copied()
            .filter(|&child| self.element(child).is_some())
    }

    /// Closest preceding sibling that is an element.
    #[must_use]
    pub fn previous_element_sibling(&self, id: NodeId) -> Option<NodeId> {
        let parent = self.parent(id)?;
        let siblings = self.children(parent);
        let pos = siblings.iter().position(|&s| s == id)?;
        siblings[..pos]
            .iter()
            .rev()
            .copied()
            .find(|&s| self.element(s).is_some())
    }

    /// Ancestors from the parent up to the root.
    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(self.parent(id), |&node| self.parent(node))
    }

    /// Descendants of `id` in document order, excluding `id`.
    ///
    /// Template contents are not traversed.
    #[must_use]
    pub fn descendants(&self, id: NodeId) -> Descendants<'_> {
        let mut stack: Vec<NodeId> = self.children(id).to_vec();
        stack.reverse();
        Descendants { doc: self, stack }
    }

    /// Descendant elements of `scope` matching `pred`, in document order.
    pub fn select(&self, scope: NodeId, pred: impl Fn(&Element) -> bool) -> Vec<NodeId> {
        self.descendants(scope)
            .filter(|&id| self.element(id).is_some_and(&pred))
            .collect()
    }

    /// First descendant element of `scope` matching `pred`.
    pub fn select_first(&self, scope: NodeId, pred: impl Fn(&Element) -> bool) -> Option<NodeId> {
        self.descendants(scope)
            .find(|&id| self.element(id).is_some_and(&pred))
    }

    /// All HTML elements named `name`, in document order.
    #[must_use]
    pub fn elements_by_tag(&self, name: &str) -> Vec<NodeId> {
        self.select(self.root, |el| el.is(name))
    }

    /// First element whose `id` attribute equals `id`.
    #[must_use]
    pub fn element_by_id(&self, id: &str) -> Option<NodeId> {
        self.select_first(self.root, |el| el.attr("id") == Some(id))
    }

    /// Closest inclusive ancestor element matching `pred`.
    pub fn closest(&self, id: NodeId, pred: impl Fn(&Element) -> bool) -> Option<NodeId> {
        std::iter::once(id)
            .chain(self.ancestors(id))
            .find(|&node| self.element(node).is_some_and(&pred))
    }

    /// True if `ancestor` is `id` or one of its ancestors.
    #[must_use]
    pub fn is_inclusive_ancestor(&self, ancestor: NodeId, id: NodeId) -> bool {
        id == ancestor || self.ancestors(id).any(|a| a == ancestor)
    }

    /// Attribute of an element node.
    #[must_use]
    pub fn attr(&self, id: NodeId, name: &str) -> Option<&str> {
        self.element(id).and_then(|el| el.attr(name))
    }

    /// Set an attribute on an element node. No-op for other nodes.
    pub fn set_attr(&mut self, id: NodeId, name: &str, value: impl Into<String>) {
        if let Some(el) = self.element_mut(id) {
            el.set_attr(name, value);
        }
    }

    /// Remove an attribute from an element node.
    pub fn remove_attr(&mut self, id: NodeId, name: &str) -> bool {
        self.element_mut(id).is_some_and(|el| el.remove_attr(name))
    }

    /// True if the element has the class token.
    #[must_use]
    pub fn has_class(&self, id: NodeId, class: &str) -> bool {
        self.element(id).is_some_and(|el| el.has_class(class))
    }

    /// Add a class token to an element node.
    pub fn add_class(&mut self, id: NodeId, class: &str) {
        if let Some(el) = self.element_mut(id) {
            el.add_class(class);
        }
    }

    /// Remove a class token from an element node.
    pub fn remove_class(&mut self, id: NodeId, class: &str) {
        if let Some(el) = self.element_mut(id) {
            el.remove_class(class);
        }
    }

    /// Add or remove a class token depending on `force`.
    pub fn toggle_class(&mut self, id: NodeId, class: &str, force: bool) {
        if let Some(el) = self.element_mut(id) {
            el.toggle_class(class, force);
        }
    }

    /// Concatenated text of all descendant text nodes.
    #[must_use]
    pub fn text_content(&self, id: NodeId) -> String {
        if let NodeData::Text(text) = self.data(id) {
            return text.clone();
        }
        let mut out = String::new();
        for node in self.descendants(id) {
            if let NodeData::Text(text) = self.data(node) {
                out.push_str(text);
            }
        }
        out
    }

    /// Replace all children of `id` with a single text node.
    pub fn set_text_content(&mut self, id: NodeId, text: impl Into<String>) {
        self.remove_children(id);
        let text = self.create_text(text);
        self.append_child(id, text);
    }

    /// Unlink a node from its parent.
    pub fn detach(&mut self, id: NodeId) {
        if let Some(parent) = self.nodes[id.0].parent.take() {
            self.nodes[parent.0].children.retain(|&c| c != id);
        }
    }

    /// Unlink all children of `id`.
    pub fn remove_children(&mut self, id: NodeId) {
        let children = std::mem::take(&mut self.nodes[id.0].children);
        for child in children {
            self.nodes[child.0].parent = None;
        }
    }

    /// Append `child` as the last child of `parent`.
    ///
    /// A fragment is replaced by its children. A node that already has a
    /// parent is moved.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        for node in self.take_insertable(child) {
            self.nodes[node.0].parent = Some(parent);
            self.nodes[parent.0].children.push(node);
        }
    }

    /// Insert `child` into `parent` before `reference`.
    ///
    /// Appends when `reference` is not a child of `parent`.
    pub fn insert_before(&mut self, parent: NodeId, child: NodeId, reference: NodeId) {
        let nodes = self.take_insertable(child);
        let Some(mut pos) = self.nodes[parent.0]
            .children
            .iter()
            .position(|&c| c == reference)
        else {
            for node in nodes {
                self.nodes[node.0].parent = Some(parent);
                self.nodes[parent.0].children.push(node);
            }
            return;
        };
        for node in nodes {
            self.nodes[node.0].parent = Some(parent);
            self.nodes[parent.0].children.insert(pos, node);
            pos += 1;
        }
    }

    fn take_insertable(&mut self, child: NodeId) -> Vec<NodeId> {
        if matches!(self.nodes[child.0].data, NodeData::Fragment) {
            let children = std::mem::take(&mut self.nodes[child.0].children);
            for &c in &children {
                self.nodes[c.0].parent = None;
            }
            children
        } else {
            self.detach(child);
            vec![child]
        }
    }

    /// Copy a subtree, including template contents. The copy is detached.
    pub fn deep_clone(&mut self, id: NodeId) -> NodeId {
        let data = self.nodes[id.0].data.clone();
        let copy = self.push(data);

        if let Some(contents) = self.template_contents(id) {
            let contents_copy = self.deep_clone(contents);
            if let Some(el) = self.element_mut(copy) {
                el.template_contents = Some(contents_copy);
            }
        }

        let children = self.nodes[id.0].children.clone();
        for child in children {
            let child_copy = self.deep_clone(child);
            self.nodes[child_copy.0].parent = Some(copy);
            self.nodes[copy.0].children.push(child_copy);
        }
        copy
    }

    /// Replace runs of adjacent text nodes under `id` with a single node.
    pub fn merge_adjacent_text(&mut self, id: NodeId) {
        let mut stack = vec![id];
        while let Some(node) = stack.pop() {
            let children = std::mem::take(&mut self.nodes[node.0].children);
            let mut merged: Vec<NodeId> = Vec::with_capacity(children.len());
            for child in children {
                let prev = merged
                    .last()
                    .copied()
                    .filter(|prev| matches!(self.nodes[prev.0].data, NodeData::Text(_)));
                let text = match &self.nodes[child.0].data {
                    NodeData::Text(text) => Some(text.clone()),
                    _ => None,
                };
                match (prev, text) {
                    (Some(prev), Some(text)) => {
                        if let NodeData::Text(prev_text) = &mut self.nodes[prev.0].data {
                            prev_text.push_str(&text);
                        }
                        self.nodes[child.0].parent = None;
                    }
                    _ => merged.push(child),
                }
            }
            self.nodes[node.0].children = merged;

            if let Some(contents) = self.template_contents(node) {
                stack.push(contents);
            }
            stack.extend(self.nodes[node.0].children.iter().copied());
        }
    }
}

/// Pre-order iterator over descendants. See [`Document::descendants`].
pub struct Descendants<'a> {
    doc: &'a Document,
    stack: Vec<NodeId>,
}

impl Iterator for Descendants<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let id = self.stack.pop()?;
        self.stack
            .extend(self.doc.children(id).iter().rev().copied());
        Some(id)
    }
}
