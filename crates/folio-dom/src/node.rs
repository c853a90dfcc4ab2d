//! Node types stored in a [`Document`](crate::Document).

/// Index of a node inside its [`Document`](crate::Document).
///
/// Ids stay valid for the lifetime of the document; detached nodes keep
/// their slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) usize);

/// Element namespace.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Namespace {
    Html,
    Svg,
    MathMl,
}

/// Element attribute.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Attribute {
    /// Attribute name, with its prefix for namespaced attributes (`xlink:href`).
    pub name: String,
    /// Attribute value with entities decoded.
    pub value: String,
}

/// Element data.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Element {
    /// Local tag name (lowercase for HTML elements).
    pub name: String,
    /// Element namespace.
    pub namespace: Namespace,
    /// Attributes in source order.
    pub attrs: Vec<Attribute>,
    /// Detached fragment holding a `<template>` element's contents.
    pub template_contents: Option<NodeId>,
}

impl Element {
    /// Create an HTML element without attributes.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            namespace: Namespace::Html,
            attrs: Vec::new(),
            template_contents: None,
        }
    }

    /// True if this is the HTML element `name`.
    #[must_use]
    pub fn is(&self, name: &str) -> bool {
        self.namespace == Namespace::Html && self.name == name
    }

    /// Attribute value by name.
    #[must_use]
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|a| a.name == name)
            .map(|a| a.value.as_str())
    }

    /// Set an attribute, keeping its position if it already exists.
    pub fn set_attr(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        if let Some(attr) = self.attrs.iter_mut().find(|a| a.name == name) {
            attr.value = value;
        } else {
            self.attrs.push(Attribute {
                name: name.to_owned(),
                value,
            });
        }
    }

    /// Remove an attribute. Returns true if it was present.
    pub fn remove_attr(&mut self, name: &str) -> bool {
        let before = self.attrs.len();
        self.attrs.retain(|a| a.name != name);
        self.attrs.len() != before
    }

    /// Class tokens in order.
    pub fn classes(&self) -> impl Iterator<Item = &str> {
        self.attr("class")
            .unwrap_or_default()
            .split_ascii_whitespace()
    }

    /// True if the class list contains `class`.
    #[must_use]
    pub fn has_class(&self, class: &str) -> bool {
        self.classes().any(|c| c == class)
    }

    /// Add a class token if missing.
    pub fn add_class(&mut self, class: &str) {
        if self.has_class(class) {
            return;
        }
        let value = match self.attr("class").map(str::trim) {
            Some(existing) if !existing.is_empty() => format!("{existing} {class}"),
            _ => class.to_owned(),
        };
        self.set_attr("class", value);
    }

    /// Remove every occurrence of a class token.
    pub fn remove_class(&mut self, class: &str) {
        if !self.has_class(class) {
            return;
        }
        let value = self
            .classes()
            .filter(|c| *c != class)
            .collect::<Vec<_>>()
            .join(" ");
        self.set_attr("class", value);
    }

    /// Add or remove a class token depending on `force`.
    pub fn toggle_class(&mut self, class: &str, force: bool) {
        if force {
            self.add_class(class);
        } else {
            self.remove_class(class);
        }
    }
}

/// Node payload.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NodeData {
    /// Document root.
    Document,
    /// Document fragment (template contents, cloned fragments).
    Fragment,
    /// `<!DOCTYPE>` declaration.
    Doctype {
        name: String,
        public_id: String,
        system_id: String,
    },
    /// Element.
    Element(Element),
    /// Text with entities decoded.
    Text(String),
    /// Comment text without delimiters.
    Comment(String),
}

#[derive(Clone, Debug)]
pub(crate) struct Node {
    pub(crate) data: NodeData,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
}

impl Node {
    pub(crate) fn new(data: NodeData) -> Self {
        Self {
            data,
            parent: None,
            children: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_class_appends_once() {
        let mut el = Element::new("pre");
        el.add_class("hljs-container");
        el.add_class("hljs-container");
        assert_eq!(el.attr("class"), Some("hljs-container"));

        el.add_class("wide");
        assert_eq!(el.attr("class"), Some("hljs-container wide"));
    }

    #[test]
    fn test_remove_class_keeps_other_tokens() {
        let mut el = Element::new("ul");
        el.set_attr("class", "nav-child-level  open extra");
        el.remove_class("open");
        assert_eq!(el.attr("class"), Some("nav-child-level extra"));
    }

    #[test]
    fn test_toggle_class() {
        let mut el = Element::new("button");
        el.toggle_class("opened", true);
        assert!(el.has_class("opened"));
        el.toggle_class("opened", false);
        assert!(!el.has_class("opened"));
    }

    #[test]
    fn test_set_attr_keeps_position() {
        let mut el = Element::new("a");
        el.set_attr("href", "/a");
        el.set_attr("rel", "nofollow");
        el.set_attr("href", "/b");

        let names: Vec<_> = el.attrs.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["href", "rel"]);
        assert_eq!(el.attr("href"), Some("/b"));
    }

    #[test]
    fn test_is_requires_html_namespace() {
        let mut el = Element::new("a");
        assert!(el.is("a"));
        el.namespace = Namespace::Svg;
        assert!(!el.is("a"));
    }
}
