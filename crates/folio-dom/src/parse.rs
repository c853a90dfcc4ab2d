//! Parsing HTML into a [`Document`] with html5ever.

use html5ever::tendril::TendrilSink;
use html5ever::{LocalName, ParseOpts, QualName, parse_document, parse_fragment};
use markup5ever_rcdom::{Handle, NodeData as RcNodeData, RcDom};

use crate::node::{Attribute, Element, Namespace, NodeData, NodeId};
use crate::{Document, DomError};

/// Maximum element nesting accepted from markup.
///
/// Matches the tree depth cap browsers apply while parsing.
pub const MAX_DEPTH: usize = 512;

const HTML_NS: &str = "http://www.w3.org/1999/xhtml";
const SVG_NS: &str = "http://www.w3.org/2000/svg";
const MATHML_NS: &str = "http://www.w3.org/1998/Math/MathML";

impl Document {
    /// Parse a complete HTML document.
    ///
    /// Parsing is lenient: malformed markup is repaired the way browsers
    /// repair it.
    ///
    /// # Errors
    ///
    /// Returns [`DomError::TooDeep`] if elements nest deeper than [`MAX_DEPTH`].
    pub fn parse(html: &str) -> Result<Self, DomError> {
        let dom = parse_document(RcDom::default(), ParseOpts::default()).one(html);
        let mut doc = Self::new();
        let root = doc.root();
        doc.import_children(&dom.document, root, 0)?;
        Ok(doc)
    }

    /// Replace the children of `id` with nodes parsed from `html`.
    ///
    /// The markup is parsed in the context of the element's tag.
    ///
    /// # Errors
    ///
    /// Returns [`DomError::TooDeep`] if the fragment nests too deeply. The
    /// element is left unchanged in that case.
    pub fn set_inner_html(&mut self, id: NodeId, html: &str) -> Result<(), DomError> {
        let context = self.tag_name(id).unwrap_or("div");
        let context = QualName::new(None, HTML_NS.into(), LocalName::from(context));
        let dom = parse_fragment(RcDom::default(), ParseOpts::default(), context, Vec::new()).one(html);

        // Fragment parsing yields document -> <html> -> parsed nodes.
        let container = dom.document.children.borrow().first().cloned();
        let depth = self.ancestors(id).count() + 1;
        let fragment = self.create_fragment();
        if let Some(container) = container {
            self.import_children(&container, fragment, depth)?;
        }

        self.remove_children(id);
        self.append_child(id, fragment);
        Ok(())
    }

    fn import_children(&mut self, handle: &Handle, parent: NodeId, depth: usize) -> Result<(), DomError> {
        let mut stack: Vec<(Handle, NodeId, usize)> = handle
            .children
            .borrow()
            .iter()
            .rev()
            .map(|child| (child.clone(), parent, depth + 1))
            .collect();

        while let Some((handle, parent, depth)) = stack.pop() {
            if depth > MAX_DEPTH {
                return Err(DomError::TooDeep { max: MAX_DEPTH });
            }
            let Some(data) = convert(&handle) else {
                continue;
            };
            let id = self.push(data);
            self.append_child(parent, id);

            if let RcNodeData::Element {
                template_contents, ..
            } = &handle.data
                && let Some(contents) = template_contents.borrow().as_ref()
            {
                let fragment = self.create_fragment();
                if let Some(el) = self.element_mut(id) {
                    el.template_contents = Some(fragment);
                }
                stack.extend(
                    contents
                        .children
                        .borrow()
                        .iter()
                        .rev()
                        .map(|child| (child.clone(), fragment, depth + 1)),
                );
            }

            stack.extend(
                handle
                    .children
                    .borrow()
                    .iter()
                    .rev()
                    .map(|child| (child.clone(), id, depth + 1)),
            );
        }
        Ok(())
    }
}

fn convert(handle: &Handle) -> Option<NodeData> {
    let data = match &handle.data {
        RcNodeData::Doctype {
            name,
            public_id,
            system_id,
        } => NodeData::Doctype {
            name: name.to_string(),
            public_id: public_id.to_string(),
            system_id: system_id.to_string(),
        },
        RcNodeData::Text { contents } => NodeData::Text(contents.borrow().to_string()),
        RcNodeData::Comment { contents } => NodeData::Comment(contents.to_string()),
        RcNodeData::Element { name, attrs, .. } => {
            let namespace = match &*name.ns {
                SVG_NS => Namespace::Svg,
                MATHML_NS => Namespace::MathMl,
                _ => Namespace::Html,
            };
            let attrs = attrs
                .borrow()
                .iter()
                .map(|attr| Attribute {
                    name: match &attr.name.prefix {
                        Some(prefix) => format!("{prefix}:{}", attr.name.local),
                        None => attr.name.local.to_string(),
                    },
                    value: attr.value.to_string(),
                })
                .collect();
            NodeData::Element(Element {
                name: name.local.to_string(),
                namespace,
                attrs,
                template_contents: None,
            })
        }
        RcNodeData::Document | RcNodeData::ProcessingInstruction { .. } => return None,
    };
    Some(data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_builds_html_skeleton() {
        let doc = Document::parse("<p>Hello</p>").unwrap();

        assert_eq!(doc.elements_by_tag("html").len(), 1);
        assert_eq!(doc.elements_by_tag("head").len(), 1);
        let p = doc.elements_by_tag("p")[0];
        assert_eq!(doc.text_content(p), "Hello");
        assert!(doc.is_element(doc.parent(p).unwrap(), "body"));
    }

    #[test]
    fn test_parse_decodes_entities() {
        let doc = Document::parse(r#"<code title="a &amp; b">x &lt; y</code>"#).unwrap();
        let code = doc.elements_by_tag("code")[0];

        assert_eq!(doc.attr(code, "title"), Some("a & b"));
        assert_eq!(doc.text_content(code), "x < y");
    }

    #[test]
    fn test_parse_doctype_and_comment() {
        let doc = Document::parse("<!DOCTYPE html><!-- note --><p></p>").unwrap();
        let root_children = doc.children(doc.root());

        assert!(matches!(doc.data(root_children[0]), NodeData::Doctype { name, .. } if name == "html"));
        assert_eq!(doc.data(root_children[1]), &NodeData::Comment(" note ".to_owned()));
    }

    #[test]
    fn test_template_contents_are_detached() {
        let doc = Document::parse(
            r#"<template id="copy-button-template"><button data-purpose="copy">Copy</button></template>"#,
        )
        .unwrap();

        let template = doc.element_by_id("copy-button-template").unwrap();
        assert!(doc.children(template).is_empty());
        assert!(doc.elements_by_tag("button").is_empty());

        let contents = doc.template_contents(template).unwrap();
        let button = doc.select_first(contents, |el| el.is("button")).unwrap();
        assert_eq!(doc.attr(button, "data-purpose"), Some("copy"));
    }

    #[test]
    fn test_svg_namespace() {
        let doc = Document::parse(r#"<svg viewBox="0 0 1 1"><path d="M0"/></svg>"#).unwrap();
        let svg = doc.select_first(doc.root(), |el| el.name == "svg").unwrap();

        assert_eq!(doc.element(svg).unwrap().namespace, Namespace::Svg);
        assert_eq!(doc.attr(svg, "viewBox"), Some("0 0 1 1"));
    }

    #[test]
    fn test_nesting_too_deep() {
        let html = "<div>".repeat(MAX_DEPTH + 10);

        let err = Document::parse(&html).unwrap_err();

        assert!(matches!(err, DomError::TooDeep { max: MAX_DEPTH }));
    }

    #[test]
    fn test_set_inner_html_replaces_children() {
        let mut doc = Document::parse("<pre><code>old</code></pre>").unwrap();
        let code = doc.elements_by_tag("code")[0];

        doc.set_inner_html(code, r#"<span class="hl-keyword">fn</span> main"#).unwrap();

        assert_eq!(doc.text_content(code), "fn main");
        let span = doc.select_first(code, |el| el.is("span")).unwrap();
        assert_eq!(doc.parent(span), Some(code));
        assert!(doc.has_class(span, "hl-keyword"));
    }
}
