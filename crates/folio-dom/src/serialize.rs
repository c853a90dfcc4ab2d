//! Serializing a [`Document`] back to HTML.

use std::fmt::Write;

use crate::node::{Element, Namespace, NodeData, NodeId};
use crate::Document;

/// HTML elements without end tags.
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

/// HTML elements whose text children are written verbatim.
const RAW_TEXT_ELEMENTS: &[&str] = &[
    "script", "style", "xmp", "iframe", "noembed", "noframes", "plaintext", "noscript",
];

/// Elements where the parser drops a newline directly after the start tag.
const LEADING_NEWLINE_ELEMENTS: &[&str] = &["pre", "textarea", "listing"];

/// Serialization options.
#[derive(Clone, Copy, Debug, Default)]
pub struct SerializeOptions {
    /// Write every doctype as `<!doctype html>`.
    pub short_doctype: bool,
}

impl Document {
    /// Serialize the whole document.
    #[must_use]
    pub fn to_html(&self) -> String {
        self.to_html_with(SerializeOptions::default())
    }

    /// Serialize the whole document with options.
    #[must_use]
    pub fn to_html_with(&self, options: SerializeOptions) -> String {
        let mut out = String::new();
        self.write_children(&mut out, self.root(), options);
        out
    }

    /// Serialize the children of `id`.
    #[must_use]
    pub fn inner_html(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.write_children(&mut out, id, SerializeOptions::default());
        out
    }

    /// Serialize `id` and its subtree.
    #[must_use]
    pub fn outer_html(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.write_node(&mut out, id, SerializeOptions::default());
        out
    }

    fn write_children(&self, out: &mut String, id: NodeId, options: SerializeOptions) {
        let parent = match self.data(id) {
            NodeData::Element(el) if el.is("template") => match el.template_contents {
                Some(contents) => contents,
                None => id,
            },
            _ => id,
        };
        for &child in self.children(parent) {
            self.write_node(out, child, options);
        }
    }

    fn write_node(&self, out: &mut String, id: NodeId, options: SerializeOptions) {
        match self.data(id) {
            NodeData::Document | NodeData::Fragment => self.write_children(out, id, options),
            NodeData::Doctype {
                name,
                public_id,
                system_id,
            } => write_doctype(out, name, public_id, system_id, options),
            NodeData::Text(text) => {
                let raw = self
                    .parent(id)
                    .and_then(|p| self.element(p))
                    .is_some_and(|el| {
                        el.namespace == Namespace::Html && RAW_TEXT_ELEMENTS.contains(&el.name.as_str())
                    });
                if raw {
                    out.push_str(text);
                } else {
                    out.push_str(&html_escape::encode_text(text));
                }
            }
            NodeData::Comment(text) => {
                out.push_str("<!--");
                out.push_str(text);
                out.push_str("-->");
            }
            NodeData::Element(el) => self.write_element(out, id, el, options),
        }
    }

    fn write_element(&self, out: &mut String, id: NodeId, el: &Element, options: SerializeOptions) {
        out.push('<');
        out.push_str(&el.name);
        for attr in &el.attrs {
            let _ = write!(
                out,
                " {}=\"{}\"",
                attr.name,
                html_escape::encode_double_quoted_attribute(&attr.value)
            );
        }
        out.push('>');

        let html = el.namespace == Namespace::Html;
        if html && VOID_ELEMENTS.contains(&el.name.as_str()) {
            return;
        }

        if html
            && LEADING_NEWLINE_ELEMENTS.contains(&el.name.as_str())
            && let Some(&first) = self.children(id).first()
            && matches!(self.data(first), NodeData::Text(text) if text.starts_with('\n'))
        {
            out.push('\n');
        }

        self.write_children(out, id, options);

        out.push_str("</");
        out.push_str(&el.name);
        out.push('>');
    }
}

fn write_doctype(out: &mut String, name: &str, public_id: &str, system_id: &str, options: SerializeOptions) {
    if options.short_doctype {
        out.push_str("<!doctype html>");
        return;
    }
    out.push_str("<!DOCTYPE ");
    out.push_str(name);
    if !public_id.is_empty() {
        let _ = write!(out, " PUBLIC \"{public_id}\"");
        if !system_id.is_empty() {
            let _ = write!(out, " \"{system_id}\"");
        }
    } else if !system_id.is_empty() {
        let _ = write!(out, " SYSTEM \"{system_id}\"");
    }
    out.push('>');
}
