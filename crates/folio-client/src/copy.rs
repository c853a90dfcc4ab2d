//! Copy-to-clipboard buttons on code blocks.

use std::collections::HashSet;

use folio_dom::{Document, NodeId};

use crate::clipboard::Clipboard;
use crate::events::Listener;

const TEMPLATE_ID: &str = "copy-button-template";
const OUTPUT_BLOCK_CLASS: &str = "output-block";

/// Wraps each `pre > code` block in a clone of `#copy-button-template`.
#[derive(Debug, Default)]
pub(crate) struct CopyButtons {
    augmented: HashSet<NodeId>,
}

impl CopyButtons {
    /// Augment blocks not yet augmented. Returns listeners to register.
    pub(crate) fn setup(&mut self, doc: &mut Document) -> Vec<(NodeId, Listener)> {
        let blocks: Vec<(NodeId, NodeId)> = doc
            .elements_by_tag("code")
            .into_iter()
            .filter(|code| !self.augmented.contains(code))
            .filter_map(|code| {
                let pre = doc.parent(code).filter(|&p| doc.is_element(p, "pre"))?;
                Some((pre, code))
            })
            .filter(|&(_, code)| doc.closest(code, |el| el.has_class(OUTPUT_BLOCK_CLASS)).is_none())
            .collect();
        if blocks.is_empty() {
            return Vec::new();
        }

        let Some(contents) = doc
            .element_by_id(TEMPLATE_ID)
            .and_then(|template| doc.template_contents(template))
        else {
            tracing::warn!(template = TEMPLATE_ID, "Copy button template not found, skipping copy buttons");
            return Vec::new();
        };

        let mut listeners = Vec::new();
        for (pre, code) in blocks {
            let Some(parent) = doc.parent(pre) else {
                continue;
            };
            let fragment = doc.deep_clone(contents);
            let Some(wrapper) = doc.element_children(fragment).next() else {
                tracing::warn!(template = TEMPLATE_ID, "Copy button template has no element, skipping copy buttons");
                return listeners;
            };

            doc.insert_before(parent, fragment, pre);
            doc.append_child(wrapper, pre);
            self.augmented.insert(code);

            match doc.select_first(wrapper, |el| el.is("button") && el.attr("data-purpose").is_some()) {
                Some(button) => listeners.push((button, Listener::CopyCode { wrapper })),
                None => tracing::warn!("Copy button template has no button[data-purpose], block left without button"),
            }
        }

        tracing::debug!(blocks = self.augmented.len(), "Copy buttons attached");
        listeners
    }
}

/// Copy the code text inside `wrapper`. Clipboard failures are not surfaced.
pub(crate) fn copy_code(doc: &Document, wrapper: NodeId, clipboard: &mut impl Clipboard) {
    let text = doc
        .select_first(wrapper, |el| el.is("code"))
        .map(|code| doc.text_content(code))
        .unwrap_or_default();

    if let Err(error) = clipboard.write_text(&text) {
        tracing::debug!(error = %error, "Copy to clipboard failed");
    }
}
