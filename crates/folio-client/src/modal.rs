//! Modal iframe opened by `[data-modal-src]` triggers.

use folio_dom::{Document, NodeId};

use crate::events::Listener;

const TEMPLATE_ID: &str = "modal-iframe-template";
const TRIGGER_ATTR: &str = "data-modal-src";
const MODAL_CLASS: &str = "modal-iframe";
const CLOSE_CLASS: &str = "modal-iframe-close";

/// At most one live modal per page.
#[derive(Debug, Default)]
pub(crate) struct ModalFrame {
    live: Option<NodeId>,
}

impl ModalFrame {
    pub(crate) fn setup(doc: &Document) -> Vec<(NodeId, Listener)> {
        doc.select(doc.root(), |el| el.attr(TRIGGER_ATTR).is_some())
            .into_iter()
            .map(|trigger| (trigger, Listener::OpenModal))
            .collect()
    }

    /// Open the modal for `trigger`. Returns the close button's listener.
    pub(crate) fn open(&mut self, doc: &mut Document, trigger: NodeId) -> Option<(NodeId, Listener)> {
        if self.live.is_some_and(|modal| doc.is_inclusive_ancestor(doc.root(), modal)) {
            tracing::debug!("Modal already open");
            return None;
        }
        let src = doc.attr(trigger, TRIGGER_ATTR)?.to_owned();

        let Some(contents) = doc
            .element_by_id(TEMPLATE_ID)
            .and_then(|template| doc.template_contents(template))
        else {
            tracing::warn!(template = TEMPLATE_ID, "Modal template not found");
            return None;
        };
        let Some(body) = doc.elements_by_tag("body").first().copied() else {
            tracing::warn!("Page has no body to host the modal");
            return None;
        };

        let fragment = doc.deep_clone(contents);
        let modal = doc.select_first(fragment, |el| el.has_class(MODAL_CLASS));
        let iframe = modal.and_then(|m| doc.select_first(m, |el| el.is("iframe")));
        let close = modal.and_then(|m| doc.select_first(m, |el| el.has_class(CLOSE_CLASS)));
        let (Some(modal), Some(iframe), Some(close)) = (modal, iframe, close) else {
            tracing::warn!(template = TEMPLATE_ID, "Modal template is missing the frame, iframe or close button");
            return None;
        };

        doc.set_attr(iframe, "src", src);
        doc.append_child(body, fragment);
        self.live = Some(modal);
        Some((close, Listener::CloseModal))
    }

    /// Remove the live modal, if any.
    pub(crate) fn close(&mut self, doc: &mut Document) {
        if let Some(modal) = self.live.take() {
            doc.detach(modal);
        }
    }

    pub(crate) fn live(&self) -> Option<NodeId> {
        self.live
    }
}
