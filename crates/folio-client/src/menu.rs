//! Hamburger toggle for the side bar.

use folio_dom::{Document, NodeId};

use crate::events::Listener;

const TOGGLE_CLASS: &str = "hamburger-activate";
const OPENED_CLASS: &str = "opened";
const SHOW_CLASS: &str = "show";

#[derive(Debug)]
struct Toggle {
    control: NodeId,
    panel: Option<NodeId>,
    open: bool,
}

/// Open/closed state of every `.hamburger-activate` control.
#[derive(Debug, Default)]
pub(crate) struct MenuToggle {
    toggles: Vec<Toggle>,
}

impl MenuToggle {
    pub(crate) fn setup(&mut self, doc: &mut Document) -> Vec<(NodeId, Listener)> {
        let controls = doc.select(doc.root(), |el| el.has_class(TOGGLE_CLASS));
        let mut listeners = Vec::with_capacity(controls.len());

        for control in controls {
            let panel = find_panel(doc, control);
            if panel.is_none() {
                tracing::debug!("Menu toggle has no panel to show");
            }
            doc.set_attr(control, "aria-expanded", "false");
            listeners.push((control, Listener::ToggleMenu { toggle: self.toggles.len() }));
            self.toggles.push(Toggle {
                control,
                panel,
                open: false,
            });
        }
        listeners
    }

    /// Flip a toggle and reflect the new state on the control and its panel.
    pub(crate) fn toggle(&mut self, doc: &mut Document, index: usize) {
        let Some(toggle) = self.toggles.get_mut(index) else {
            return;
        };
        toggle.open = !toggle.open;
        let open = toggle.open;

        doc.toggle_class(toggle.control, OPENED_CLASS, open);
        doc.set_attr(toggle.control, "aria-expanded", open.to_string());
        if let Some(panel) = toggle.panel {
            doc.toggle_class(panel, SHOW_CLASS, open);
        }
    }
}

/// The `aria-controls` target, else the page's `.default-page-type .side-bar`.
fn find_panel(doc: &Document, control: NodeId) -> Option<NodeId> {
    if let Some(id) = doc.attr(control, "aria-controls")
        && let Some(panel) = doc.element_by_id(id)
    {
        return Some(panel);
    }
    doc.select(doc.root(), |el| el.has_class("side-bar"))
        .into_iter()
        .find(|&bar| doc.ancestors(bar).any(|a| doc.has_class(a, "default-page-type")))
}
