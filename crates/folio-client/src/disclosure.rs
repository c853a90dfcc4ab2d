//! Accordion disclosure of nested navigation lists.
//!
//! Each opener button controls the list of its level found under the
//! button's parent. Levels are independent accordions: opening an entry
//! closes every other open entry of the same level.

use folio_dom::{Document, NodeId};

use crate::events::Listener;

const OPEN_CLASS: &str = "open";
const ARROW_CLASS: &str = "up-arrow";

/// Navigation nesting level.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Level {
    Child,
    Grandchild,
}

impl Level {
    const ALL: [Level; 2] = [Level::Child, Level::Grandchild];

    fn opener_attr(self) -> &'static str {
        match self {
            Level::Child => "data-children-opener",
            Level::Grandchild => "data-grandchildren-opener",
        }
    }

    fn list_class(self) -> &'static str {
        match self {
            Level::Child => "nav-child-level",
            Level::Grandchild => "nav-grandchild-level",
        }
    }
}

#[derive(Debug)]
struct Entry {
    opener: NodeId,
    list: Option<NodeId>,
}

/// Registered openers and lists of both levels.
#[derive(Debug, Default)]
pub(crate) struct NavDisclosure {
    children: Vec<Entry>,
    grandchildren: Vec<Entry>,
}

impl NavDisclosure {
    pub(crate) fn setup(&mut self, doc: &mut Document) -> Vec<(NodeId, Listener)> {
        let mut listeners = Vec::new();

        for level in Level::ALL {
            let openers = doc.select(doc.root(), |el| el.is("button") && el.attr(level.opener_attr()).is_some());
            for opener in openers {
                let list = doc.parent(opener).and_then(|parent| {
                    doc.select_first(parent, |el| el.is("ul") && el.has_class(level.list_class()))
                });
                if list.is_none() {
                    tracing::debug!(level = ?level, "Navigation opener has no list");
                }
                let entries = self.entries_mut(level);
                listeners.push((opener, Listener::Disclose { level, entry: entries.len() }));
                entries.push(Entry { opener, list });

                let open = list.is_some_and(|l| doc.has_class(l, OPEN_CLASS));
                reflect(doc, opener, open);
            }
        }
        listeners
    }

    /// Toggle one entry, closing the other entries of its level.
    pub(crate) fn toggle(&self, doc: &mut Document, level: Level, index: usize) {
        let entries = self.entries(level);
        let Some(clicked) = entries.get(index) else {
            return;
        };
        let was_open = clicked.list.is_some_and(|l| doc.has_class(l, OPEN_CLASS));

        for entry in entries {
            let open = entry.opener == clicked.opener && !was_open;
            if let Some(list) = entry.list {
                doc.toggle_class(list, OPEN_CLASS, open);
            }
            reflect(doc, entry.opener, open);
        }
    }

    fn entries(&self, level: Level) -> &[Entry] {
        match level {
            Level::Child => &self.children,
            Level::Grandchild => &self.grandchildren,
        }
    }

    fn entries_mut(&mut self, level: Level) -> &mut Vec<Entry> {
        match level {
            Level::Child => &mut self.children,
            Level::Grandchild => &mut self.grandchildren,
        }
    }
}

/// Mirror a list's state on its opener button.
fn reflect(doc: &mut Document, opener: NodeId, open: bool) {
    doc.toggle_class(opener, ARROW_CLASS, open);
    doc.set_attr(opener, "aria-expanded", open.to_string());
}
