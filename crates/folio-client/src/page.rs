//! A loaded page with its behavior attached.

use std::collections::HashMap;

use folio_dom::{Document, DomError, NodeId};

use crate::clipboard::Clipboard;
use crate::copy::{self, CopyButtons};
use crate::disclosure::NavDisclosure;
use crate::events::{Event, Listener};
use crate::menu::MenuToggle;
use crate::modal::ModalFrame;
use crate::scroll_spy::ScrollSpy;
use crate::{fragment, links};

/// Page behavior options.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClientOptions {
    /// Set `target="_self"` on every link at load.
    pub force_same_tab: bool,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            force_same_tab: true,
        }
    }
}

/// A page document plus the controllers attached to it at load.
///
/// Events are handled one at a time and run to completion.
pub struct Page<C: Clipboard> {
    doc: Document,
    hash: String,
    clipboard: C,
    listeners: HashMap<NodeId, Vec<Listener>>,
    copy_buttons: CopyButtons,
    menus: MenuToggle,
    disclosure: NavDisclosure,
    scroll_spy: ScrollSpy,
    modal: ModalFrame,
}

impl<C: Clipboard> Page<C> {
    /// Attach every behavior to a loaded document.
    ///
    /// `location_hash` is the fragment the page was opened with (empty if none).
    pub fn load(doc: Document, location_hash: &str, clipboard: C, options: &ClientOptions) -> Self {
        let mut page = Self {
            doc,
            hash: location_hash.to_owned(),
            clipboard,
            listeners: HashMap::new(),
            copy_buttons: CopyButtons::default(),
            menus: MenuToggle::default(),
            disclosure: NavDisclosure::default(),
            scroll_spy: ScrollSpy::default(),
            modal: ModalFrame::default(),
        };

        let copy = page.copy_buttons.setup(&mut page.doc);
        page.listen(copy);
        let menus = page.menus.setup(&mut page.doc);
        page.listen(menus);
        let disclosure = page.disclosure.setup(&mut page.doc);
        page.listen(disclosure);
        let modal = ModalFrame::setup(&page.doc);
        page.listen(modal);
        page.scroll_spy.setup(&page.doc);
        fragment::open_targeted_details(&mut page.doc, &page.hash);
        if options.force_same_tab {
            links::force_same_tab(&mut page.doc);
        }

        page
    }

    /// Parse `html` and [`load`](Self::load) it.
    ///
    /// # Errors
    ///
    /// Returns an error if the markup cannot be parsed.
    pub fn parse(html: &str, location_hash: &str, clipboard: C, options: &ClientOptions) -> Result<Self, DomError> {
        Ok(Self::load(Document::parse(html)?, location_hash, clipboard, options))
    }

    /// Add copy buttons to code blocks that do not have one yet.
    pub fn refresh_copy_buttons(&mut self) {
        let listeners = self.copy_buttons.setup(&mut self.doc);
        self.listen(listeners);
    }

    /// Handle one event. Returns true if the default action was prevented.
    pub fn dispatch(&mut self, event: Event) -> bool {
        match event {
            Event::Click(target) => self.click(target),
            Event::HashChange(hash) => {
                fragment::open_targeted_details(&mut self.doc, &hash);
                self.hash = hash;
                false
            }
            Event::Intersection(entries) => {
                self.scroll_spy.on_intersection(&mut self.doc, &entries);
                false
            }
        }
    }

    fn click(&mut self, target: NodeId) -> bool {
        let path: Vec<NodeId> = std::iter::once(target).chain(self.doc.ancestors(target)).collect();
        let mut prevented = false;

        for node in path {
            let Some(listeners) = self.listeners.get(&node).cloned() else {
                continue;
            };
            for listener in listeners {
                match listener {
                    Listener::CopyCode { wrapper } => copy::copy_code(&self.doc, wrapper, &mut self.clipboard),
                    Listener::ToggleMenu { toggle } => self.menus.toggle(&mut self.doc, toggle),
                    Listener::Disclose { level, entry } => self.disclosure.toggle(&mut self.doc, level, entry),
                    Listener::OpenModal => {
                        prevented = true;
                        if let Some(close) = self.modal.open(&mut self.doc, node) {
                            self.listen([close]);
                        }
                    }
                    Listener::CloseModal => {
                        self.modal.close(&mut self.doc);
                        self.listeners.remove(&node);
                    }
                }
            }
        }
        prevented
    }

    fn listen(&mut self, listeners: impl IntoIterator<Item = (NodeId, Listener)>) {
        for (node, listener) in listeners {
            self.listeners.entry(node).or_default().push(listener);
        }
    }

    /// The page document.
    pub fn document(&self) -> &Document {
        &self.doc
    }

    /// Take the page document.
    pub fn into_document(self) -> Document {
        self.doc
    }

    /// The clipboard.
    pub fn clipboard(&self) -> &C {
        &self.clipboard
    }

    /// Current location fragment.
    pub fn hash(&self) -> &str {
        &self.hash
    }

    /// Headings observed by the scroll-spy.
    pub fn observed_headings(&self) -> Vec<NodeId> {
        self.scroll_spy.observed()
    }

    /// Root element of the open modal, if any.
    pub fn open_modal(&self) -> Option<NodeId> {
        self.modal.live()
    }
}
