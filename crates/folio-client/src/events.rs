//! Events delivered to a [`Page`](crate::Page).

use folio_dom::NodeId;

/// Browser event.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// Activation of an element. Bubbles from the target to the root.
    Click(NodeId),
    /// The location fragment changed. Carries the new fragment, with or
    /// without the leading `#`.
    HashChange(String),
    /// Intersection observer callback for observed elements.
    Intersection(Vec<IntersectionEntry>),
}

/// One intersection observer record.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct IntersectionEntry {
    /// Observed element.
    pub target: NodeId,
    /// Whether the element entered the viewport.
    pub is_intersecting: bool,
}

impl IntersectionEntry {
    /// Entry for an element entering the viewport.
    #[must_use]
    pub fn entering(target: NodeId) -> Self {
        Self {
            target,
            is_intersecting: true,
        }
    }

    /// Entry for an element leaving the viewport.
    #[must_use]
    pub fn leaving(target: NodeId) -> Self {
        Self {
            target,
            is_intersecting: false,
        }
    }
}

/// Handler bound to an element.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Listener {
    /// Copy the code inside a copy-button wrapper.
    CopyCode { wrapper: NodeId },
    /// Flip a hamburger toggle.
    ToggleMenu { toggle: usize },
    /// Open or close a navigation list.
    Disclose { level: crate::disclosure::Level, entry: usize },
    /// Open the modal iframe.
    OpenModal,
    /// Close the live modal.
    CloseModal,
}
