//! Scroll-spy for the in-page table of contents.

use folio_dom::{Document, NodeId};

use crate::events::IntersectionEntry;

const TOC_ID: &str = "in-page-toc";
const CURRENT_CLASS: &str = "current";

/// A heading paired with its TOC link.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct TocSection {
    heading: NodeId,
    link: NodeId,
}

/// Marks the TOC link of the heading that most recently entered the viewport.
///
/// Sections are discovered once at load; headings added later are not tracked.
#[derive(Debug, Default)]
pub(crate) struct ScrollSpy {
    sections: Vec<TocSection>,
}

impl ScrollSpy {
    pub(crate) fn setup(&mut self, doc: &Document) {
        let Some(toc) = doc.element_by_id(TOC_ID) else {
            tracing::debug!(toc = TOC_ID, "No in-page TOC, scroll-spy disabled");
            return;
        };

        let links = doc.select(toc, |el| el.is("a"));
        for link in links {
            if !doc.parent(link).is_some_and(|p| doc.is_element(p, "li")) {
                continue;
            }
            let href = doc.attr(link, "href").unwrap_or_default();
            let target = href.strip_prefix('#').unwrap_or(href);
            match doc.element_by_id(target) {
                Some(heading) => self.sections.push(TocSection { heading, link }),
                None => tracing::warn!(href, "No heading found for TOC link"),
            }
        }
    }

    /// Headings registered with the intersection observer.
    pub(crate) fn observed(&self) -> Vec<NodeId> {
        self.sections.iter().map(|s| s.heading).collect()
    }

    /// Mark the first intersecting observed heading's link as current.
    pub(crate) fn on_intersection(&self, doc: &mut Document, entries: &[IntersectionEntry]) {
        let Some(heading) = entries
            .iter()
            .filter(|entry| entry.is_intersecting)
            .map(|entry| entry.target)
            .find(|target| self.sections.iter().any(|s| s.heading == *target))
        else {
            return;
        };

        for section in &self.sections {
            doc.toggle_class(section.link, CURRENT_CLASS, section.heading == heading);
        }
    }
}
