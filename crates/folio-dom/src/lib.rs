//! HTML document arena for Folio.
//!
//! [`Document`] parses markup with html5ever into a flat arena of nodes
//! addressed by [`NodeId`], offers the small set of queries and mutations
//! the build transforms and the page controllers need, and serializes the
//! tree back to HTML.
//!
//! # Example
//!
//! ```
//! use folio_dom::Document;
//!
//! let mut doc = Document::parse(r#"<a href="/x" target="_blank">x</a>"#).unwrap();
//! let link = doc.elements_by_tag("a")[0];
//! doc.set_attr(link, "rel", "noopener");
//!
//! let body = doc.elements_by_tag("body")[0];
//! assert_eq!(
//!     doc.inner_html(body),
//!     r#"<a href="/x" target="_blank" rel="noopener">x</a>"#
//! );
//! ```

mod document;
mod node;
mod parse;
mod serialize;

pub use document::{Descendants, Document};
pub use node::{Attribute, Element, Namespace, NodeData, NodeId};
pub use parse::MAX_DEPTH;
pub use serialize::SerializeOptions;

/// Error returned when markup cannot be turned into a [`Document`].
#[derive(Debug, thiserror::Error)]
pub enum DomError {
    /// Elements nest deeper than [`MAX_DEPTH`].
    #[error("HTML nesting exceeds {max} levels")]
    TooDeep {
        /// Maximum accepted depth.
        max: usize,
    },
}
