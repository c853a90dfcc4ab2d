//! Navigation tree model for Folio.
//!
//! This crate provides:
//! - [`NavCollection`]: a normalized navigation tree built from raw link
//!   configuration, with [`NavCollection::get_active_parent_link`] lookup
//! - [`Navigation`]: the main, header and footer collections loaded once per build
//! - [`SectionIndex`]: pages grouped by `section` and `subsection`
//!
//! # Example
//!
//! ```
//! use folio_nav::NavCollection;
//! use serde_json::json;
//!
//! let raw = json!({
//!     "links": [
//!         {"url": "/docs", "label": "Docs", "children": [
//!             {"url": "/docs/start", "label": "Start", "children": [
//!                 {"url": "/docs/start/intro", "label": "Intro"}
//!             ]}
//!         ]}
//!     ]
//! });
//! let nav = NavCollection::build("main", &raw).unwrap();
//!
//! let active = nav.get_active_parent_link("/docs/start/intro").unwrap();
//! assert_eq!(active.url(), "/docs");
//! assert!(nav.get_active_parent_link("/").is_none());
//! ```

mod index;
mod link;
mod loader;

use std::path::PathBuf;

pub use index::{SectionGroup, SectionIndex, Sectioned, SubsectionGroup};
pub use link::{NavCollection, NavLink};
pub use loader::Navigation;

/// Error returned when navigation configuration cannot be built.
///
/// All variants are build-time fatal.
#[derive(Debug, thiserror::Error)]
pub enum NavError {
    /// Navigation file could not be read.
    #[error("Failed to read navigation file {}: {source}", .path.display())]
    Io {
        /// Path of the navigation file.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// Navigation file is not valid JSON or YAML.
    #[error("Failed to parse navigation file {}: {message}", .path.display())]
    Parse {
        /// Path of the navigation file.
        path: PathBuf,
        /// Parser error message.
        message: String,
    },
    /// Navigation data has the wrong shape.
    #[error("Invalid navigation entry at {location}: {message}")]
    Malformed {
        /// Location of the offending entry (e.g., "`main.links[2].children[0]`").
        location: String,
        /// What is wrong with the entry.
        message: String,
    },
}
