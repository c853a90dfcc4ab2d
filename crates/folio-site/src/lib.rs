//! Static site build for Folio.
//!
//! Turns a directory of markdown sources plus navigation documents into a
//! static HTML site:
//!
//! 1. [`Site::load`] scans sources and splits off [`FrontMatter`]
//! 2. [`MarkdownRenderer`] renders each body with heading anchors and a TOC
//! 3. [`template::render_page`] wraps it in the page shell
//! 4. the `folio-transform` pipeline post-processes the page
//! 5. [`SiteBuilder`] writes pages (in parallel) and passthrough files
//!
//! # Example
//!
//! ```
//! use folio_site::{MarkdownRenderer, Page};
//!
//! let page = Page::from_source("guide/intro.md", "---\ntitle: Intro\n---\n## Setup\n").unwrap();
//! assert_eq!(page.url(), "/guide/intro/");
//!
//! let rendered = MarkdownRenderer::default().render(page.body());
//! assert_eq!(rendered.toc[0].id, "setup");
//! ```

mod autolink;
mod builder;
mod front_matter;
mod markdown;
mod scanner;
mod site;
pub mod template;

use std::path::PathBuf;

use folio_config::ConfigError;
use folio_nav::NavError;
use folio_transform::PipelineError;

pub use builder::{BuildReport, SiteBuilder, transform_options};
pub use front_matter::{FrontMatter, split as split_front_matter};
pub use markdown::{MarkdownOptions, MarkdownRenderer, Rendered, TocEntry, slugify};
pub use site::{Page, Site};

/// Error returned when a single page cannot be built.
#[derive(Debug, thiserror::Error)]
pub enum PageError {
    /// A fatal transform stage failed.
    #[error(transparent)]
    Transform(#[from] PipelineError),
    /// The page could not be written.
    #[error("Failed to write {}: {source}", .path.display())]
    Write {
        /// Output file path.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

/// Error returned by a site build.
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    /// Configuration is invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// Navigation documents could not be loaded.
    #[error("Navigation error: {0}")]
    Navigation(#[from] NavError),
    /// A source or output path could not be read or written.
    #[error("I/O error at {}: {source}", .path.display())]
    Io {
        /// Path being accessed.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// A source could not be rendered.
    #[error("Failed to render {}: {message}", .path.display())]
    Render {
        /// Source path.
        path: PathBuf,
        /// What went wrong.
        message: String,
    },
    /// Some pages failed; the rest of the site was written.
    #[error("{} page(s) failed to build", .0.len())]
    Pages(Vec<PageError>),
}
