//! Page behavior controller for Folio sites.
//!
//! [`Page`] attaches the interactive behavior a rendered page receives
//! after load and handles [`Event`]s against its document:
//!
//! - copy buttons on `pre > code` blocks (from `#copy-button-template`)
//! - the `.hamburger-activate` side bar toggle
//! - accordion disclosure of child and grandchild navigation lists
//! - scroll-spy marking the current `#in-page-toc` entry
//! - opening `<details>` targeted by the location fragment
//! - a modal iframe opened by `[data-modal-src]` triggers
//! - forcing links to open in the same tab
//!
//! Missing page structure never fails a page: the affected behavior is
//! skipped and a diagnostic is logged.
//!
//! This crate is a reference model of the browser behavior, not the
//! script pages load. `folio build` only emits the DOM contract these
//! controllers read (templates, opener buttons, `#in-page-toc`) and a
//! `<script>` tag pointing at `site.script`; the JavaScript served there
//! is supplied by the site and must behave as modeled here. No other
//! workspace crate depends on this one; its tests pin the behavior down
//! against documents shaped like the page shell output.
//!
//! # Example
//!
//! ```
//! use folio_client::{ClientOptions, Event, Page, RecordingClipboard};
//!
//! let html = r#"<details id="faq"><summary>FAQ</summary>Answer</details>"#;
//! let mut page = Page::parse(html, "", RecordingClipboard::new(), &ClientOptions::default()).unwrap();
//!
//! page.dispatch(Event::HashChange("#faq".to_owned()));
//!
//! let details = page.document().element_by_id("faq").unwrap();
//! assert!(page.document().attr(details, "open").is_some());
//! ```

mod clipboard;
mod copy;
mod disclosure;
mod events;
mod fragment;
mod links;
mod menu;
mod modal;
mod page;
mod scroll_spy;

pub use clipboard::{Clipboard, ClipboardError, RecordingClipboard};
pub use events::{Event, IntersectionEntry};
pub use page::{ClientOptions, Page};
