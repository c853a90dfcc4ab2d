//! Markdown rendering with heading anchors and an in-page table of contents.
//!
//! Events come from pulldown-cmark and are written with its HTML writer,
//! except headings: those are buffered so their text can become an id, a
//! permalink anchor and a TOC entry.

use std::collections::{HashMap, HashSet};
use std::fmt::Write;

use folio_config::MarkdownConfig;
use pulldown_cmark::{Event, HeadingLevel, Options, Parser, Tag, TagEnd, TextMergeStream, html};
use serde::Serialize;

use crate::autolink::Autolink;

/// Table of contents entry.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TocEntry {
    /// Heading level (1-6).
    pub level: u8,
    /// Heading text.
    pub title: String,
    /// Anchor id.
    pub id: String,
}

/// Result of rendering one markdown document.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Rendered {
    /// Rendered HTML.
    pub html: String,
    /// Text of the first H1, if any.
    pub title: Option<String>,
    /// Headings of the configured TOC levels, in document order.
    pub toc: Vec<TocEntry>,
}

/// Markdown rendering options.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MarkdownOptions {
    /// Render soft line breaks as `<br />`.
    pub hard_breaks: bool,
    /// Typographic quotes, dashes and ellipses.
    pub smart_punctuation: bool,
    /// Link bare URLs and email addresses.
    pub linkify: bool,
    /// Heading levels that get an id and a permalink.
    pub anchor_levels: Vec<u8>,
    /// Class of the permalink anchor.
    pub permalink_class: String,
    /// Text of the permalink anchor.
    pub permalink_symbol: String,
    /// Heading levels listed in the TOC.
    pub toc_levels: Vec<u8>,
}

impl Default for MarkdownOptions {
    fn default() -> Self {
        Self::from(&MarkdownConfig::default())
    }
}

impl From<&MarkdownConfig> for MarkdownOptions {
    fn from(config: &MarkdownConfig) -> Self {
        Self {
            hard_breaks: config.hard_breaks,
            smart_punctuation: config.smart_punctuation,
            linkify: config.linkify,
            anchor_levels: config.anchor_levels.clone(),
            permalink_class: config.permalink_class.clone(),
            permalink_symbol: config.permalink_symbol.clone(),
            toc_levels: config.toc_levels.clone(),
        }
    }
}

/// Markdown to HTML renderer.
///
/// Stateless between documents; one renderer can be shared across threads.
#[derive(Clone, Debug, Default)]
pub struct MarkdownRenderer {
    options: MarkdownOptions,
}

/// Heading being buffered.
struct Heading<'a> {
    level: u8,
    events: Vec<Event<'a>>,
}

impl MarkdownRenderer {
    /// Create a renderer.
    #[must_use]
    pub fn new(options: MarkdownOptions) -> Self {
        Self { options }
    }

    /// Parser options: GFM plus optional smart punctuation.
    #[must_use]
    pub fn parser_options(&self) -> Options {
        let mut options = Options::ENABLE_TABLES
            | Options::ENABLE_STRIKETHROUGH
            | Options::ENABLE_TASKLISTS
            | Options::ENABLE_GFM;
        if self.options.smart_punctuation {
            options |= Options::ENABLE_SMART_PUNCTUATION;
        }
        options
    }

    /// Render a markdown document.
    pub fn render(&self, markdown: &str) -> Rendered {
        let mut output = String::with_capacity(markdown.len() * 3 / 2);
        let mut ids = HeadingIds::default();
        let mut toc = Vec::new();
        let mut title = None;

        let mut pending: Vec<Event<'_>> = Vec::new();
        let mut heading: Option<Heading<'_>> = None;

        let parser = TextMergeStream::new(Parser::new_ext(markdown, self.parser_options()));
        let events: Box<dyn Iterator<Item = Event<'_>> + '_> = if self.options.linkify {
            Box::new(Autolink::new(parser))
        } else {
            Box::new(parser)
        };

        for event in events {
            let event = match event {
                Event::SoftBreak if self.options.hard_breaks => Event::HardBreak,
                event => event,
            };
            match event {
                Event::Start(Tag::Heading { level, .. }) => {
                    html::push_html(&mut output, pending.drain(..));
                    heading = Some(Heading {
                        level: level_to_num(level),
                        events: Vec::new(),
                    });
                }
                Event::End(TagEnd::Heading(_)) => {
                    let Some(heading) = heading.take() else {
                        continue;
                    };
                    let text = plain_text(&heading.events);
                    if heading.level == 1 && title.is_none() {
                        title = Some(text.clone());
                    }
                    let mut inner = String::new();
                    html::push_html(&mut inner, heading.events.into_iter());
                    if let Some(entry) = self.write_heading(&mut output, heading.level, &text, &inner, &mut ids)
                        && self.options.toc_levels.contains(&entry.level)
                    {
                        toc.push(entry);
                    }
                }
                event => match heading.as_mut() {
                    Some(heading) => heading.events.push(event),
                    None => pending.push(event),
                },
            }
        }
        html::push_html(&mut output, pending.into_iter());

        Rendered {
            html: output,
            title,
            toc,
        }
    }

    /// Write a heading. Returns its TOC entry if it was given an id.
    fn write_heading(
        &self,
        output: &mut String,
        level: u8,
        text: &str,
        inner: &str,
        ids: &mut HeadingIds,
    ) -> Option<TocEntry> {
        let inner = inner.trim();
        if !self.options.anchor_levels.contains(&level) {
            let _ = writeln!(output, "<h{level}>{inner}</h{level}>");
            return None;
        }

        let id = ids.generate(text);
        let _ = writeln!(
            output,
            r##"<h{level} id="{id}">{inner} <a class="{class}" href="#{id}" aria-hidden="true">{symbol}</a></h{level}>"##,
            id = html_escape::encode_double_quoted_attribute(&id),
            class = html_escape::encode_double_quoted_attribute(&self.options.permalink_class),
            symbol = html_escape::encode_text(&self.options.permalink_symbol),
        );
        Some(TocEntry {
            level,
            title: text.to_owned(),
            id,
        })
    }
}

fn level_to_num(level: HeadingLevel) -> u8 {
    match level {
        HeadingLevel::H1 => 1,
        HeadingLevel::H2 => 2,
        HeadingLevel::H3 => 3,
        HeadingLevel::H4 => 4,
        HeadingLevel::H5 => 5,
        HeadingLevel::H6 => 6,
    }
}

/// Text of buffered inline events, markup dropped.
fn plain_text(events: &[Event<'_>]) -> String {
    let mut text = String::new();
    for event in events {
        match event {
            Event::Text(t) | Event::Code(t) => text.push_str(t),
            Event::SoftBreak | Event::HardBreak => text.push(' '),
            _ => {}
        }
    }
    text.trim().to_owned()
}

/// Unique heading ids within one document.
#[derive(Default)]
struct HeadingIds {
    counts: HashMap<String, usize>,
    used: HashSet<String>,
}

impl HeadingIds {
    /// Slugify `text`, suffixing `-1`, `-2`, ... on collision.
    fn generate(&mut self, text: &str) -> String {
        let mut base = slugify(text);
        if base.is_empty() {
            base.push_str("section");
        }

        let count = self.counts.entry(base.clone()).or_default();
        let mut id = match *count {
            0 => base.clone(),
            n => format!("{base}-{n}"),
        };
        while self.used.contains(&id) {
            *count += 1;
            id = format!("{base}-{count}");
        }
        *count += 1;
        self.used.insert(id.clone());
        id
    }
}

/// Convert heading text to an id.
///
/// Lowercases letters and digits (any script), turns whitespace, `-` and `_`
/// runs into a single dash and drops everything else.
#[must_use]
pub fn slugify(text: &str) -> String {
    let mut result = String::new();
    let mut last_was_dash = true;

    for c in text.trim().chars() {
        if c.is_alphanumeric() {
            result.extend(c.to_lowercase());
            last_was_dash = false;
        } else if !last_was_dash && (c.is_whitespace() || c == '-' || c == '_') {
            result.push('-');
            last_was_dash = true;
        }
    }

    if result.ends_with('-') {
        result.pop();
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn render(markdown: &str) -> Rendered {
        MarkdownRenderer::default().render(markdown)
    }

    #[test]
    fn test_heading_gets_id_and_permalink() {
        let result = render("## Getting Started");

        assert_eq!(
            result.html,
            "<h2 id=\"getting-started\">Getting Started <a class=\"anchor-link\" href=\"#getting-started\" aria-hidden=\"true\">#</a></h2>\n"
        );
    }

    #[test]
    fn test_bare_urls_linked() {
        let result = render("Docs live at https://docs.example.com/guide.");

        assert_eq!(
            result.html,
            "<p>Docs live at <a href=\"https://docs.example.com/guide\">https://docs.example.com/guide</a>.</p>\n"
        );
    }

    #[test]
    fn test_linkify_disabled() {
        let renderer = MarkdownRenderer::new(MarkdownOptions {
            linkify: false,
            ..MarkdownOptions::default()
        });

        let result = renderer.render("Docs live at https://docs.example.com/guide.");

        assert!(!result.html.contains("<a "));
    }

    #[test]
    fn test_heading_outside_anchor_levels_is_plain() {
        let result = render("##### Fine print");

        assert_eq!(result.html, "<h5>Fine print</h5>\n");
        assert!(result.toc.is_empty());
    }

    #[test]
    fn test_toc_collects_configured_levels() {
        let result = render("# Guide\n\n## Install\n\n### Linux\n\n## Usage\n");

        assert_eq!(
            result.toc,
            vec![
                TocEntry { level: 2, title: "Install".to_owned(), id: "install".to_owned() },
                TocEntry { level: 3, title: "Linux".to_owned(), id: "linux".to_owned() },
                TocEntry { level: 2, title: "Usage".to_owned(), id: "usage".to_owned() },
            ]
        );
        assert_eq!(result.title.as_deref(), Some("Guide"));
    }

    #[test]
    fn test_duplicate_heading_ids() {
        let result = render("## Notes\n\n## Notes\n\n## Notes-1\n");

        let ids: Vec<_> = result.toc.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["notes", "notes-1", "notes-1-1"]);
    }

    #[test]
    fn test_heading_with_inline_code() {
        let result = render("## The `build` command");

        assert!(result.html.contains("The <code>build</code> command <a"));
        assert_eq!(result.toc[0].title, "The build command");
        assert_eq!(result.toc[0].id, "the-build-command");
    }

    #[test]
    fn test_heading_without_letters_gets_fallback_id() {
        let result = render("## ???");

        assert_eq!(result.toc[0].id, "section");
    }

    #[test]
    fn test_soft_breaks_become_line_breaks() {
        let result = render("first\nsecond");

        assert_eq!(result.html, "<p>first<br />\nsecond</p>\n");
    }

    #[test]
    fn test_soft_breaks_kept_when_disabled() {
        let renderer = MarkdownRenderer::new(MarkdownOptions {
            hard_breaks: false,
            ..MarkdownOptions::default()
        });

        assert_eq!(renderer.render("first\nsecond").html, "<p>first\nsecond</p>\n");
    }

    #[test]
    fn test_smart_punctuation() {
        let result = render("\"quoted\" -- done...");

        assert!(result.html.contains('\u{201c}'));
        assert!(result.html.contains('\u{2013}'));
        assert!(result.html.contains('\u{2026}'));
    }

    #[test]
    fn test_fenced_code_keeps_language_class() {
        let result = render("```rust\nfn main() {}\n```");

        assert_eq!(
            result.html,
            "<pre><code class=\"language-rust\">fn main() {}\n</code></pre>\n"
        );
    }

    #[test]
    fn test_raw_html_passes_through() {
        let result = render("<details id=\"faq\"><summary>FAQ</summary>Answer</details>\n");

        assert!(result.html.contains("<details id=\"faq\">"));
    }

    #[test]
    fn test_gfm_table() {
        let result = render("| a | b |\n|---|---|\n| 1 | 2 |\n");

        assert!(result.html.contains("<table>"));
        assert!(result.html.contains("<td>1</td>"));
    }

    #[test]
    fn test_custom_permalink() {
        let renderer = MarkdownRenderer::new(MarkdownOptions {
            permalink_class: "permalink".to_owned(),
            permalink_symbol: "¶".to_owned(),
            ..MarkdownOptions::default()
        });

        let result = renderer.render("# Title");

        assert!(result.html.contains(r##"<a class="permalink" href="#title" aria-hidden="true">¶</a>"##));
    }

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Hello World"), "hello-world");
        assert_eq!(slugify("  Trim me  "), "trim-me");
        assert_eq!(slugify("snake_case and-dash"), "snake-case-and-dash");
        assert_eq!(slugify("What's new?"), "whats-new");
        assert_eq!(slugify("Café Überblick"), "café-überblick");
        assert_eq!(slugify("--"), "");
    }
}
