//! Syntax highlighting of `<pre><code>` blocks with syntect.

use std::sync::LazyLock;

use folio_dom::{Document, NodeId};
use syntect::html::{ClassStyle, ClassedHTMLGenerator};
use syntect::parsing::{SyntaxReference, SyntaxSet};
use syntect::util::LinesWithEndings;

use crate::{PageMeta, Transform, TransformError};

/// Default class prefix of highlighted token spans.
pub const DEFAULT_CLASS_PREFIX: &str = "hl-";

/// Marker class added to highlighted `pre` elements.
const CONTAINER_CLASS: &str = "hljs-container";
/// Marker class added to highlighted `code` elements.
const CODE_CLASS: &str = "hljs";
/// Blocks inside this class are program output and left alone.
const OUTPUT_BLOCK_CLASS: &str = "output-block";

static SYNTAX_SET: LazyLock<SyntaxSet> = LazyLock::new(SyntaxSet::load_defaults_newlines);

/// Highlights every `pre` containing a `code` element.
///
/// The grammar comes from a `language-<token>` class on the `code` or
/// `pre` element. Unknown or missing hints fall back to first-line
/// detection, then plain text.
///
/// First-line detection only recognizes what a grammar declares for its
/// opening line: shebangs (`#!/bin/bash`, `#!/usr/bin/env python`), XML
/// declarations, `<?php` and the like. There is no guessing from the body,
/// so an unhinted block that opens with ordinary code is rendered as plain
/// text (still wrapped and marked as highlighted).
#[derive(Clone, Debug)]
pub struct SyntaxHighlight {
    class_prefix: String,
}

impl Default for SyntaxHighlight {
    fn default() -> Self {
        Self::new(DEFAULT_CLASS_PREFIX)
    }
}

impl SyntaxHighlight {
    /// Create the stage with a class prefix for token spans.
    #[must_use]
    pub fn new(class_prefix: &str) -> Self {
        Self {
            class_prefix: class_prefix.to_owned(),
        }
    }

    /// Load the syntax definitions ahead of the first page.
    pub fn warm_up() {
        LazyLock::force(&SYNTAX_SET);
    }

    fn highlight_block(&self, doc: &mut Document, pre: NodeId, code: NodeId) -> Result<(), TransformError> {
        let source = doc.text_content(code);
        let hint = language_hint(doc, code).or_else(|| language_hint(doc, pre));
        let syntax = find_syntax(hint.as_deref(), &source);

        let markup = highlight(&source, syntax)?;
        doc.set_inner_html(code, &markup)?;
        for span in doc.select(code, |el| el.is("span")) {
            if let Some(el) = doc.element_mut(span) {
                let prefixed = el
                    .classes()
                    .map(|class| format!("{}{class}", self.class_prefix))
                    .collect::<Vec<_>>()
                    .join(" ");
                el.set_attr("class", prefixed);
            }
        }

        doc.add_class(pre, CONTAINER_CLASS);
        doc.add_class(code, CODE_CLASS);
        Ok(())
    }
}

impl Transform for SyntaxHighlight {
    fn name(&self) -> &'static str {
        "syntax-highlight"
    }

    fn apply(&self, html: &str, meta: &PageMeta) -> Result<String, TransformError> {
        let mut doc = Document::parse(html)?;
        let blocks: Vec<(NodeId, NodeId)> = doc
            .elements_by_tag("pre")
            .into_iter()
            .filter(|&pre| doc.closest(pre, |el| el.has_class(OUTPUT_BLOCK_CLASS)).is_none())
            .filter_map(|pre| doc.select_first(pre, |el| el.is("code")).map(|code| (pre, code)))
            .collect();

        if blocks.is_empty() {
            return Ok(html.to_owned());
        }

        for &(pre, code) in &blocks {
            self.highlight_block(&mut doc, pre, code)?;
        }
        tracing::debug!(path = %meta.output_path.display(), blocks = blocks.len(), "Highlighted code blocks");

        Ok(doc.to_html())
    }
}

fn language_hint(doc: &Document, id: NodeId) -> Option<String> {
    doc.element(id)?
        .classes()
        .find_map(|class| class.strip_prefix("language-").or_else(|| class.strip_prefix("lang-")))
        .filter(|lang| !lang.is_empty())
        .map(str::to_owned)
}

fn find_syntax(hint: Option<&str>, source: &str) -> &'static SyntaxReference {
    let syntaxes: &'static SyntaxSet = &SYNTAX_SET;

    if let Some(lang) = hint {
        if let Some(syntax) = syntaxes
            .find_syntax_by_token(lang)
            .or_else(|| syntaxes.find_syntax_by_token(&lang.to_ascii_lowercase()))
        {
            return syntax;
        }
        tracing::debug!(language = lang, "Unknown language, detecting from content");
    }

    source
        .lines()
        .next()
        .and_then(|line| syntaxes.find_syntax_by_first_line(line))
        .unwrap_or_else(|| syntaxes.find_syntax_plain_text())
}

fn highlight(source: &str, syntax: &SyntaxReference) -> Result<String, TransformError> {
    let mut generator = ClassedHTMLGenerator::new_with_class_style(syntax, &SYNTAX_SET, ClassStyle::Spaced);
    for line in LinesWithEndings::from(source) {
        generator
            .parse_html_for_line_which_includes_newline(line)
            .map_err(|e| TransformError::Highlight {
                language: syntax.name.clone(),
                message: e.to_string(),
            })?;
    }
    Ok(generator.finalize())
}
