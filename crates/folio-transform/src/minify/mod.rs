//! HTML minification.
//!
//! Works on the parsed tree rather than on text, so markup is never
//! broken: comments are dropped, whitespace is collapsed outside
//! whitespace-sensitive elements and trimmed at block boundaries, and
//! embedded CSS, JavaScript and JSON are compacted conservatively.

mod css;
mod js;

use folio_dom::{Document, Namespace, NodeData, NodeId, SerializeOptions};

use crate::{PageMeta, Transform, TransformError};

/// Elements whose text is left exactly as authored.
const PRESERVE_WHITESPACE: &[&str] = &["pre", "textarea", "script", "style"];

/// Elements that start and end a line box; whitespace next to them is insignificant.
const BLOCK_ELEMENTS: &[&str] = &[
    "address", "article", "aside", "blockquote", "body", "caption", "col", "colgroup", "dd",
    "details", "dialog", "div", "dl", "dt", "fieldset", "figcaption", "figure", "footer", "form",
    "h1", "h2", "h3", "h4", "h5", "h6", "head", "header", "hgroup", "hr", "html", "li", "main",
    "menu", "nav", "ol", "optgroup", "option", "p", "pre", "section", "summary", "table", "tbody",
    "td", "tfoot", "th", "thead", "title", "tr", "ul",
];

/// Elements that render nothing in place. Whitespace on either side of them
/// still belongs to the surrounding line.
const NON_RENDERING_ELEMENTS: &[&str] = &[
    "base", "link", "meta", "noscript", "script", "style", "template",
];

/// Elements whose whitespace-only children never render.
const STRUCTURAL_ELEMENTS: &[&str] = &[
    "colgroup", "datalist", "dl", "head", "html", "ol", "optgroup", "select", "table", "tbody",
    "tfoot", "thead", "tr", "ul",
];

/// Removes comments and insignificant whitespace, and compacts embedded
/// stylesheets and scripts.
///
/// Comments starting with `!` (`<!--! ... -->`) and conditional comments
/// are kept. Minifying minified output is a no-op.
#[derive(Clone, Copy, Debug, Default)]
pub struct Minify;

impl Minify {
    /// Create the stage.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Transform for Minify {
    fn name(&self) -> &'static str {
        "minify"
    }

    fn apply(&self, html: &str, _meta: &PageMeta) -> Result<String, TransformError> {
        let mut doc = Document::parse(html)?;
        let scopes = scopes(&doc);

        for &scope in &scopes {
            remove_comments(&mut doc, scope);
        }
        doc.merge_adjacent_text(doc.root());
        for &scope in &scopes {
            collapse_whitespace(&mut doc, scope);
            minify_embedded(&mut doc, scope);
        }

        Ok(doc.to_html_with(SerializeOptions { short_doctype: true }))
    }
}

/// The document root plus every template's contents.
fn scopes(doc: &Document) -> Vec<NodeId> {
    let mut scopes = vec![doc.root()];
    let mut next = 0;
    while next < scopes.len() {
        let nested: Vec<NodeId> = doc
            .descendants(scopes[next])
            .filter_map(|id| doc.template_contents(id))
            .collect();
        scopes.extend(nested);
        next += 1;
    }
    scopes
}

fn remove_comments(doc: &mut Document, scope: NodeId) {
    let comments: Vec<NodeId> = doc
        .descendants(scope)
        .filter(|&id| matches!(doc.data(id), NodeData::Comment(text) if !is_preserved_comment(text)))
        .collect();
    for comment in comments {
        doc.detach(comment);
    }
}

fn is_preserved_comment(text: &str) -> bool {
    text.starts_with('!') || text.starts_with("[if ") || text.starts_with("<![endif]")
}

fn is_html_whitespace(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\n' | '\r' | '\x0C')
}

fn is_html_element(doc: &Document, id: NodeId, names: &[&str]) -> bool {
    doc.element(id)
        .is_some_and(|el| el.namespace == Namespace::Html && names.contains(&el.name.as_str()))
}

/// Whitespace next to this node (as parent or sibling) does not render.
fn is_block_boundary(doc: &Document, id: NodeId) -> bool {
    match doc.data(id) {
        NodeData::Document | NodeData::Fragment | NodeData::Doctype { .. } => true,
        NodeData::Element(_) => is_html_element(doc, id, BLOCK_ELEMENTS),
        NodeData::Text(_) | NodeData::Comment(_) => false,
    }
}

/// Comments and non-rendering elements are skipped when looking for the
/// node a text run actually touches.
fn is_transparent(doc: &Document, id: NodeId) -> bool {
    match doc.data(id) {
        NodeData::Comment(_) => true,
        NodeData::Element(_) => is_html_element(doc, id, NON_RENDERING_ELEMENTS),
        _ => false,
    }
}

/// First sibling in iteration order that renders, and whether any
/// transparent siblings were passed on the way. With `skip_blank`,
/// whitespace-only text counts as transparent too.
fn rendered_sibling<'a>(
    doc: &Document,
    siblings: impl Iterator<Item = &'a NodeId>,
    skip_blank: bool,
) -> (Option<NodeId>, bool) {
    let mut skipped = false;
    for &id in siblings {
        let blank = skip_blank && matches!(doc.data(id), NodeData::Text(t) if t.chars().all(is_html_whitespace));
        if !blank && !is_transparent(doc, id) {
            return (Some(id), skipped);
        }
        skipped = true;
    }
    (None, skipped)
}

fn collapse_whitespace(doc: &mut Document, scope: NodeId) {
    let texts: Vec<NodeId> = doc
        .descendants(scope)
        .filter(|&id| matches!(doc.data(id), NodeData::Text(_)))
        .collect();

    for id in texts {
        let Some(parent) = doc.parent(id) else {
            continue;
        };
        if doc.closest(parent, |el| el.namespace == Namespace::Html && PRESERVE_WHITESPACE.contains(&el.name.as_str())).is_some() {
            continue;
        }
        let NodeData::Text(text) = doc.data(id) else {
            continue;
        };

        if is_html_element(doc, parent, STRUCTURAL_ELEMENTS) && text.chars().all(is_html_whitespace) {
            doc.detach(id);
            continue;
        }

        let siblings = doc.children(parent);
        let pos = siblings.iter().position(|&s| s == id).unwrap_or_default();
        let (prev, skipped) = rendered_sibling(doc, siblings[..pos].iter().rev(), false);
        let trim_start = match prev {
            // Runs separated only by non-rendering nodes share one space.
            Some(prev) if skipped => {
                matches!(doc.data(prev), NodeData::Text(t) if t.ends_with(' ')) || is_block_boundary(doc, prev)
            }
            Some(prev) => is_block_boundary(doc, prev),
            None => is_block_boundary(doc, parent),
        };
        let trim_end = match rendered_sibling(doc, siblings[pos + 1..].iter(), true).0 {
            Some(next) => is_block_boundary(doc, next),
            None => is_block_boundary(doc, parent),
        };

        let mut collapsed = collapse(text);
        if trim_end && collapsed.ends_with(' ') {
            collapsed.pop();
        }
        if trim_start && collapsed.starts_with(' ') {
            collapsed.remove(0);
        }

        if collapsed.is_empty() {
            doc.detach(id);
        } else if let NodeData::Text(text) = doc.data_mut(id) {
            *text = collapsed;
        }
    }
}

/// Replace each run of HTML whitespace with a single space.
fn collapse(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_space = false;
    for c in text.chars() {
        if is_html_whitespace(c) {
            in_space = true;
        } else {
            if in_space {
                out.push(' ');
                in_space = false;
            }
            out.push(c);
        }
    }
    if in_space {
        out.push(' ');
    }
    out
}

fn minify_embedded(doc: &mut Document, scope: NodeId) {
    let targets: Vec<NodeId> = doc.select(scope, |el| el.is("style") || el.is("script"));

    for id in targets {
        let [text_node] = doc.children(id) else {
            continue;
        };
        let text_node = *text_node;
        let NodeData::Text(source) = doc.data(text_node) else {
            continue;
        };

        let minified = if doc.is_element(id, "style") {
            Some(css::minify(source))
        } else {
            match script_kind(doc.attr(id, "type")) {
                ScriptKind::JavaScript => Some(js::minify(source)),
                ScriptKind::Json => js::minify_json(source),
                ScriptKind::Other => None,
            }
        };

        if let Some(minified) = minified
            && let NodeData::Text(text) = doc.data_mut(text_node)
        {
            *text = minified;
        }
    }
}

enum ScriptKind {
    JavaScript,
    Json,
    Other,
}

fn script_kind(type_attr: Option<&str>) -> ScriptKind {
    let Some(kind) = type_attr.map(|t| t.trim().to_ascii_lowercase()) else {
        return ScriptKind::JavaScript;
    };
    match kind.as_str() {
        "" | "module" | "text/javascript" | "application/javascript" | "text/ecmascript" => ScriptKind::JavaScript,
        "application/json" | "application/ld+json" | "importmap" => ScriptKind::Json,
        _ => ScriptKind::Other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn minify(html: &str) -> String {
        Minify::new()
            .apply(html, &PageMeta::new("index.html", "/"))
            .unwrap()
    }

    const PAGE: &str = r#"<!DOCTYPE html>
<html lang="en">
  <head>
    <meta charset="utf-8">
    <title>  Getting   started  </title>
    <style>
      .nav  >  li { color : red ; }
    </style>
  </head>
  <body>
    <!-- main navigation -->
    <nav>
      <ul class="nav-child-level">
        <li> <a href="/a">A</a> </li>
        <li><a href="/b">B</a></li>
      </ul>
    </nav>
    <p>Some   <em>emphasized</em>
       text and <code>inline  code</code>.</p>
    <pre><code>  indented
      code
</code></pre>
    <!--! keep this -->
    <script>
      const a = 1;

      console.log(a);
    </script>
  </body>
</html>
"#;

    #[test]
    fn test_minify_page() {
        let output = minify(PAGE);

        assert_eq!(
            output,
            "<!doctype html><html lang=\"en\"><head><meta charset=\"utf-8\"><title>Getting started</title>\
             <style>.nav>li{color : red}</style></head><body><nav><ul class=\"nav-child-level\">\
             <li><a href=\"/a\">A</a></li><li><a href=\"/b\">B</a></li></ul></nav>\
             <p>Some <em>emphasized</em> text and <code>inline code</code>.</p>\
             <pre><code>  indented\n      code\n</code></pre><!--! keep this -->\
             <script>const a = 1;\nconsole.log(a);</script></body></html>"
        );
    }

    #[test]
    fn test_idempotent() {
        let once = minify(PAGE);

        assert_eq!(minify(&once), once);
    }

    #[test]
    fn test_rendered_text_preserved() {
        let doc = Document::parse(PAGE).unwrap();
        let min = Document::parse(&minify(PAGE)).unwrap();
        let pre = |d: &Document| d.text_content(d.elements_by_tag("pre")[0]);
        let words = |d: &Document| {
            d.text_content(d.elements_by_tag("p")[0])
                .split_whitespace()
                .collect::<Vec<_>>()
                .join(" ")
        };

        assert_eq!(pre(&min), pre(&doc));
        assert_eq!(words(&min), words(&doc));
    }

    /// Text as laid out: block elements start new lines, whitespace runs
    /// within a line count once, non-rendering elements contribute nothing.
    fn rendered_text(html: &str) -> String {
        fn walk(doc: &Document, id: NodeId, out: &mut String) {
            for &child in doc.children(id) {
                match doc.data(child) {
                    NodeData::Text(text) => {
                        out.extend(text.chars().map(|c| if is_html_whitespace(c) { ' ' } else { c }));
                    }
                    NodeData::Element(_) if is_html_element(doc, child, NON_RENDERING_ELEMENTS) => {}
                    NodeData::Element(_) => {
                        let block = is_html_element(doc, child, BLOCK_ELEMENTS);
                        if block {
                            out.push('\n');
                        }
                        walk(doc, child, out);
                        if block {
                            out.push('\n');
                        }
                    }
                    _ => {}
                }
            }
        }

        let doc = Document::parse(html).unwrap();
        let mut out = String::new();
        walk(&doc, doc.root(), &mut out);
        out.lines()
            .map(|line| line.split_whitespace().collect::<Vec<_>>().join(" "))
            .filter(|line| !line.is_empty())
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn raw_text(html: &str, tag: &str) -> Vec<String> {
        let doc = Document::parse(html).unwrap();
        doc.elements_by_tag(tag).into_iter().map(|id| doc.text_content(id)).collect()
    }

    #[test]
    fn test_inline_script_keeps_word_space() {
        let output = minify("<p>Hello <script>track()</script> world</p>");

        assert!(output.contains("<p>Hello <script>track()</script>world</p>"));
        assert_eq!(rendered_text(&output), "Hello world");
    }

    #[test]
    fn test_inline_template_keeps_word_space() {
        let output = minify("<p>a<template> <b> t </b> </template> b</p>");

        assert!(output.contains("<p>a<template><b> t </b></template> b</p>"));
        assert_eq!(rendered_text(&output), "a b");
    }

    #[test]
    fn test_single_space_across_non_rendering_elements() {
        let output = minify("<p>one <link rel=\"x\"> <meta name=\"y\"> <!--! k --> two</p>");

        assert!(output.contains("<p>one <link rel=\"x\"><meta name=\"y\"><!--! k -->two</p>"));
    }

    #[test]
    fn test_minify_cases_idempotent_and_text_preserving() {
        let cases = [
            ("inline and block mix", "<div>text <span>in</span> <div>block</div> tail </div>"),
            ("inline elements", "<p>Read <a href=\"/a\">the <em>docs</em></a> , then <code>run</code>.</p>"),
            ("comment between words", "<p>a<!-- note --> b <!-- note -->c</p>"),
            ("comment between blocks", "<div>a</div> <!-- x --> <div>b</div>"),
            ("script between words", "<p>Hello <script>track()</script> world</p>"),
            ("script before block", "<div><span>x</span> <script>1</script> <p>y</p></div>"),
            ("style in body", "<p>x <style>p { color: red }</style> y</p>"),
            ("template contents", "<p>a<template> <b> t </b> </template> b</p>"),
            (
                "table",
                "<table>\n <thead> <tr> <th> Name </th> <th>Value</th> </tr> </thead>\n <tbody>\n  <tr><td> a  b </td>\n<td><em>c</em> d</td></tr>\n </tbody>\n</table>",
            ),
            ("list", "<ul>\n  <li> one </li>\n  <li>two <b>bold</b> </li>\n</ul>"),
            ("pre with leading newlines", "<p>code:</p>\n<pre>\n\n  first\n   second  \n</pre>"),
            ("textarea with leading newline", "<form> <textarea>\n\n  keep   this</textarea> </form>"),
        ];

        for (name, html) in cases {
            let once = minify(html);

            assert_eq!(minify(&once), once, "not idempotent: {name}");
            assert_eq!(rendered_text(&once), rendered_text(html), "rendered text changed: {name}");
            for tag in ["pre", "textarea"] {
                assert_eq!(raw_text(&once, tag), raw_text(html, tag), "{tag} text changed: {name}");
            }
        }
    }

    #[test]
    fn test_inline_whitespace_kept() {
        let output = minify("<p><a href=\"/a\">A</a> <a href=\"/b\">B</a></p>");

        assert!(output.contains("<a href=\"/a\">A</a> <a href=\"/b\">B</a>"));
    }

    #[test]
    fn test_non_breaking_space_is_not_whitespace() {
        let output = minify("<p>\u{a0}a\u{a0}</p>");

        assert!(output.contains("<p>\u{a0}a\u{a0}</p>"));
    }

    #[test]
    fn test_template_contents_minified() {
        let output = minify(
            "<template id=\"copy-button-template\">\n  <div class=\"copy\">\n    <button data-purpose=\"copy\">Copy</button>\n  </div>\n</template>",
        );

        assert!(output.contains(
            "<template id=\"copy-button-template\"><div class=\"copy\"><button data-purpose=\"copy\">Copy</button></div></template>"
        ));
    }

    #[test]
    fn test_conditional_comment_kept() {
        let output = minify("<p>a</p><!--[if IE]><p>old</p><![endif]-->");

        assert!(output.contains("<!--[if IE]><p>old</p><![endif]-->"));
    }

    #[test]
    fn test_json_script_compacted() {
        let output = minify(
            "<script type=\"application/ld+json\">\n{\n  \"b\": 1,\n  \"a\": [1, 2]\n}\n</script>",
        );

        assert!(output.contains(r#"<script type="application/ld+json">{"b":1,"a":[1,2]}</script>"#));
    }

    #[test]
    fn test_unknown_script_type_untouched() {
        let output = minify("<script type=\"text/x-template\">\n  <b>hi</b>\n</script>");

        assert!(output.contains("<script type=\"text/x-template\">\n  <b>hi</b>\n</script>"));
    }

    #[test]
    fn test_textarea_untouched() {
        let output = minify("<textarea>  a\n\n  b</textarea>");

        assert!(output.contains("<textarea>  a\n\n  b</textarea>"));
    }

    #[test]
    fn test_collapse() {
        assert_eq!(collapse("  a \n\t b  "), " a b ");
        assert_eq!(collapse("\n\n"), " ");
        assert_eq!(collapse("ab"), "ab");
    }
}
