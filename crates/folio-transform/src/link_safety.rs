//! `rel` hardening for links that open a new browsing context.

use folio_dom::{Document, Element};

use crate::{PageMeta, Transform, TransformError, TransformPolicy};

/// Adds `rel` tokens (default `noopener noreferrer`) to `a` and `area`
/// elements with `target="_blank"`.
///
/// Author tokens are kept in place and new tokens are appended. A link
/// that asks for `opener` does not receive `noopener`.
#[derive(Clone, Debug)]
pub struct LinkSafety {
    rel: Vec<String>,
}

impl Default for LinkSafety {
    fn default() -> Self {
        Self::new(vec!["noopener".to_owned(), "noreferrer".to_owned()])
    }
}

impl LinkSafety {
    /// Create the stage with the tokens to merge.
    #[must_use]
    pub fn new(rel: Vec<String>) -> Self {
        Self { rel }
    }
}

impl Transform for LinkSafety {
    fn name(&self) -> &'static str {
        "link-safety"
    }

    fn policy(&self) -> TransformPolicy {
        TransformPolicy::FailOpen
    }

    fn apply(&self, html: &str, _meta: &PageMeta) -> Result<String, TransformError> {
        let mut doc = Document::parse(html)?;
        let links = doc.select(doc.root(), opens_new_context);
        let mut changed = false;

        for link in links {
            if let Some(rel) = merge_rel(doc.attr(link, "rel"), &self.rel) {
                doc.set_attr(link, "rel", rel);
                changed = true;
            }
        }

        if changed {
            Ok(doc.to_html())
        } else {
            Ok(html.to_owned())
        }
    }
}

fn opens_new_context(el: &Element) -> bool {
    (el.is("a") || el.is("area"))
        && el
            .attr("target")
            .is_some_and(|target| target.trim().eq_ignore_ascii_case("_blank"))
}

/// Merged `rel` value, or `None` if nothing needs adding.
fn merge_rel(existing: Option<&str>, required: &[String]) -> Option<String> {
    let mut tokens: Vec<&str> = existing.unwrap_or_default().split_ascii_whitespace().collect();
    let wants_opener = has_token(&tokens, "opener");
    let before = tokens.len();

    for token in required {
        if token.eq_ignore_ascii_case("noopener") && wants_opener {
            continue;
        }
        if !has_token(&tokens, token) {
            tokens.push(token.as_str());
        }
    }

    (tokens.len() != before).then(|| tokens.join(" "))
}

fn has_token(tokens: &[&str], token: &str) -> bool {
    tokens.iter().any(|t| t.eq_ignore_ascii_case(token))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn apply(html: &str) -> String {
        LinkSafety::default()
            .apply(html, &PageMeta::new("index.html", "/"))
            .unwrap()
    }

    fn rel_of(html: &str) -> Vec<Option<String>> {
        let doc = Document::parse(html).unwrap();
        doc.select(doc.root(), |el| el.is("a") || el.is("area"))
            .into_iter()
            .map(|id| doc.attr(id, "rel").map(str::to_owned))
            .collect()
    }

    #[test]
    fn test_adds_rel_to_blank_target() {
        let output = apply(r#"<a href="https://example.com" target="_blank">x</a>"#);

        assert_eq!(rel_of(&output), vec![Some("noopener noreferrer".to_owned())]);
    }

    #[test]
    fn test_keeps_author_tokens() {
        let output = apply(r#"<a href="/x" target="_blank" rel="nofollow noreferrer">x</a>"#);

        assert_eq!(rel_of(&output), vec![Some("nofollow noreferrer noopener".to_owned())]);
    }

    #[test]
    fn test_target_is_case_insensitive() {
        let output = apply(r#"<a href="/x" target="_BLANK">x</a>"#);

        assert_eq!(rel_of(&output), vec![Some("noopener noreferrer".to_owned())]);
    }

    #[test]
    fn test_opener_opts_out_of_noopener() {
        let output = apply(r#"<a href="/x" target="_blank" rel="opener">x</a>"#);

        assert_eq!(rel_of(&output), vec![Some("opener noreferrer".to_owned())]);
    }

    #[test]
    fn test_area_elements() {
        let output = apply(
            r#"<map name="m"><area href="/x" target="_blank" alt="x"></map><a href="/y">y</a>"#,
        );

        assert_eq!(rel_of(&output), vec![Some("noopener noreferrer".to_owned()), None]);
    }

    #[test]
    fn test_unchanged_input_returned_verbatim() {
        let html = "<p>  <a href=\"/x\">same tab</a>  </p>";

        assert_eq!(apply(html), html);
    }

    #[test]
    fn test_complete_rel_left_alone() {
        let html = r#"<a href="/x" target="_blank" rel="NOOPENER noreferrer">x</a>"#;

        assert_eq!(apply(html), html);
    }

    #[test]
    fn test_too_deep_markup_is_an_error() {
        let html = "<div>".repeat(folio_dom::MAX_DEPTH + 1);

        let result = LinkSafety::default().apply(&html, &PageMeta::new("index.html", "/"));

        assert!(matches!(result, Err(TransformError::Dom(_))));
    }

    #[test]
    fn test_merge_rel_custom_tokens() {
        let required = vec!["noopener".to_owned(), "external".to_owned()];

        assert_eq!(merge_rel(None, &required), Some("noopener external".to_owned()));
        assert_eq!(merge_rel(Some("external noopener"), &required), None);
    }
}
