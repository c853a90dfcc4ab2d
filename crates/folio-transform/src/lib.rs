//! Post-render transform pipeline for Folio pages.
//!
//! Every rendered page flows through an ordered [`Pipeline`] of
//! [`Transform`] stages before it is written:
//!
//! 1. [`LinkSafety`]: adds `rel` tokens to links that open a new browsing context
//! 2. [`SyntaxHighlight`]: highlights `<pre><code>` blocks with syntect
//! 3. [`Minify`]: strips comments and insignificant whitespace
//!
//! Each stage consumes and returns the full page text. A stage that fails
//! either passes the content through ([`TransformPolicy::FailOpen`]) or
//! fails the page ([`TransformPolicy::Fatal`]).
//!
//! # Example
//!
//! ```
//! use folio_transform::{PageMeta, Pipeline, TransformOptions};
//!
//! let pipeline = Pipeline::standard(&TransformOptions::default());
//! let meta = PageMeta::new("guide/index.html", "/guide/");
//!
//! let html = pipeline
//!     .apply_all(r#"<p>  <a href="https://example.com" target="_blank">out</a>  </p>"#, &meta)
//!     .unwrap();
//! assert!(html.contains(r#"rel="noopener noreferrer""#));
//! ```

mod highlight;
mod link_safety;
mod minify;

use std::path::PathBuf;

use folio_dom::DomError;

pub use highlight::{DEFAULT_CLASS_PREFIX, SyntaxHighlight};
pub use link_safety::LinkSafety;
pub use minify::Minify;

/// Error returned by a single transform stage.
#[derive(Debug, thiserror::Error)]
pub enum TransformError {
    /// Page markup could not be loaded into a document.
    #[error(transparent)]
    Dom(#[from] DomError),

    /// A code block could not be highlighted.
    #[error("Failed to highlight {language} code block: {message}")]
    Highlight {
        /// Grammar name used for the block.
        language: String,
        /// Highlighter error message.
        message: String,
    },
}

/// Error returned when a page cannot pass through the pipeline.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// A fatal stage failed.
    #[error("Transform `{stage}` failed for {}: {source}", .path.display())]
    Stage {
        /// Name of the failing stage.
        stage: &'static str,
        /// Output path of the page.
        path: PathBuf,
        /// Stage error.
        #[source]
        source: TransformError,
    },
}

/// What a pipeline does when a stage fails.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TransformPolicy {
    /// Log a warning and pass the stage's input through unchanged.
    FailOpen,
    /// Fail the page.
    Fatal,
}

/// Per-page metadata available to stages.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PageMeta {
    /// Output path relative to the output directory.
    pub output_path: PathBuf,
    /// Public URL of the page.
    pub url: String,
}

impl PageMeta {
    /// Create page metadata.
    pub fn new(output_path: impl Into<PathBuf>, url: impl Into<String>) -> Self {
        Self {
            output_path: output_path.into(),
            url: url.into(),
        }
    }

    /// True if the page is written as an `.html` file.
    #[must_use]
    pub fn is_html(&self) -> bool {
        self.output_path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("html"))
    }
}

/// A content-to-content stage over page HTML.
///
/// Stages hold only immutable configuration so a single pipeline can be
/// shared across threads rendering different pages.
pub trait Transform: Send + Sync {
    /// Stage name used in logs and errors.
    fn name(&self) -> &'static str;

    /// Failure policy. Defaults to [`TransformPolicy::Fatal`].
    fn policy(&self) -> TransformPolicy {
        TransformPolicy::Fatal
    }

    /// Whether the stage runs for this page. Defaults to `.html` outputs.
    fn applies_to(&self, meta: &PageMeta) -> bool {
        meta.is_html()
    }

    /// Transform the page.
    ///
    /// # Errors
    ///
    /// Returns an error if the page cannot be transformed.
    fn apply(&self, html: &str, meta: &PageMeta) -> Result<String, TransformError>;
}

/// Stage toggles and settings for [`Pipeline::standard`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransformOptions {
    /// Enable [`LinkSafety`].
    pub link_safety: bool,
    /// Tokens merged into `rel` of new-context links.
    pub rel: Vec<String>,
    /// Enable [`SyntaxHighlight`].
    pub highlight: bool,
    /// Class prefix of highlighted token spans.
    pub highlight_class_prefix: String,
    /// Enable [`Minify`].
    pub minify: bool,
}

impl Default for TransformOptions {
    fn default() -> Self {
        Self {
            link_safety: true,
            rel: vec!["noopener".to_owned(), "noreferrer".to_owned()],
            highlight: true,
            highlight_class_prefix: DEFAULT_CLASS_PREFIX.to_owned(),
            minify: true,
        }
    }
}

/// Ordered sequence of transform stages.
#[derive(Default)]
pub struct Pipeline {
    stages: Vec<Box<dyn Transform>>,
}

impl Pipeline {
    /// Create an empty pipeline.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a stage.
    #[must_use]
    pub fn with_stage(mut self, stage: impl Transform + 'static) -> Self {
        self.stages.push(Box::new(stage));
        self
    }

    /// Build the standard pipeline: link safety, highlighting, minification.
    ///
    /// Disabled stages are left out; the order of the rest is fixed.
    #[must_use]
    pub fn standard(options: &TransformOptions) -> Self {
        let mut pipeline = Self::new();
        if options.link_safety {
            pipeline = pipeline.with_stage(LinkSafety::new(options.rel.clone()));
        }
        if options.highlight {
            pipeline = pipeline.with_stage(SyntaxHighlight::new(&options.highlight_class_prefix));
        }
        if options.minify {
            pipeline = pipeline.with_stage(Minify::new());
        }
        pipeline
    }

    /// Names of the stages in order.
    #[must_use]
    pub fn stage_names(&self) -> Vec<&'static str> {
        self.stages.iter().map(|stage| stage.name()).collect()
    }

    /// Run every applicable stage over the page, in order.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Stage`] when a [`TransformPolicy::Fatal`]
    /// stage fails.
    pub fn apply_all(&self, html: &str, meta: &PageMeta) -> Result<String, PipelineError> {
        let mut content = html.to_owned();

        for stage in &self.stages {
            if !stage.applies_to(meta) {
                continue;
            }
            match stage.apply(&content, meta) {
                Ok(output) => content = output,
                Err(error) => match stage.policy() {
                    TransformPolicy::FailOpen => {
                        tracing::warn!(
                            stage = stage.name(),
                            path = %meta.output_path.display(),
                            error = %error,
                            "Transform failed, passing content through"
                        );
                    }
                    TransformPolicy::Fatal => {
                        return Err(PipelineError::Stage {
                            stage: stage.name(),
                            path: meta.output_path.clone(),
                            source: error,
                        });
                    }
                },
            }
        }

        Ok(content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    static_assertions::assert_impl_all!(Pipeline: Send, Sync);

    struct Append(&'static str);

    impl Transform for Append {
        fn name(&self) -> &'static str {
            "append"
        }

        fn apply(&self, html: &str, _meta: &PageMeta) -> Result<String, TransformError> {
            Ok(format!("{html}{}", self.0))
        }
    }

    struct Failing(TransformPolicy);

    impl Transform for Failing {
        fn name(&self) -> &'static str {
            "failing"
        }

        fn policy(&self) -> TransformPolicy {
            self.0
        }

        fn apply(&self, _html: &str, _meta: &PageMeta) -> Result<String, TransformError> {
            Err(TransformError::Dom(DomError::TooDeep { max: 1 }))
        }
    }

    fn html_page() -> PageMeta {
        PageMeta::new("guide/index.html", "/guide/")
    }

    #[test]
    fn test_stages_run_in_order() {
        let pipeline = Pipeline::new().with_stage(Append("a")).with_stage(Append("b"));

        let output = pipeline.apply_all("x", &html_page()).unwrap();

        assert_eq!(output, "xab");
    }

    #[test]
    fn test_non_html_output_untouched() {
        let pipeline = Pipeline::new().with_stage(Append("a"));
        let meta = PageMeta::new("feed.xml", "/feed.xml");

        assert_eq!(pipeline.apply_all("x", &meta).unwrap(), "x");
    }

    #[test]
    fn test_fail_open_passes_content_through() {
        let pipeline = Pipeline::new()
            .with_stage(Failing(TransformPolicy::FailOpen))
            .with_stage(Append("!"));

        let output = pipeline.apply_all("content", &html_page()).unwrap();

        assert_eq!(output, "content!");
    }

    #[test]
    fn test_fatal_stage_fails_page() {
        let pipeline = Pipeline::new()
            .with_stage(Append("a"))
            .with_stage(Failing(TransformPolicy::Fatal));

        let err = pipeline.apply_all("x", &html_page()).unwrap_err();

        let PipelineError::Stage { stage, path, .. } = &err;
        assert_eq!(*stage, "failing");
        assert_eq!(path, &PathBuf::from("guide/index.html"));
        assert!(err.to_string().starts_with("Transform `failing` failed for guide/index.html"));
    }

    #[test]
    fn test_standard_stage_order() {
        let pipeline = Pipeline::standard(&TransformOptions::default());

        assert_eq!(pipeline.stage_names(), vec!["link-safety", "syntax-highlight", "minify"]);
    }

    #[test]
    fn test_standard_skips_disabled_stages() {
        let options = TransformOptions {
            highlight: false,
            minify: false,
            ..TransformOptions::default()
        };

        assert_eq!(Pipeline::standard(&options).stage_names(), vec!["link-safety"]);
    }

    #[test]
    fn test_page_meta_is_html() {
        assert!(PageMeta::new("a/index.html", "/a/").is_html());
        assert!(PageMeta::new("a/INDEX.HTML", "/a/").is_html());
        assert!(!PageMeta::new("a/style.css", "/a/style.css").is_html());
        assert!(!PageMeta::new("README", "/README").is_html());
    }

    #[test]
    fn test_standard_pipeline_end_to_end() {
        let html = "<!DOCTYPE html>\n<html>\n<head><title>Guide</title></head>\n<body>\n\
            <!-- build note -->\n\
            <p>See <a href=\"https://example.com\" target=\"_blank\">the site</a>.</p>\n\
            <pre><code class=\"language-rust\">fn main() {}\n</code></pre>\n\
            </body>\n</html>\n";

        let output = Pipeline::standard(&TransformOptions::default())
            .apply_all(html, &html_page())
            .unwrap();

        assert!(output.starts_with("<!doctype html><html><head><title>Guide</title></head><body>"));
        assert!(!output.contains("build note"));
        assert!(output.contains(r#"target="_blank" rel="noopener noreferrer""#));
        assert!(output.contains(r#"<pre class="hljs-container"><code class="language-rust hljs">"#));
        assert!(output.contains("hl-"));
    }
}
