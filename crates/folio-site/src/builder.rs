//! Static site build: render every page, run the transform pipeline, write.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use folio_config::{Config, TransformsConfig};
use folio_nav::{Navigation, SectionIndex, Sectioned};
use folio_transform::{PageMeta, Pipeline, SyntaxHighlight, TransformOptions};
use rayon::prelude::*;

use crate::markdown::{MarkdownOptions, MarkdownRenderer};
use crate::site::{Page, Site};
use crate::template::{self, PageContext};
use crate::{BuildError, PageError};

/// Summary of a successful build.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BuildReport {
    /// Number of pages written.
    pub pages: usize,
    /// Number of passthrough files copied.
    pub copied: usize,
    /// Output directory.
    pub output_dir: PathBuf,
}

/// Builds a static site from a loaded configuration.
pub struct SiteBuilder<'a> {
    config: &'a Config,
    version: String,
}

/// Read-only state shared by every page render.
struct BuildContext<'a> {
    config: &'a Config,
    navigation: Arc<Navigation>,
    index: SectionIndex<'a, Page>,
    renderer: MarkdownRenderer,
    pipeline: Pipeline,
    version: &'a str,
}

impl<'a> SiteBuilder<'a> {
    /// Create a builder. The build version defaults to the current time in
    /// milliseconds.
    #[must_use]
    pub fn new(config: &'a Config) -> Self {
        let version = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis().to_string())
            .unwrap_or_default();
        Self { config, version }
    }

    /// Override the build version appended to asset URLs.
    #[must_use]
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    /// Build the site.
    ///
    /// Navigation and source errors abort the build. A page that fails a
    /// fatal transform or cannot be written is skipped; the remaining pages
    /// and passthrough files are still written and the failures are returned
    /// together as [`BuildError::Pages`].
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid, navigation or
    /// sources cannot be loaded, output cannot be written, or any page fails.
    pub fn build(&self) -> Result<BuildReport, BuildError> {
        self.config.validate()?;
        let site_config = &self.config.site_resolved;

        let navigation = Arc::new(Navigation::load(&site_config.navigation_dir)?);
        let site = Site::load(&site_config.source_dir, &site_config.passthrough)?;
        tracing::info!(pages = site.pages().len(), "Building site");

        if self.config.transforms.highlight {
            SyntaxHighlight::warm_up();
        }
        let ctx = BuildContext {
            config: self.config,
            navigation,
            index: site.section_index(),
            renderer: MarkdownRenderer::new(MarkdownOptions::from(&self.config.markdown)),
            pipeline: Pipeline::standard(&transform_options(&self.config.transforms)),
            version: &self.version,
        };
        tracing::debug!(stages = ?ctx.pipeline.stage_names(), "Transform pipeline");

        let output_dir = &site_config.output_dir;
        fs::create_dir_all(output_dir).map_err(|source| BuildError::Io {
            path: output_dir.clone(),
            source,
        })?;

        let results: Vec<Result<(), PageError>> = site
            .pages()
            .par_iter()
            .map(|page| build_page(&ctx, page, output_dir))
            .collect();
        let mut failures = Vec::new();
        let mut pages = 0;
        for result in results {
            match result {
                Ok(()) => pages += 1,
                Err(error) => {
                    tracing::error!(error = %error, "Page failed");
                    failures.push(error);
                }
            }
        }

        let mut copied = 0;
        for relative in &site_config.passthrough {
            let from = site_config.source_dir.join(relative);
            if !from.exists() {
                tracing::debug!(path = %from.display(), "Passthrough path not found");
                continue;
            }
            let to = output_dir.join(relative);
            copied += copy_recursive(&from, &to).map_err(|source| BuildError::Io { path: from, source })?;
        }

        if !failures.is_empty() {
            return Err(BuildError::Pages(failures));
        }

        tracing::info!(pages, copied, output = %output_dir.display(), "Site built");
        Ok(BuildReport {
            pages,
            copied,
            output_dir: output_dir.clone(),
        })
    }
}

/// Pipeline options from the `[transforms]` configuration.
#[must_use]
pub fn transform_options(config: &TransformsConfig) -> TransformOptions {
    TransformOptions {
        link_safety: config.link_safety,
        rel: config.rel.clone(),
        highlight: config.highlight,
        highlight_class_prefix: config.highlight_class_prefix.clone(),
        minify: config.minify,
    }
}

fn build_page(ctx: &BuildContext<'_>, page: &Page, output_dir: &Path) -> Result<(), PageError> {
    let site_config = &ctx.config.site_resolved;
    let rendered = ctx.renderer.render(page.body());
    let title = page
        .title()
        .or(rendered.title.as_deref())
        .unwrap_or(site_config.title.as_str());

    let html = template::render_page(&PageContext {
        site_title: &site_config.title,
        title,
        url: page.url(),
        content: &rendered.html,
        toc: &rendered.toc,
        navigation: &ctx.navigation,
        section: page.section().and_then(|name| ctx.index.section(name)),
        stylesheet: &site_config.stylesheet,
        script: &site_config.script,
        version: ctx.version,
    });

    let meta = PageMeta::new(page.output_path(), page.url());
    let html = ctx.pipeline.apply_all(&html, &meta)?;

    let path = output_dir.join(page.output_path());
    write_file(&path, &html).map_err(|source| PageError::Write { path: path.clone(), source })?;
    tracing::debug!(url = page.url(), path = %path.display(), "Wrote page");
    Ok(())
}

fn write_file(path: &Path, contents: &str) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, contents)
}

/// Copy a file or directory tree. Returns the number of files copied.
fn copy_recursive(from: &Path, to: &Path) -> std::io::Result<usize> {
    if !from.is_dir() {
        if let Some(parent) = to.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::copy(from, to)?;
        return Ok(1);
    }

    fs::create_dir_all(to)?;
    let mut copied = 0;
    for entry in fs::read_dir(from)? {
        let entry = entry?;
        copied += copy_recursive(&entry.path(), &to.join(entry.file_name()))?;
    }
    Ok(copied)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const MAIN_NAV: &str = r#"{"links": [
        {"url": "/guide/", "label": "Guide", "children": [
            {"url": "/guide/setup/", "label": "Setup"}
        ]}
    ]}"#;

    fn write(root: &Path, relative: &str, contents: &str) {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, contents).unwrap();
    }

    fn project(config: &str) -> (tempfile::TempDir, Config) {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        write(root, "folio.toml", config);
        write(root, "src/_data/navigation/mainNav.json", MAIN_NAV);
        write(root, "src/_data/navigation/footerLinks.yaml", "links:\n  - url: /privacy/\n    label: Privacy\n");
        write(root, "src/index.md", "---\ntitle: Home\n---\nWelcome to the [docs](/guide/setup/).\n");
        write(
            root,
            "src/guide/setup.md",
            "---\ntitle: Setup\nsection: guide\n---\n# Setup\n\n## Install\n\n<a href=\"https://example.com\" target=\"_blank\">Site</a>\n\n```rust\nfn main() {}\n```\n",
        );
        write(root, "src/assets/main.js", "console.log('folio');\n");
        write(root, "src/assets/img/logo.svg", "<svg></svg>");

        let config = Config::load(Some(&root.join("folio.toml")), None).unwrap();
        (dir, config)
    }

    fn read(root: &Path, relative: &str) -> String {
        fs::read_to_string(root.join(relative)).unwrap()
    }

    #[test]
    fn test_build_writes_pages_and_passthrough() {
        let (dir, config) = project("[site]\ntitle = \"Handbook\"\n");

        let report = SiteBuilder::new(&config).with_version("7").build().unwrap();

        assert_eq!(report.pages, 2);
        assert_eq!(report.copied, 2);
        assert_eq!(report.output_dir, dir.path().join("_site"));
        assert!(dir.path().join("_site/assets/img/logo.svg").exists());
        assert!(!dir.path().join("_site/assets/main.js/index.html").exists());

        let home = read(dir.path(), "_site/index.html");
        assert!(home.starts_with("<!doctype html>"));
        assert!(home.contains("<title>Home | Handbook</title>"));
        assert!(home.contains("/style.css?v=7"));
        assert!(home.contains("Privacy"));
    }

    #[test]
    fn test_build_runs_transform_pipeline() {
        let (dir, config) = project("");

        SiteBuilder::new(&config).with_version("7").build().unwrap();
        let page = read(dir.path(), "_site/guide/setup/index.html");

        assert!(page.contains(r#"rel="noopener noreferrer""#));
        assert!(page.contains("hljs-container"));
        assert!(page.contains("hl-rust"));
        assert!(page.contains(r##"<a href="#install">Install</a>"##));
        assert!(page.contains(r#"<h2 id="install">"#));
        assert!(page.contains("nav-item active"));
        assert!(!page.contains("\n\n"));
    }

    #[test]
    fn test_build_without_minify() {
        let (dir, config) = project("[transforms]\nminify = false\nhighlight = false\n");

        SiteBuilder::new(&config).with_version("7").build().unwrap();
        let page = read(dir.path(), "_site/guide/setup/index.html");

        assert!(page.starts_with("<!DOCTYPE html>"));
        assert!(!page.contains("hljs"));
        assert!(page.contains(r#"rel="noopener noreferrer""#));
    }

    #[test]
    fn test_build_missing_navigation_dir_is_empty() {
        let (dir, config) = project("[site]\nnavigation_dir = \"missing\"\n");

        SiteBuilder::new(&config).with_version("7").build().unwrap();
        let page = read(dir.path(), "_site/guide/setup/index.html");

        assert!(!page.contains("nav-item"));
    }

    #[test]
    fn test_build_malformed_navigation_is_fatal() {
        let (dir, config) = project("");
        write(dir.path(), "src/_data/navigation/mainNav.json", r#"{"links": [{"label": "No url"}]}"#);

        let err = SiteBuilder::new(&config).build().unwrap_err();

        assert!(matches!(err, BuildError::Navigation(_)));
        assert!(!dir.path().join("_site/index.html").exists());
    }

    #[test]
    fn test_build_page_failure_reported_after_other_pages() {
        let (dir, config) = project("");
        // A file where the page's directory should be
        write(dir.path(), "_site/guide/setup", "blocker");

        let err = SiteBuilder::new(&config).with_version("7").build().unwrap_err();

        let BuildError::Pages(failures) = err else {
            panic!("expected page failures, got {err:?}");
        };
        assert_eq!(failures.len(), 1);
        assert!(matches!(failures[0], PageError::Write { .. }));
        assert!(dir.path().join("_site/index.html").exists());
        assert!(dir.path().join("_site/assets/main.js").exists());
    }

    #[test]
    fn test_transform_options_from_config() {
        let config = TransformsConfig {
            rel: vec!["noopener".to_owned()],
            minify: false,
            ..TransformsConfig::default()
        };

        let options = transform_options(&config);

        assert_eq!(options.rel, vec!["noopener".to_owned()]);
        assert!(!options.minify);
        assert!(options.highlight);
    }
}
