//! Loaded site sources.

use std::path::{Path, PathBuf};

use folio_nav::{SectionIndex, Sectioned};
use serde_json::Value;

use crate::BuildError;
use crate::front_matter::{self, FrontMatter};
use crate::scanner::Scanner;

/// One markdown page.
#[derive(Clone, Debug, PartialEq)]
pub struct Page {
    source_path: PathBuf,
    url: String,
    output_path: PathBuf,
    front_matter: FrontMatter,
    body: String,
}

impl Page {
    /// Create a page from a markdown source.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::Render`] if the front matter is invalid.
    pub fn from_source(source_path: impl Into<PathBuf>, source: &str) -> Result<Self, BuildError> {
        let source_path = source_path.into();
        let (front_matter, body) = front_matter::split(source).map_err(|message| BuildError::Render {
            path: source_path.clone(),
            message: format!("invalid front matter: {message}"),
        })?;
        let (url, output_path) = crate::scanner::pretty_url(&source_path);

        Ok(Self {
            url,
            output_path,
            front_matter,
            body: body.to_owned(),
            source_path,
        })
    }

    /// Source path relative to the source directory.
    #[must_use]
    pub fn source_path(&self) -> &Path {
        &self.source_path
    }

    /// Pretty URL (e.g., "/guide/intro/").
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Output path relative to the output directory.
    #[must_use]
    pub fn output_path(&self) -> &Path {
        &self.output_path
    }

    /// Front matter.
    #[must_use]
    pub fn front_matter(&self) -> &FrontMatter {
        &self.front_matter
    }

    /// Markdown body without front matter.
    #[must_use]
    pub fn body(&self) -> &str {
        &self.body
    }

    /// Title declared in front matter.
    #[must_use]
    pub fn title(&self) -> Option<&str> {
        self.front_matter.title.as_deref()
    }

    /// Title for links to this page: the front matter title or the URL.
    #[must_use]
    pub fn link_title(&self) -> &str {
        self.title().unwrap_or(&self.url)
    }
}

impl Sectioned for Page {
    fn section(&self) -> Option<&str> {
        self.front_matter.section.as_deref()
    }

    fn subsection(&self) -> Option<&str> {
        self.front_matter.subsection.as_deref()
    }
}

/// All pages of a site.
#[derive(Clone, Debug, Default)]
pub struct Site {
    pages: Vec<Page>,
}

impl Site {
    /// Create a site from pages, ordered by front matter `order` then source
    /// path. Pages without `order` come after ordered ones.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::Render`] naming both sources if two pages
    /// would be written to the same output path (`guide.md` and
    /// `guide/index.md`).
    pub fn new(mut pages: Vec<Page>) -> Result<Self, BuildError> {
        let mut outputs: Vec<(&Path, &Path)> = pages
            .iter()
            .map(|p| (p.output_path.as_path(), p.source_path.as_path()))
            .collect();
        outputs.sort_unstable();
        if let Some(pair) = outputs.windows(2).find(|pair| pair[0].0 == pair[1].0) {
            let (output, first) = pair[0];
            return Err(BuildError::Render {
                path: pair[1].1.to_path_buf(),
                message: format!(
                    "output {} is also produced by {}",
                    output.display(),
                    first.display()
                ),
            });
        }

        pages.sort_by(|a, b| {
            let key = |p: &Page| (p.front_matter.order.is_none(), p.front_matter.order);
            key(a).cmp(&key(b)).then_with(|| a.source_path.cmp(&b.source_path))
        });
        Ok(Self { pages })
    }

    /// Scan `source_dir` and load every markdown page.
    ///
    /// `excluded` directories (relative to `source_dir`) are not scanned.
    ///
    /// # Errors
    ///
    /// Returns an error if a source cannot be read, has invalid front matter,
    /// or shares its output path with another source.
    pub fn load(source_dir: &Path, excluded: &[PathBuf]) -> Result<Self, BuildError> {
        let sources = Scanner::new(source_dir.to_path_buf(), excluded.to_vec())
            .scan()
            .map_err(|source| BuildError::Io {
                path: source_dir.to_path_buf(),
                source,
            })?;

        let mut pages = Vec::with_capacity(sources.len());
        for relative in sources {
            let path = source_dir.join(&relative);
            let source = std::fs::read_to_string(&path).map_err(|source| BuildError::Io { path, source })?;
            pages.push(Page::from_source(relative, &source)?);
        }
        tracing::debug!(dir = %source_dir.display(), pages = pages.len(), "Loaded site sources");

        Self::new(pages)
    }

    /// Pages in site order.
    #[must_use]
    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    /// Find a page by URL.
    #[must_use]
    pub fn page(&self, url: &str) -> Option<&Page> {
        self.pages.iter().find(|p| p.url == url)
    }

    /// Pages whose front matter `key` equals `value`.
    #[must_use]
    pub fn pages_where(&self, key: &str, value: &Value) -> Vec<&Page> {
        self.pages
            .iter()
            .filter(|p| p.front_matter.get(key).as_ref() == Some(value))
            .collect()
    }

    /// Pages grouped by section and subsection.
    #[must_use]
    pub fn section_index(&self) -> SectionIndex<'_, Page> {
        SectionIndex::group(&self.pages)
    }
}
