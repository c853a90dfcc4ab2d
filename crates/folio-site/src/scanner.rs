//! Markdown source discovery.
//!
//! Every `.md` file under the source directory becomes a page at its pretty
//! URL. Hidden entries, `_`-prefixed directories (data, includes) and
//! passthrough directories are skipped.

use std::fs;
use std::path::{Path, PathBuf};

pub(crate) struct Scanner {
    source_dir: PathBuf,
    excluded: Vec<PathBuf>,
}

impl Scanner {
    /// Create a scanner. `excluded` paths are relative to `source_dir`.
    pub fn new(source_dir: PathBuf, excluded: Vec<PathBuf>) -> Self {
        Self {
            source_dir,
            excluded,
        }
    }

    /// Scan the source directory. Returns markdown paths relative to it,
    /// sorted.
    ///
    /// # Errors
    ///
    /// Returns an error if the source directory cannot be read.
    pub fn scan(&self) -> std::io::Result<Vec<PathBuf>> {
        let mut sources = Vec::new();
        self.scan_directory(&self.source_dir, Path::new(""), &mut sources)?;
        sources.sort();
        Ok(sources)
    }

    fn scan_directory(&self, dir: &Path, relative: &Path, sources: &mut Vec<PathBuf>) -> std::io::Result<()> {
        for entry in fs::read_dir(dir)? {
            let entry = entry?;
            let name = entry.file_name();
            let name = name.to_string_lossy();
            if name.starts_with('.') {
                continue;
            }

            let child = relative.join(&*name);
            if entry.file_type()?.is_dir() {
                if name.starts_with('_') || self.excluded.contains(&child) {
                    tracing::debug!(path = %child.display(), "Skipping directory");
                    continue;
                }
                self.scan_directory(&entry.path(), &child, sources)?;
            } else if child.extension().is_some_and(|ext| ext == "md") {
                sources.push(child);
            }
        }
        Ok(())
    }
}

/// Map a source path to its pretty URL and output path.
///
/// - `index.md` -> `/`, `index.html`
/// - `guide.md` -> `/guide/`, `guide/index.html`
/// - `guide/index.md` -> `/guide/`, `guide/index.html`
/// - `guide/intro.md` -> `/guide/intro/`, `guide/intro/index.html`
pub(crate) fn pretty_url(relative: &Path) -> (String, PathBuf) {
    let stem = relative.with_extension("");
    let mut segments: Vec<String> = stem
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    if segments.last().is_some_and(|s| s == "index") {
        segments.pop();
    }

    if segments.is_empty() {
        return ("/".to_owned(), PathBuf::from("index.html"));
    }
    let url = format!("/{}/", segments.join("/"));
    let mut output_path: PathBuf = segments.iter().collect();
    output_path.push("index.html");
    (url, output_path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn write(root: &Path, relative: &str) {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "# Page").unwrap();
    }

    #[test]
    fn test_pretty_url() {
        assert_eq!(pretty_url(Path::new("index.md")), ("/".to_owned(), PathBuf::from("index.html")));
        assert_eq!(
            pretty_url(Path::new("guide.md")),
            ("/guide/".to_owned(), PathBuf::from("guide/index.html"))
        );
        assert_eq!(
            pretty_url(Path::new("guide/index.md")),
            ("/guide/".to_owned(), PathBuf::from("guide/index.html"))
        );
        assert_eq!(
            pretty_url(Path::new("guide/intro.md")),
            ("/guide/intro/".to_owned(), PathBuf::from("guide/intro/index.html"))
        );
    }

    #[test]
    fn test_scan_finds_markdown_sorted() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "index.md");
        write(dir.path(), "guide/intro.md");
        write(dir.path(), "guide/index.md");
        fs::write(dir.path().join("notes.txt"), "not markdown").unwrap();

        let sources = Scanner::new(dir.path().to_path_buf(), Vec::new()).scan().unwrap();

        assert_eq!(
            sources,
            vec![
                PathBuf::from("guide/index.md"),
                PathBuf::from("guide/intro.md"),
                PathBuf::from("index.md"),
            ]
        );
    }

    #[test]
    fn test_scan_skips_hidden_underscore_and_excluded() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "page.md");
        write(dir.path(), ".drafts/secret.md");
        write(dir.path(), "_includes/partial.md");
        write(dir.path(), "assets/readme.md");

        let sources = Scanner::new(dir.path().to_path_buf(), vec![PathBuf::from("assets")])
            .scan()
            .unwrap();

        assert_eq!(sources, vec![PathBuf::from("page.md")]);
    }

    #[test]
    fn test_scan_missing_dir_is_error() {
        let dir = tempfile::tempdir().unwrap();

        let result = Scanner::new(dir.path().join("missing"), Vec::new()).scan();

        assert!(result.is_err());
    }
}
