//! Loading navigation documents from disk.

use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::Value;

use crate::{NavCollection, NavError};

/// Document name of the main (sidebar) navigation.
const MAIN_NAV: &str = "mainNav";
/// Document name of the header navigation.
const HEADER_NAV: &str = "headerNav";
/// Document name of the footer links.
const FOOTER_NAV: &str = "footerLinks";

/// Supported extensions, in lookup order.
const EXTENSIONS: [&str; 3] = ["json", "yaml", "yml"];

/// Navigation surfaces of a site.
///
/// Built once per build and shared read-only with every page render.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Navigation {
    /// Main (sidebar) navigation.
    pub main: NavCollection,
    /// Header navigation.
    pub header: NavCollection,
    /// Footer links.
    pub footer: NavCollection,
}

impl Default for Navigation {
    fn default() -> Self {
        Self {
            main: NavCollection::empty("main"),
            header: NavCollection::empty("header"),
            footer: NavCollection::empty("footer"),
        }
    }
}

impl Navigation {
    /// Load the navigation documents from `dir`.
    ///
    /// Reads `mainNav`, `headerNav` and `footerLinks` documents, each as
    /// `.json`, `.yaml` or `.yml` (first found wins). A missing document
    /// yields an empty collection.
    ///
    /// # Errors
    ///
    /// Returns an error if a document cannot be read, parsed, or built.
    pub fn load(dir: &Path) -> Result<Self, NavError> {
        Ok(Self {
            main: load_collection(dir, MAIN_NAV, "main")?,
            header: load_collection(dir, HEADER_NAV, "header")?,
            footer: load_collection(dir, FOOTER_NAV, "footer")?,
        })
    }
}

fn load_collection(dir: &Path, document: &str, name: &str) -> Result<NavCollection, NavError> {
    let Some(path) = find_document(dir, document) else {
        tracing::debug!(dir = %dir.display(), document, "Navigation document not found");
        return Ok(NavCollection::empty(name));
    };

    let raw = read_document(&path)?;
    let collection = NavCollection::build(name, &raw)?;
    tracing::debug!(
        path = %path.display(),
        links = collection.links().len(),
        "Loaded navigation"
    );
    Ok(collection)
}

fn find_document(dir: &Path, document: &str) -> Option<PathBuf> {
    EXTENSIONS
        .iter()
        .map(|ext| dir.join(format!("{document}.{ext}")))
        .find(|path| path.is_file())
}

fn read_document(path: &Path) -> Result<Value, NavError> {
    let content = std::fs::read_to_string(path).map_err(|source| NavError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let is_json = path.extension().is_some_and(|ext| ext == "json");
    let parsed = if is_json {
        serde_json::from_str(&content).map_err(|e| e.to_string())
    } else {
        serde_yaml::from_str(&content).map_err(|e| e.to_string())
    };

    parsed.map_err(|message| NavError::Parse {
        path: path.to_path_buf(),
        message,
    })
}
