//! Configuration management for Folio.
//!
//! Parses `folio.toml` configuration files with serde and provides
//! auto-discovery of config files in parent directories.
//!
//! CLI settings can be applied during load via [`CliSettings`].
//!
//! ## Path Expansion
//!
//! Path values support `~` and environment variable expansion:
//!
//! - `${VAR}` - expands to the value of VAR, errors if unset
//! - `~/docs` - expands to the user's home directory
//!
//! Expanded fields:
//! - `site.source_dir`
//! - `site.output_dir`
//! - `site.navigation_dir`

mod expand;

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// CLI settings that override configuration file values.
///
/// All fields are optional. Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override markdown source directory.
    pub source_dir: Option<PathBuf>,
    /// Override output directory.
    pub output_dir: Option<PathBuf>,
    /// Override the minification stage toggle.
    pub minify: Option<bool>,
}

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "folio.toml";

/// Application configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Site layout configuration (paths are relative strings from TOML).
    site: SiteConfigRaw,
    /// Markdown rendering configuration.
    pub markdown: MarkdownConfig,
    /// Transform pipeline configuration.
    pub transforms: TransformsConfig,

    /// Resolved site configuration (set after loading).
    #[serde(skip)]
    pub site_resolved: SiteConfig,
    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self::default_with_base(Path::new("."))
    }
}

/// Raw site configuration as parsed from TOML (paths as strings).
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct SiteConfigRaw {
    title: Option<String>,
    source_dir: Option<String>,
    output_dir: Option<String>,
    navigation_dir: Option<String>,
    passthrough: Option<Vec<String>>,
    script: Option<String>,
    stylesheet: Option<String>,
}

/// Resolved site configuration with absolute paths.
#[derive(Debug, Default)]
pub struct SiteConfig {
    /// Site title shown in the page shell.
    pub title: String,
    /// Source directory for markdown files.
    pub source_dir: PathBuf,
    /// Output directory for the generated site.
    pub output_dir: PathBuf,
    /// Directory holding the navigation documents.
    pub navigation_dir: PathBuf,
    /// Directories (relative to `source_dir`) copied verbatim to the output.
    pub passthrough: Vec<PathBuf>,
    /// URL of the client script referenced by every page.
    pub script: String,
    /// URL of the stylesheet referenced by every page.
    pub stylesheet: String,
}

/// Markdown rendering configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct MarkdownConfig {
    /// Render soft line breaks as `<br>`.
    pub hard_breaks: bool,
    /// Convert quotes, dashes and ellipses to typographic forms.
    pub smart_punctuation: bool,
    /// Turn bare URLs and email addresses into links.
    pub linkify: bool,
    /// Heading levels that receive an id and a permalink anchor.
    pub anchor_levels: Vec<u8>,
    /// Class of the permalink anchor appended to headings.
    pub permalink_class: String,
    /// Text of the permalink anchor.
    pub permalink_symbol: String,
    /// Heading levels listed in the in-page table of contents.
    pub toc_levels: Vec<u8>,
}

impl Default for MarkdownConfig {
    fn default() -> Self {
        Self {
            hard_breaks: true,
            smart_punctuation: true,
            linkify: true,
            anchor_levels: vec![1, 2, 3, 4],
            permalink_class: "anchor-link".to_owned(),
            permalink_symbol: "#".to_owned(),
            toc_levels: vec![2, 3, 4],
        }
    }
}

/// Transform pipeline configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct TransformsConfig {
    /// Enable the link-safety stage.
    pub link_safety: bool,
    /// `rel` tokens merged into links that open a new browsing context.
    pub rel: Vec<String>,
    /// Enable the syntax highlighting stage.
    pub highlight: bool,
    /// Class prefix of highlighted token spans.
    pub highlight_class_prefix: String,
    /// Enable the minification stage.
    pub minify: bool,
}

impl Default for TransformsConfig {
    fn default() -> Self {
        Self {
            link_safety: true,
            rel: vec!["noopener".to_owned(), "noreferrer".to_owned()],
            highlight: true,
            highlight_class_prefix: "hl-".to_owned(),
            minify: true,
        }
    }
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
    /// Environment variable error during expansion.
    #[error("Environment variable error in {field}: {message}")]
    EnvVar {
        /// Config field path (e.g., "`site.output_dir`").
        field: String,
        /// Error message (e.g., "${`OUT_DIR`} not set").
        message: String,
    },
}

/// Require a string field to be non-empty.
fn require_non_empty(value: &str, field: &str) -> Result<(), ConfigError> {
    if value.is_empty() {
        return Err(ConfigError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

/// Require every heading level to be within 1..=6.
fn require_heading_levels(levels: &[u8], field: &str) -> Result<(), ConfigError> {
    if let Some(level) = levels.iter().find(|l| !(1..=6).contains(*l)) {
        return Err(ConfigError::Validation(format!(
            "{field} contains invalid heading level {level} (expected 1-6)"
        )));
    }
    Ok(())
}

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file.
    /// Otherwise, searches for `folio.toml` in current directory and parents.
    ///
    /// CLI settings are applied after loading and path resolution, allowing CLI
    /// arguments to take precedence over config file values.
    ///
    /// # Errors
    ///
    /// Returns error if explicit `config_path` doesn't exist or parsing fails.
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Self::load_from_file(path)?
        } else if let Some(discovered) = Self::discover_config() {
            Self::load_from_file(&discovered)?
        } else {
            Self::default_with_cwd()
        };

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
        }

        Ok(config)
    }

    /// Apply CLI settings to the configuration.
    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(source_dir) = &settings.source_dir {
            self.site_resolved.source_dir.clone_from(source_dir);
        }
        if let Some(output_dir) = &settings.output_dir {
            self.site_resolved.output_dir.clone_from(output_dir);
        }
        if let Some(minify) = settings.minify {
            self.transforms.minify = minify;
        }
    }

    /// Search for config file in current directory and parents.
    fn discover_config() -> Option<PathBuf> {
        let mut current = std::env::current_dir().ok()?;
        loop {
            let candidate = current.join(CONFIG_FILENAME);
            if candidate.exists() {
                return Some(candidate);
            }
            if !current.pop() {
                return None;
            }
        }
    }

    /// Create default config with paths relative to current working directory.
    fn default_with_cwd() -> Self {
        let cwd = std::env::current_dir().unwrap_or_default();
        Self::default_with_base(&cwd)
    }

    /// Create default config with paths relative to given base directory.
    fn default_with_base(base: &Path) -> Self {
        Self {
            site: SiteConfigRaw::default(),
            markdown: MarkdownConfig::default(),
            transforms: TransformsConfig::default(),
            site_resolved: SiteConfig {
                title: "Documentation".to_owned(),
                source_dir: base.join("src"),
                output_dir: base.join("_site"),
                navigation_dir: base.join("src/_data/navigation"),
                passthrough: vec![PathBuf::from("assets")],
                script: "/assets/main.js".to_owned(),
                stylesheet: "/style.css".to_owned(),
            },
            config_path: None,
        }
    }

    /// Load configuration from a specific file.
    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;

        // Expand `~` and environment variables before path resolution
        config.expand_paths()?;

        let config_dir = path.parent().unwrap_or(Path::new("."));
        config.resolve_paths(config_dir);
        config.config_path = Some(path.to_path_buf());

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// Called automatically after loading from file.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_markdown()?;
        self.validate_transforms()?;
        Ok(())
    }

    /// Validate markdown configuration.
    fn validate_markdown(&self) -> Result<(), ConfigError> {
        require_heading_levels(&self.markdown.anchor_levels, "markdown.anchor_levels")?;
        require_heading_levels(&self.markdown.toc_levels, "markdown.toc_levels")?;
        require_non_empty(&self.markdown.permalink_class, "markdown.permalink_class")?;

        // A TOC entry links to the heading id, which only anchored headings get
        if let Some(level) = self
            .markdown
            .toc_levels
            .iter()
            .find(|l| !self.markdown.anchor_levels.contains(l))
        {
            return Err(ConfigError::Validation(format!(
                "markdown.toc_levels includes level {level} which is not in markdown.anchor_levels"
            )));
        }

        Ok(())
    }

    /// Validate transform pipeline configuration.
    fn validate_transforms(&self) -> Result<(), ConfigError> {
        if self.transforms.link_safety && self.transforms.rel.is_empty() {
            return Err(ConfigError::Validation(
                "transforms.rel cannot be empty when link_safety is enabled".to_owned(),
            ));
        }
        for token in &self.transforms.rel {
            require_non_empty(token, "transforms.rel")?;
            if token.chars().any(char::is_whitespace) {
                return Err(ConfigError::Validation(format!(
                    "transforms.rel token {token:?} cannot contain whitespace"
                )));
            }
        }
        require_non_empty(
            &self.transforms.highlight_class_prefix,
            "transforms.highlight_class_prefix",
        )?;
        Ok(())
    }

    /// Expand `~` and environment variable references in path strings.
    fn expand_paths(&mut self) -> Result<(), ConfigError> {
        let site = &mut self.site;
        for (value, field) in [
            (&mut site.source_dir, "site.source_dir"),
            (&mut site.output_dir, "site.output_dir"),
            (&mut site.navigation_dir, "site.navigation_dir"),
        ] {
            if let Some(raw) = value.as_deref() {
                let expanded = expand::expand_path(raw, field)?;
                *value = Some(expanded);
            }
        }
        Ok(())
    }

    /// Resolve relative paths to absolute paths based on config directory.
    fn resolve_paths(&mut self, config_dir: &Path) {
        let resolve = |path: Option<&str>, default: &str| config_dir.join(path.unwrap_or(default));

        let source_dir = resolve(self.site.source_dir.as_deref(), "src");
        let navigation_dir = match self.site.navigation_dir.as_deref() {
            Some(dir) => config_dir.join(dir),
            None => source_dir.join("_data/navigation"),
        };

        self.site_resolved = SiteConfig {
            title: self
                .site
                .title
                .clone()
                .unwrap_or_else(|| "Documentation".to_owned()),
            output_dir: resolve(self.site.output_dir.as_deref(), "_site"),
            navigation_dir,
            source_dir,
            passthrough: self
                .site
                .passthrough
                .clone()
                .unwrap_or_else(|| vec!["assets".to_owned()])
                .into_iter()
                .map(PathBuf::from)
                .collect(),
            script: self
                .site
                .script
                .clone()
                .unwrap_or_else(|| "/assets/main.js".to_owned()),
            stylesheet: self
                .site
                .stylesheet
                .clone()
                .unwrap_or_else(|| "/style.css".to_owned()),
        };
    }
}
