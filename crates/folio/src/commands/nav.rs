//! `folio nav` command implementation.

use std::path::PathBuf;

use clap::Args;
use folio_config::Config;
use folio_nav::{NavCollection, NavLink, Navigation};

use crate::error::CliError;
use crate::output::Output;

/// Arguments for the nav command.
#[derive(Args)]
pub(crate) struct NavArgs {
    /// Path to configuration file (default: auto-discover folio.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Page URL to resolve against the main navigation (repeatable).
    #[arg(short, long = "url", value_name = "URL")]
    urls: Vec<String>,

    /// Enable verbose output.
    #[arg(short, long)]
    pub verbose: bool,
}

impl NavArgs {
    /// Execute the nav command.
    ///
    /// Loading the navigation validates it; the collections are then listed
    /// and each `--url` is resolved to its active parent link.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration fails or a navigation document is invalid.
    pub(crate) fn execute(self, output: &Output) -> Result<(), CliError> {
        let config = Config::load(self.config.as_deref(), None)?;
        let dir = &config.site_resolved.navigation_dir;
        let navigation = Navigation::load(dir)?;
        output.success(&format!("Navigation in {} is valid", dir.display()));

        for collection in [&navigation.main, &navigation.header, &navigation.footer] {
            print_collection(output, collection);
        }

        for url in &self.urls {
            match navigation.main.get_active_parent_link(url) {
                Some(link) => output.info(&format!("{url}: active parent {} ({})", link.label(), link.url())),
                None => output.warning(&format!("{url}: no active parent")),
            }
        }
        Ok(())
    }
}

fn print_collection(output: &Output, collection: &NavCollection) {
    output.heading(&format!("{} ({} links)", collection.name(), count_links(collection.links())));
    let mut stack: Vec<(usize, &NavLink)> = collection.links().iter().rev().map(|l| (1, l)).collect();
    while let Some((depth, link)) = stack.pop() {
        output.tree_entry(depth, link.label(), link.url());
        stack.extend(link.children().iter().rev().map(|child| (depth + 1, child)));
    }
}

/// Number of links in a tree, at every depth.
fn count_links(links: &[NavLink]) -> usize {
    links.iter().map(|link| 1 + count_links(link.children())).sum()
}
