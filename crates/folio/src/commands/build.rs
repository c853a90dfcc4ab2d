//! `folio build` command implementation.

use std::path::PathBuf;

use clap::Args;
use folio_config::{CliSettings, Config};
use folio_site::{BuildError, SiteBuilder};

use crate::error::CliError;
use crate::output::Output;

/// Arguments for the build command.
#[derive(Args)]
pub(crate) struct BuildArgs {
    /// Path to configuration file (default: auto-discover folio.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Markdown source directory (overrides config).
    #[arg(short, long)]
    source_dir: Option<PathBuf>,

    /// Output directory for the generated site (overrides config).
    #[arg(short, long, env = "FOLIO_OUTPUT_DIR")]
    output_dir: Option<PathBuf>,

    /// Skip HTML minification.
    #[arg(long)]
    no_minify: bool,

    /// Enable verbose output.
    #[arg(short, long)]
    pub verbose: bool,
}

impl BuildArgs {
    /// Execute the build command.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration fails or any page fails to build.
    pub(crate) fn execute(self, output: &Output) -> Result<(), CliError> {
        let cli_settings = self.cli_settings();
        let config = Config::load(self.config.as_deref(), Some(&cli_settings))?;

        output.info(&format!("Source: {}", config.site_resolved.source_dir.display()));
        output.info(&format!("Output: {}", config.site_resolved.output_dir.display()));
        if !config.transforms.minify {
            output.warning("Minification disabled");
        }

        match SiteBuilder::new(&config).build() {
            Ok(report) => {
                output.success(&format!(
                    "Built {} page(s) and copied {} file(s) to {}",
                    report.pages,
                    report.copied,
                    report.output_dir.display()
                ));
                Ok(())
            }
            Err(BuildError::Pages(failures)) => {
                for failure in &failures {
                    output.error(&format!("  {failure}"));
                }
                Err(BuildError::Pages(failures).into())
            }
            Err(err) => Err(err.into()),
        }
    }

    fn cli_settings(&self) -> CliSettings {
        CliSettings {
            source_dir: self.source_dir.clone(),
            output_dir: self.output_dir.clone(),
            minify: self.no_minify.then_some(false),
        }
    }
}
