//! `apiref build` command implementation.

use std::path::PathBuf;

use clap::Args;

use super::{SiteArgs, report, site_builder};
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the build command.
#[derive(Args)]
pub(crate) struct BuildArgs {
    /// Output directory for the generated site (overrides config).
    #[arg(short, long)]
    pub(crate) output_dir: Option<PathBuf>,

    #[command(flatten)]
    pub(crate) site: SiteArgs,
}

impl BuildArgs {
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();
        let config = self.site.load_config(self.output_dir)?;
        let out_dir = &config.output_resolved.dir;

        output.info(&format!("Source: {}", config.source_resolved.dir.display()));
        output.info(&format!("Output: {}", out_dir.display()));

        let builder = site_builder(&config)?;
        let result = builder.build(out_dir)?;
        report(&output, &result, self.site.strict)?;

        output.success(&format!("Site built successfully to {}", out_dir.display()));
        Ok(())
    }
}
