//! `apiref check` command implementation.

use clap::Args;

use super::{SiteArgs, report, site_builder};
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the check command.
#[derive(Args)]
pub(crate) struct CheckArgs {
    #[command(flatten)]
    pub(crate) site: SiteArgs,
}

impl CheckArgs {
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();
        let config = self.site.load_config(None)?;

        output.info(&format!("Source: {}", config.source_resolved.dir.display()));

        let builder = site_builder(&config)?;
        let result = builder.check()?;
        report(&output, &result, self.site.strict)
    }
}
