//! CLI command implementations.

pub(crate) mod build;
pub(crate) mod check;

use std::fs;
use std::path::PathBuf;

use apiref_config::{CliSettings, Config};
use apiref_meta::{DirSource, Warnings};
use apiref_renderer::{Layout, PageTemplate};
use apiref_site::{BuildReport, SiteBuilder};
use clap::Args;

use crate::error::CliError;
use crate::output::Output;

pub(crate) use build::BuildArgs;
pub(crate) use check::CheckArgs;

/// Arguments shared by `build` and `check`.
#[derive(Args)]
pub(crate) struct SiteArgs {
    /// Metadata source directory (overrides config).
    #[arg(short, long)]
    pub(crate) source_dir: Option<PathBuf>,

    /// Render modules sequentially.
    #[arg(long)]
    pub(crate) no_parallel: bool,

    /// Exit with an error when any warning is reported.
    #[arg(long)]
    pub(crate) strict: bool,

    /// Enable verbose output.
    #[arg(short, long)]
    pub(crate) verbose: bool,

    /// Path to configuration file (default: auto-discover apiref.toml).
    #[arg(short, long)]
    pub(crate) config: Option<PathBuf>,
}

impl SiteArgs {
    /// Load configuration with CLI overrides applied.
    pub(crate) fn load_config(&self, output_dir: Option<PathBuf>) -> Result<Config, CliError> {
        let cli_settings = CliSettings {
            source_dir: self.source_dir.clone(),
            output_dir,
            parallel: self.no_parallel.then_some(false),
        };
        let config = Config::load(self.config.as_deref(), Some(&cli_settings))?;
        tracing::debug!(path = ?config.config_path, "Configuration loaded");
        Ok(config)
    }
}

/// Page template described by the configuration.
pub(crate) fn page_template(config: &Config) -> Result<PageTemplate, CliError> {
    let render = &config.render_resolved;
    let mut template = PageTemplate::new(&config.site.title)
        .with_extension(&config.output_resolved.extension)
        .with_placeholder(&render.placeholder)
        .with_group_parameters(render.group_parameters);

    if let Some(url) = &config.site.source_url {
        template = template.with_source_url(url);
    }
    if let Some(path) = &render.layout {
        let source = fs::read_to_string(path).map_err(|e| {
            CliError::Validation(format!("Failed to read layout {}: {e}", path.display()))
        })?;
        template = template.with_layout(Layout::new(source)?);
    }
    Ok(template)
}

/// Load the module index named by the configuration.
pub(crate) fn site_builder(config: &Config) -> Result<SiteBuilder, CliError> {
    let source = DirSource::new(&config.source_resolved.dir);
    let builder = SiteBuilder::load(&source, page_template(config)?)?;
    Ok(builder.with_parallel(config.build.parallel))
}

/// Print warnings and the summary line, failing in strict mode.
pub(crate) fn report(output: &Output, report: &BuildReport, strict: bool) -> Result<(), CliError> {
    print_warnings(output, &report.warnings);

    if strict && !report.warnings.is_empty() {
        return Err(CliError::Validation(format!(
            "{} (strict mode)",
            report.warnings.summary()
        )));
    }
    output.success(&report.summary());
    Ok(())
}

fn print_warnings(output: &Output, warnings: &Warnings) {
    if warnings.is_empty() {
        return;
    }
    output.highlight("Warnings:");
    for warning in warnings {
        output.warning(&format!("  {warning}"));
    }
}
