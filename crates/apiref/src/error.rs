//! CLI error types.

use apiref_config::ConfigError;
use apiref_renderer::RenderError;
use apiref_site::BuildError;

/// CLI error type.
#[derive(Debug, thiserror::Error)]
pub(crate) enum CliError {
    #[error("{0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Render(#[from] RenderError),

    #[error("{0}")]
    Build(#[from] BuildError),

    #[error("{0}")]
    Validation(String),
}
