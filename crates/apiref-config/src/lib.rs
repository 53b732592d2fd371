//! Configuration management for apiref.
//!
//! Parses `apiref.toml` configuration files with serde and provides
//! auto-discovery of config files in parent directories.
//!
//! CLI settings can be applied during load via [`CliSettings`].
//!
//! ```toml
//! [source]
//! dir = "metadata"
//!
//! [output]
//! dir = "site"
//! extension = "html"
//!
//! [site]
//! title = "MagickCore, C API"
//! source_url = "https://imagemagick.org/api/MagickCore/{module}_8c.html"
//!
//! [render]
//! placeholder = "undocumented"
//! group_parameters = true
//! layout = "layout.html"
//!
//! [build]
//! parallel = true
//! ```
//!
//! ## Environment Variable Expansion
//!
//! `${VAR}` and `${VAR:-default}` are expanded in `site.title`,
//! `site.source_url` and `render.placeholder`.

mod expand;

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// CLI settings that override configuration file values.
///
/// Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override metadata source directory.
    pub source_dir: Option<PathBuf>,
    /// Override output directory.
    pub output_dir: Option<PathBuf>,
    /// Override parallel rendering flag.
    pub parallel: Option<bool>,
}

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "apiref.toml";

/// Application configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Metadata source (paths are relative strings from TOML).
    source: SourceConfigRaw,
    /// Output settings (paths are relative strings from TOML).
    output: OutputConfigRaw,
    /// Site-wide presentation settings.
    pub site: SiteConfig,
    /// Page rendering settings.
    render: RenderConfigRaw,
    /// Build settings.
    pub build: BuildConfig,

    /// Resolved source configuration (set after loading).
    #[serde(skip)]
    pub source_resolved: SourceConfig,
    /// Resolved output configuration (set after loading).
    #[serde(skip)]
    pub output_resolved: OutputConfig,
    /// Resolved render configuration (set after loading).
    #[serde(skip)]
    pub render_resolved: RenderConfig,
    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self::default_with_base(Path::new("."))
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct SourceConfigRaw {
    dir: Option<String>,
}

/// Resolved metadata source configuration.
#[derive(Debug, Default)]
pub struct SourceConfig {
    /// Directory of metadata record files.
    pub dir: PathBuf,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct OutputConfigRaw {
    dir: Option<String>,
    extension: Option<String>,
}

/// Resolved output configuration.
#[derive(Debug)]
pub struct OutputConfig {
    /// Directory pages are written to.
    pub dir: PathBuf,
    /// Page file extension, without the dot.
    pub extension: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("site"),
            extension: "html".to_owned(),
        }
    }
}

/// Site-wide presentation settings.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    /// Site title, prefixed to every page title.
    pub title: String,
    /// Heading link pattern; `{module}` is replaced by the module id.
    pub source_url: Option<String>,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            title: "API Reference".to_owned(),
            source_url: None,
        }
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct RenderConfigRaw {
    placeholder: Option<String>,
    group_parameters: Option<bool>,
    layout: Option<String>,
}

/// Resolved page rendering configuration.
#[derive(Debug)]
pub struct RenderConfig {
    /// Text shown for undocumented parameters.
    pub placeholder: String,
    /// Merge consecutive parameters sharing one description.
    pub group_parameters: bool,
    /// External layout template.
    pub layout: Option<PathBuf>,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            placeholder: "undocumented".to_owned(),
            group_parameters: true,
            layout: None,
        }
    }
}

/// Build settings.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct BuildConfig {
    /// Render modules in parallel.
    pub parallel: bool,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self { parallel: true }
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
        /// Config field path (e.g., "`site.title`").
        field: String,
        /// Error message (e.g., "${`PRODUCT`} not set").
        message: String,
    },
}

/// Require a string field to be non-empty.
fn require_non_empty(value: &str, field: &str) -> Result<(), ConfigError> {
    if value.trim().is_empty() {
        return Err(ConfigError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

/// Require a URL field to use http:// or https:// scheme.
fn require_http_url(url: &str, field: &str) -> Result<(), ConfigError> {
    if !url.starts_with("http://") && !url.starts_with("https://") {
        return Err(ConfigError::Validation(format!(
            "{field} must start with http:// or https://"
        )));
    }
    Ok(())
}

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file.
    /// Otherwise, searches for `apiref.toml` in current directory and parents.
    ///
    /// CLI settings are applied after loading and path resolution, so they
    /// take precedence over config file values.
    ///
    /// # Errors
    ///
    /// Returns error if explicit `config_path` doesn't exist, parsing fails or
    /// the resulting configuration is invalid.
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
            config.validate()?;
        }

        Ok(config)
    }

    /// Apply CLI settings to the configuration.
    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(source_dir) = &settings.source_dir {
            self.source_resolved.dir.clone_from(source_dir);
        }
        if let Some(output_dir) = &settings.output_dir {
            self.output_resolved.dir.clone_from(output_dir);
        }
        if let Some(parallel) = settings.parallel {
            self.build.parallel = parallel;
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
            source: SourceConfigRaw::default(),
            output: OutputConfigRaw::default(),
            site: SiteConfig::default(),
            render: RenderConfigRaw::default(),
            build: BuildConfig::default(),
            source_resolved: SourceConfig {
                dir: base.join("metadata"),
            },
            output_resolved: OutputConfig {
                dir: base.join("site"),
                ..OutputConfig::default()
            },
            render_resolved: RenderConfig::default(),
            config_path: None,
        }
    }

    /// Load configuration from a specific file.
    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;

        // Expand environment variables before path resolution
        config.expand_env_vars()?;

        let config_dir = path.parent().unwrap_or(Path::new("."));
        config.resolve_paths(config_dir);
        config.config_path = Some(path.to_path_buf());

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// Called automatically after loading from file and after CLI overrides.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_site()?;
        self.validate_output()?;
        require_non_empty(&self.render_resolved.placeholder, "render.placeholder")?;
        Ok(())
    }

    fn validate_site(&self) -> Result<(), ConfigError> {
        require_non_empty(&self.site.title, "site.title")?;

        if let Some(ref source_url) = self.site.source_url {
            require_non_empty(source_url, "site.source_url")?;
            require_http_url(source_url, "site.source_url")?;
            if !source_url.contains("{module}") {
                return Err(ConfigError::Validation(
                    "site.source_url must contain the {module} placeholder".to_owned(),
                ));
            }
        }

        Ok(())
    }

    fn validate_output(&self) -> Result<(), ConfigError> {
        let extension = &self.output_resolved.extension;
        require_non_empty(extension, "output.extension")?;
        if !extension.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(ConfigError::Validation(format!(
                "output.extension must be alphanumeric, got `{extension}`"
            )));
        }

        if self.output_resolved.dir == self.source_resolved.dir {
            return Err(ConfigError::Validation(
                "output.dir cannot be the same as source.dir".to_owned(),
            ));
        }

        Ok(())
    }

    /// Expand environment variable references in configuration strings.
    fn expand_env_vars(&mut self) -> Result<(), ConfigError> {
        self.site.title = expand::expand_env(&self.site.title, "site.title")?;

        if let Some(ref url) = self.site.source_url {
            self.site.source_url = Some(expand::expand_env(url, "site.source_url")?);
        }

        if let Some(ref placeholder) = self.render.placeholder {
            self.render.placeholder = Some(expand::expand_env(placeholder, "render.placeholder")?);
        }

        Ok(())
    }

    /// Resolve relative paths against the config directory.
    fn resolve_paths(&mut self, config_dir: &Path) {
        let resolve = |path: Option<&str>, default: &str| config_dir.join(path.unwrap_or(default));

        self.source_resolved = SourceConfig {
            dir: resolve(self.source.dir.as_deref(), "metadata"),
        };

        self.output_resolved = OutputConfig {
            dir: resolve(self.output.dir.as_deref(), "site"),
            extension: self
                .output
                .extension
                .as_deref()
                .map_or_else(|| "html".to_owned(), |e| e.trim_start_matches('.').to_owned()),
        };

        let defaults = RenderConfig::default();
        self.render_resolved = RenderConfig {
            placeholder: self.render.placeholder.clone().unwrap_or(defaults.placeholder),
            group_parameters: self.render.group_parameters.unwrap_or(defaults.group_parameters),
            layout: self.render.layout.as_deref().map(|l| config_dir.join(l)),
        };
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default_with_base(Path::new("/test"));
        assert_eq!(config.source_resolved.dir, PathBuf::from("/test/metadata"));
        assert_eq!(config.output_resolved.dir, PathBuf::from("/test/site"));
        assert_eq!(config.output_resolved.extension, "html");
        assert_eq!(config.site.title, "API Reference");
        assert_eq!(config.render_resolved.placeholder, "undocumented");
        assert!(config.render_resolved.group_parameters);
        assert!(config.render_resolved.layout.is_none());
        assert!(config.build.parallel);
    }

    #[test]
    fn test_parse_minimal_config() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.site.title, "API Reference");
        assert!(config.site.source_url.is_none());
        assert!(config.build.parallel);
    }

    #[test]
    fn test_parse_site_config() {
        let toml = r#"
[site]
title = "MagickCore, C API"
source_url = "https://imagemagick.org/api/MagickCore/{module}_8c.html"

[build]
parallel = false
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.site.title, "MagickCore, C API");
        assert_eq!(
            config.site.source_url.as_deref(),
            Some("https://imagemagick.org/api/MagickCore/{module}_8c.html")
        );
        assert!(!config.build.parallel);
    }

    #[test]
    fn test_resolve_paths() {
        let toml = r#"
[source]
dir = "records"

[output]
dir = "public/api"
extension = ".php"

[render]
placeholder = "not documented"
group_parameters = false
layout = "chrome/layout.html"
"#;
        let mut config: Config = toml::from_str(toml).unwrap();
        config.resolve_paths(Path::new("/project"));

        assert_eq!(config.source_resolved.dir, PathBuf::from("/project/records"));
        assert_eq!(config.output_resolved.dir, PathBuf::from("/project/public/api"));
        assert_eq!(config.output_resolved.extension, "php");
        assert_eq!(config.render_resolved.placeholder, "not documented");
        assert!(!config.render_resolved.group_parameters);
        assert_eq!(
            config.render_resolved.layout,
            Some(PathBuf::from("/project/chrome/layout.html"))
        );
    }

    #[test]
    fn test_load_from_file_resolves_against_config_dir() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join(CONFIG_FILENAME);
        std::fs::write(&path, "[source]\ndir = \"meta\"\n[site]\ntitle = \"Wand\"\n").unwrap();

        let config = Config::load(Some(&path), None).unwrap();
        assert_eq!(config.source_resolved.dir, temp.path().join("meta"));
        assert_eq!(config.output_resolved.dir, temp.path().join("site"));
        assert_eq!(config.site.title, "Wand");
        assert_eq!(config.config_path, Some(path));
    }

    #[test]
    fn test_load_explicit_missing_file() {
        let temp = tempfile::tempdir().unwrap();
        let result = Config::load(Some(&temp.path().join("missing.toml")), None);
        assert!(matches!(result, Err(ConfigError::NotFound(_))));
    }

    #[test]
    fn test_load_parse_error() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join(CONFIG_FILENAME);
        std::fs::write(&path, "[site\ntitle = 1").unwrap();
        assert!(matches!(
            Config::load(Some(&path), None),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_apply_cli_settings() {
        let mut config = Config::default_with_base(Path::new("/test"));
        let overrides = CliSettings {
            output_dir: Some(PathBuf::from("/out")),
            parallel: Some(false),
            ..Default::default()
        };

        config.apply_cli_settings(&overrides);

        assert_eq!(config.output_resolved.dir, PathBuf::from("/out"));
        assert_eq!(config.source_resolved.dir, PathBuf::from("/test/metadata")); // Unchanged
        assert!(!config.build.parallel);
    }

    #[test]
    fn test_apply_cli_settings_empty() {
        let mut config = Config::default_with_base(Path::new("/test"));
        config.apply_cli_settings(&CliSettings::default());
        assert_eq!(config.source_resolved.dir, PathBuf::from("/test/metadata"));
        assert!(config.build.parallel);
    }

    #[test]
    fn test_cli_settings_are_validated() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join(CONFIG_FILENAME);
        std::fs::write(&path, "").unwrap();
        let overrides = CliSettings {
            source_dir: Some(temp.path().join("same")),
            output_dir: Some(temp.path().join("same")),
            ..Default::default()
        };

        let err = Config::load(Some(&path), Some(&overrides)).unwrap_err();
        assert!(err.to_string().contains("output.dir"));
    }

    #[test]
    fn test_expand_env_vars_site() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::set_var("APIREF_TEST_API", "MagickWand");
        }
        let toml = r#"
[site]
title = "${APIREF_TEST_API}, C API"
source_url = "https://imagemagick.org/api/${APIREF_TEST_API}/{module}_8c.html"
"#;
        let mut config: Config = toml::from_str(toml).unwrap();
        config.expand_env_vars().unwrap();
        assert_eq!(config.site.title, "MagickWand, C API");
        assert_eq!(
            config.site.source_url.as_deref(),
            Some("https://imagemagick.org/api/MagickWand/{module}_8c.html")
        );
        unsafe {
            std::env::remove_var("APIREF_TEST_API");
        }
    }

    #[test]
    fn test_validate_default_config_passes() {
        assert!(Config::default_with_base(Path::new("/test")).validate().is_ok());
    }

    #[test]
    fn test_validate_empty_title() {
        let mut config = Config::default_with_base(Path::new("/test"));
        config.site.title = "  ".to_owned();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("site.title cannot be empty"));
    }

    #[test]
    fn test_validate_source_url_scheme() {
        let mut config = Config::default_with_base(Path::new("/test"));
        config.site.source_url = Some("ftp://example.com/{module}".to_owned());
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("http://"));
    }

    #[test]
    fn test_validate_source_url_requires_module() {
        let mut config = Config::default_with_base(Path::new("/test"));
        config.site.source_url = Some("https://example.com/source.html".to_owned());
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("{module}"));
    }

    #[test]
    fn test_validate_extension() {
        let mut config = Config::default_with_base(Path::new("/test"));
        config.output_resolved.extension = "ht/ml".to_owned();
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn test_validate_placeholder() {
        let mut config = Config::default_with_base(Path::new("/test"));
        config.render_resolved.placeholder = String::new();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("render.placeholder"));
    }
}
