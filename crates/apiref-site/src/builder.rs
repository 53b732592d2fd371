//! Batch driver: resolve, render, check, write.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use apiref_meta::{LoadError, MetadataSource, ModuleIndex, Warnings, load_index};
use apiref_renderer::{PageRenderer, PageTemplate, RenderError, RenderedPage, render_site_index};
use apiref_xref::{CrossReferenceIndex, XrefError};
use rayon::prelude::*;

use crate::links::check_links;

/// File name of the JSON symbol map.
pub const SYMBOLS_FILE: &str = "symbols.json";

/// Error that aborts a generation run.
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error(transparent)]
    Load(#[from] LoadError),
    #[error(transparent)]
    Xref(#[from] XrefError),
    #[error("Layout error: {0}")]
    Layout(String),
    /// A module page would overwrite another output file.
    #[error("Module `{module}` would overwrite {file}")]
    FileCollision { module: String, file: String },
    #[error("Failed to serialize symbol map: {0}")]
    Json(#[from] serde_json::Error),
    #[error("I/O error writing {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl From<RenderError> for BuildError {
    fn from(err: RenderError) -> Self {
        match err {
            RenderError::Layout(message) => Self::Layout(message),
        }
    }
}

/// Outcome of a successful run.
#[derive(Debug, Default)]
pub struct BuildReport {
    pub modules: usize,
    pub entries: usize,
    /// Files written; zero for a dry run.
    pub files_written: usize,
    pub warnings: Warnings,
}

impl BuildReport {
    /// One-line end-of-run summary.
    #[must_use]
    pub fn summary(&self) -> String {
        let modules = if self.modules == 1 { "module" } else { "modules" };
        let entries = if self.entries == 1 { "entry" } else { "entries" };
        format!(
            "{} {modules}, {} {entries}, {} files written, {}",
            self.modules,
            self.entries,
            self.files_written,
            self.warnings.summary()
        )
    }
}

/// Everything produced before the first write.
struct Site {
    xref: CrossReferenceIndex,
    pages: Vec<RenderedPage>,
    index_html: String,
    warnings: Warnings,
}

/// Generates the reference site for a module index.
///
/// # Example
///
/// ```
/// use apiref_meta::{ApiEntry, ModuleIndex};
/// use apiref_renderer::PageTemplate;
/// use apiref_site::SiteBuilder;
///
/// let mut index = ModuleIndex::new();
/// index.add_entry("draw", ApiEntry::new("DrawImage", "void DrawImage(void)")?)?;
///
/// let report = SiteBuilder::new(index, PageTemplate::default()).check()?;
/// assert_eq!(report.modules, 1);
/// assert_eq!(report.files_written, 0);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug)]
pub struct SiteBuilder {
    index: ModuleIndex,
    template: PageTemplate,
    parallel: bool,
}

impl SiteBuilder {
    #[must_use]
    pub fn new(index: ModuleIndex, template: PageTemplate) -> Self {
        Self {
            index,
            template,
            parallel: true,
        }
    }

    /// Load the module index from a metadata source.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::Load`] on unreadable metadata or duplicate symbols.
    pub fn load(source: &dyn MetadataSource, template: PageTemplate) -> Result<Self, BuildError> {
        Ok(Self::new(load_index(source)?, template))
    }

    /// Render modules on the rayon thread pool (default `true`).
    #[must_use]
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Run every phase and write the site to `out_dir`.
    ///
    /// Nothing is written unless resolving and rendering succeed for every
    /// module.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError`] on anchor collisions, layout failures or I/O errors.
    pub fn build(&self, out_dir: &Path) -> Result<BuildReport, BuildError> {
        let start = Instant::now();
        let site = self.assemble()?;
        let files_written = self.write(&site, out_dir)?;

        let report = self.report(site.warnings, files_written);
        tracing::info!(
            out_dir = %out_dir.display(),
            modules = report.modules,
            files = files_written,
            warnings = report.warnings.len(),
            elapsed_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Site built"
        );
        Ok(report)
    }

    /// Run every phase except writing.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError`] on anchor collisions or layout failures.
    pub fn check(&self) -> Result<BuildReport, BuildError> {
        let site = self.assemble()?;
        Ok(self.report(site.warnings, 0))
    }

    fn report(&self, warnings: Warnings, files_written: usize) -> BuildReport {
        BuildReport {
            modules: self.index.len(),
            entries: self.index.entry_count(),
            files_written,
            warnings,
        }
    }

    fn assemble(&self) -> Result<Site, BuildError> {
        let xref = CrossReferenceIndex::build(&self.index)?;
        let mut warnings = Warnings::new();
        warnings.extend(xref.ambiguities());

        let pages = self.render_pages(&xref)?;
        self.check_file_names(&pages)?;
        for page in &pages {
            warnings.extend(page.warnings.iter().cloned());
        }
        warnings.extend(check_links(&pages));

        let index_html = render_site_index(&self.template, &self.index)?;
        Ok(Site {
            xref,
            pages,
            index_html,
            warnings,
        })
    }

    /// Render all modules, keeping module order.
    fn render_pages(&self, xref: &CrossReferenceIndex) -> Result<Vec<RenderedPage>, BuildError> {
        let renderer = PageRenderer::new(&self.template, xref);
        let modules: Vec<_> = self.index.modules().collect();

        let results: Vec<Result<RenderedPage, RenderError>> = if self.parallel {
            modules.par_iter().map(|module| renderer.render(module)).collect()
        } else {
            modules.iter().map(|module| renderer.render(module)).collect()
        };

        results
            .into_iter()
            .map(|result| result.map_err(BuildError::from))
            .collect()
    }

    /// Every page must land on its own file, apart from the index and symbol map.
    fn check_file_names(&self, pages: &[RenderedPage]) -> Result<(), BuildError> {
        let index_file = self.template.index_file_name();
        let mut taken: HashMap<String, String> = HashMap::new();
        taken.insert(index_file.to_lowercase(), index_file);
        taken.insert(SYMBOLS_FILE.to_owned(), SYMBOLS_FILE.to_owned());

        for page in pages {
            if let Some(file) = taken.get(&page.file_name.to_lowercase()) {
                return Err(BuildError::FileCollision {
                    module: page.module.clone(),
                    file: file.clone(),
                });
            }
            taken.insert(page.file_name.to_lowercase(), page.file_name.clone());
        }
        Ok(())
    }

    fn write(&self, site: &Site, out_dir: &Path) -> Result<usize, BuildError> {
        create_dir(out_dir)?;

        let mut written = 0;
        for page in &site.pages {
            write_file(&out_dir.join(&page.file_name), &page.html)?;
            written += 1;
        }
        write_file(&out_dir.join(self.template.index_file_name()), &site.index_html)?;
        write_file(&out_dir.join(SYMBOLS_FILE), &site.xref.to_json()?)?;
        Ok(written + 2)
    }
}

fn create_dir(path: &Path) -> Result<(), BuildError> {
    fs::create_dir_all(path).map_err(|source| BuildError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn write_file(path: &Path, content: &str) -> Result<(), BuildError> {
    fs::write(path, content).map_err(|source| BuildError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::debug!(path = %path.display(), bytes = content.len(), "Wrote file");
    Ok(())
}
