//! Metadata sources.
//!
//! A [`MetadataSource`] yields module records; [`load_index`](crate::load_index)
//! turns them into a [`ModuleIndex`](crate::ModuleIndex). Two backends:
//!
//! - [`DirSource`]: one YAML or JSON file per module in a directory
//! - [`MemorySource`]: records held in memory

use std::fs;
use std::path::{Path, PathBuf};

use crate::record::{ModuleRecord, RecordFile};

/// Error returned when metadata cannot be read.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// Source directory does not exist.
    #[error("Metadata directory not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error while reading a file or directory.
    #[error("I/O error reading {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// File content is not valid metadata.
    #[error("Invalid metadata in {}: {message}", path.display())]
    Parse { path: PathBuf, message: String },
}

/// Provider of structured metadata records.
pub trait MetadataSource: Send + Sync {
    /// Read all module records.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] if records cannot be read or parsed.
    fn scan(&self) -> Result<Vec<ModuleRecord>, SourceError>;
}

/// Record format, chosen by file extension.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Format {
    Yaml,
    Json,
}

impl Format {
    fn from_path(path: &Path) -> Option<Self> {
        match path.extension()?.to_str()? {
            "yaml" | "yml" => Some(Self::Yaml),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

/// Reads every `*.yaml`, `*.yml` and `*.json` file in a directory.
///
/// Files are read in file-name order; hidden files are skipped. The module
/// id of each file defaults to its file stem.
#[derive(Clone, Debug)]
pub struct DirSource {
    dir: PathBuf,
}

impl DirSource {
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Source directory.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn read_file(path: &Path, format: Format) -> Result<ModuleRecord, SourceError> {
        let content = fs::read_to_string(path).map_err(|source| SourceError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let parse_error = |message: String| SourceError::Parse {
            path: path.to_path_buf(),
            message,
        };

        let file: RecordFile = match format {
            Format::Yaml => serde_yaml::from_str(&content).map_err(|e| parse_error(e.to_string()))?,
            Format::Json => serde_json::from_str(&content).map_err(|e| parse_error(e.to_string()))?,
        };

        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        Ok(file.into_module(&stem))
    }
}

impl MetadataSource for DirSource {
    fn scan(&self) -> Result<Vec<ModuleRecord>, SourceError> {
        if !self.dir.is_dir() {
            return Err(SourceError::NotFound(self.dir.clone()));
        }
        let io_error = |source| SourceError::Io {
            path: self.dir.clone(),
            source,
        };

        let mut files: Vec<(PathBuf, Format)> = Vec::new();
        for entry in fs::read_dir(&self.dir).map_err(io_error)? {
            let entry = entry.map_err(io_error)?;
            let path = entry.path();
            let hidden = entry.file_name().to_string_lossy().starts_with('.');
            if hidden || !path.is_file() {
                continue;
            }
            if let Some(format) = Format::from_path(&path) {
                files.push((path, format));
            }
        }
        files.sort_by(|a, b| a.0.file_name().cmp(&b.0.file_name()));

        let mut records = Vec::with_capacity(files.len());
        for (path, format) in &files {
            let record = Self::read_file(path, *format)?;
            tracing::debug!(
                path = %path.display(),
                entries = record.entries.len(),
                "Read metadata file"
            );
            records.push(record);
        }
        Ok(records)
    }
}

/// In-memory metadata records.
///
/// # Example
///
/// ```
/// use apiref_meta::{EntryRecord, MemorySource, MetadataSource, ModuleRecord};
///
/// let source = MemorySource::new().with_module(ModuleRecord {
///     id: Some("draw".to_owned()),
///     entries: vec![EntryRecord {
///         symbol_name: "DrawImage".to_owned(),
///         ..EntryRecord::default()
///     }],
///     ..ModuleRecord::default()
/// });
/// assert_eq!(source.scan().unwrap().len(), 1);
/// ```
#[derive(Clone, Debug, Default)]
pub struct MemorySource {
    records: Vec<ModuleRecord>,
}

impl MemorySource {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a module record.
    #[must_use]
    pub fn with_module(mut self, record: ModuleRecord) -> Self {
        self.records.push(record);
        self
    }
}

impl MetadataSource for MemorySource {
    fn scan(&self) -> Result<Vec<ModuleRecord>, SourceError> {
        Ok(self.records.clone())
    }
}
