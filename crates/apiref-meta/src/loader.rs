//! Load phase: metadata records into a [`ModuleIndex`].

use std::time::Instant;

use crate::entry::EntryError;
use crate::index::{IndexError, ModuleIndex};
use crate::record::EntryRecord;
use crate::source::{MetadataSource, SourceError};

/// Error returned when the load phase fails. All variants are fatal.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error(transparent)]
    Source(#[from] SourceError),
    /// A module record has no id.
    #[error("Module record at position {0} has no id")]
    MissingModuleId(usize),
    /// An entry record failed validation.
    #[error("Invalid entry #{position} in module `{module}`: {source}")]
    Entry {
        module: String,
        position: usize,
        #[source]
        source: EntryError,
    },
    #[error(transparent)]
    Index(#[from] IndexError),
}

/// Read every record from `source` and build the module index.
///
/// Entry records carrying a `module_id` go to that module; others go to the
/// module of the enclosing record. A record's own module is created only
/// when it keeps at least one entry or sets a title or API family.
///
/// # Errors
///
/// Returns [`LoadError`] on unreadable sources, invalid entries or duplicate
/// symbols within a module.
pub fn load_index(source: &dyn MetadataSource) -> Result<ModuleIndex, LoadError> {
    let start = Instant::now();
    let records = source.scan()?;
    let mut index = ModuleIndex::new();

    for (record_pos, record) in records.iter().enumerate() {
        let module_id = record
            .id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .ok_or(LoadError::MissingModuleId(record_pos))?;
        let has_metadata = record.title.is_some() || record.api.is_some();
        let keeps_entry = record
            .entries
            .iter()
            .any(|entry| target_module(entry).is_none_or(|target| target == module_id));
        if has_metadata || keeps_entry {
            index.declare_module(module_id, record.title.as_deref(), record.api.as_deref())?;
        }

        for (position, entry_record) in record.entries.iter().enumerate() {
            let target = target_module(entry_record).unwrap_or(module_id);
            let entry = entry_record.to_entry().map_err(|source| LoadError::Entry {
                module: target.to_owned(),
                position,
                source,
            })?;
            index.add_entry(target, entry)?;
        }
    }

    tracing::info!(
        modules = index.len(),
        entries = index.entry_count(),
        elapsed_ms = start.elapsed().as_secs_f64() * 1000.0,
        "Metadata loaded"
    );
    Ok(index)
}

/// Module named by the entry record itself, if any.
fn target_module(record: &EntryRecord) -> Option<&str> {
    record
        .module_id
        .as_deref()
        .map(str::trim)
        .filter(|id| !id.is_empty())
}
