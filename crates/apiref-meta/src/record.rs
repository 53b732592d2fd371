//! Serde records for structured API metadata.
//!
//! A metadata file holds either one module:
//!
//! ```yaml
//! title: Cache Views
//! api: MagickCore
//! entries:
//!   - symbol_name: CloneCacheView
//!     return_type: "CacheView *"
//!     description: CloneCacheView() makes an exact copy of the specified cache view.
//!     parameters:
//!       - name: cache_view
//!         type: "const CacheView *"
//!         description: the cache view.
//! ```
//!
//! or a flat list of entry records, each carrying its own `module_id`.

use serde::{Deserialize, Serialize};

use crate::entry::{ApiEntry, EntryError, Parameter};

/// One module's worth of entry records.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModuleRecord {
    /// Module identifier (defaults to the file stem when read from disk).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// API family label (e.g. "MagickCore").
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api: Option<String>,
    pub entries: Vec<EntryRecord>,
}

/// One documented symbol.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryRecord {
    #[serde(alias = "symbol", alias = "name")]
    pub symbol_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub return_type: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parameters: Vec<ParameterRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Owning module; overrides the enclosing file's module.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub module_id: Option<String>,
    /// Verbatim signature block; synthesized when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signature: Option<String>,
}

/// One declared parameter.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParameterRecord {
    pub name: String,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub ty: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Top-level shape of a metadata file.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum RecordFile {
    Entries(Vec<EntryRecord>),
    Module(ModuleRecord),
}

impl RecordFile {
    /// Normalize into a module record with `default_id` as fallback id.
    pub(crate) fn into_module(self, default_id: &str) -> ModuleRecord {
        match self {
            Self::Module(mut module) => {
                if module.id.as_deref().is_none_or(|id| id.trim().is_empty()) {
                    module.id = Some(default_id.to_owned());
                }
                module
            }
            Self::Entries(entries) => ModuleRecord {
                id: Some(default_id.to_owned()),
                entries,
                ..ModuleRecord::default()
            },
        }
    }
}

impl ParameterRecord {
    fn to_parameter(&self) -> Parameter {
        let parameter = Parameter::new(self.name.trim(), self.ty.as_deref().unwrap_or_default());
        match &self.description {
            Some(description) => parameter.with_description(description.trim()),
            None => parameter,
        }
    }
}

impl EntryRecord {
    /// Build the immutable entry, synthesizing a signature if none is given.
    ///
    /// # Errors
    ///
    /// Returns [`EntryError`] if the symbol name is blank.
    pub fn to_entry(&self) -> Result<ApiEntry, EntryError> {
        let parameters: Vec<Parameter> = self.parameters.iter().map(ParameterRecord::to_parameter).collect();
        let return_type = self.return_type.as_deref().unwrap_or_default();

        let entry = match self.signature.as_deref().filter(|s| !s.trim().is_empty()) {
            Some(signature) => ApiEntry::new(&self.symbol_name, signature)?
                .with_return_type(return_type)
                .with_parameters(parameters),
            None => ApiEntry::synthesized(&self.symbol_name, return_type, parameters)?,
        };

        Ok(match &self.description {
            Some(description) => entry.with_description(description.trim()),
            None => entry,
        })
    }
}
