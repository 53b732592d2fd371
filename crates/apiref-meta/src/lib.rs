//! API metadata model for apiref.
//!
//! This crate holds everything that exists before cross-referencing and
//! rendering:
//!
//! - [`ApiEntry`] and [`Parameter`]: one documented symbol, immutable once built
//! - [`ModuleIndex`]: entries grouped by module, iterated alphabetically
//! - [`MetadataSource`]: where entry records come from ([`DirSource`], [`MemorySource`])
//! - [`load_index`]: the load phase, records into a validated index
//! - [`Warnings`]: non-fatal diagnostics shared by the later phases
//!
//! # Example
//!
//! ```
//! use apiref_meta::{ApiEntry, ModuleIndex, Parameter};
//!
//! let mut index = ModuleIndex::new();
//! let entry = ApiEntry::synthesized(
//!     "DestroyCacheView",
//!     "CacheView *",
//!     vec![Parameter::new("cache_view", "CacheView *")],
//! )?;
//! index.add_entry("cache-view", entry)?;
//!
//! let first = index.ordered_entries("cache-view").next().unwrap();
//! assert_eq!(first.signature(), "CacheView *DestroyCacheView(CacheView *cache_view)");
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod diagnostics;
mod entry;
mod index;
mod loader;
mod record;
mod signature;
mod source;

pub use diagnostics::{Warning, WarningKind, Warnings};
pub use entry::{ApiEntry, EntryError, Parameter, synthesize_signature};
pub use index::{
    IndexError, Module, ModuleIndex, OrderedEntries, RESERVED_MODULE_ID, check_module_id, title_from_id,
};
pub use loader::{LoadError, load_index};
pub use record::{EntryRecord, ModuleRecord, ParameterRecord};
pub use signature::{ParsedParameter, ParsedSignature, SignatureError, Token, parse_signature, tokenize};
pub use source::{DirSource, MemorySource, MetadataSource, SourceError};
