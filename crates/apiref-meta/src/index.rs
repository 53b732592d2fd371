//! Module index: entries grouped by source module.
//!
//! Modules are kept in a `BTreeMap`, so iteration is lexicographic by module
//! id. Within a module, entries are stored in insertion order and exposed in
//! case-sensitive alphabetical order through [`OrderedEntries`].
//!
//! # Ordering
//!
//! The sort permutation is computed on the first call to
//! [`Module::ordered_entries`] and cached until the module is mutated again.
//! The sort is stable, so entries that compare equal keep insertion order.

use std::collections::{BTreeMap, HashMap};
use std::iter::FusedIterator;
use std::sync::OnceLock;

use crate::entry::ApiEntry;

/// Error returned when an entry cannot be added to the index.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum IndexError {
    /// The same symbol name was added twice to one module.
    #[error("Duplicate symbol `{symbol}` in module `{module}`")]
    DuplicateSymbol {
        /// Module identifier.
        module: String,
        /// Offending symbol name.
        symbol: String,
    },
    /// A module id cannot be used as an output file stem.
    #[error("Invalid module id `{id}`: {reason}")]
    InvalidModuleId {
        /// Module identifier as given.
        id: String,
        reason: &'static str,
    },
}

/// File stem of the site index page.
pub const RESERVED_MODULE_ID: &str = "index";

/// Check that a module id is a plain file stem inside the output directory.
///
/// ```
/// use apiref_meta::check_module_id;
///
/// assert!(check_module_id("cache-view").is_ok());
/// assert!(check_module_id("../escaped").is_err());
/// assert!(check_module_id("index").is_err());
/// ```
///
/// # Errors
///
/// Returns [`IndexError::InvalidModuleId`] for empty ids, ids containing path
/// separators or control characters, ids starting with `.`, and the reserved
/// `index` stem (compared case-insensitively).
pub fn check_module_id(id: &str) -> Result<(), IndexError> {
    let reason = if id.trim().is_empty() {
        Some("id is empty")
    } else if id.contains(['/', '\\']) {
        Some("id contains a path separator")
    } else if id.starts_with('.') {
        Some("id starts with `.`")
    } else if id.chars().any(char::is_control) {
        Some("id contains a control character")
    } else if id.eq_ignore_ascii_case(RESERVED_MODULE_ID) {
        Some("`index` is reserved for the site index page")
    } else {
        None
    };
    match reason {
        Some(reason) => Err(IndexError::InvalidModuleId {
            id: id.to_owned(),
            reason,
        }),
        None => Ok(()),
    }
}

/// A named group of entries corresponding to one API source file.
#[derive(Clone, Debug)]
pub struct Module {
    id: String,
    title: String,
    api: Option<String>,
    entries: Vec<ApiEntry>,
    by_symbol: HashMap<String, usize>,
    order: OnceLock<Vec<usize>>,
}

impl Module {
    fn new(id: &str) -> Self {
        Self {
            id: id.to_owned(),
            title: title_from_id(id),
            api: None,
            entries: Vec::new(),
            by_symbol: HashMap::new(),
            order: OnceLock::new(),
        }
    }

    /// Module identifier (e.g. `cache-view`).
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Human-readable title.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// API family label (e.g. `MagickCore`), if declared.
    #[must_use]
    pub fn api(&self) -> Option<&str> {
        self.api.as_deref()
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in insertion order.
    #[must_use]
    pub fn entries(&self) -> &[ApiEntry] {
        &self.entries
    }

    /// Look up an entry by exact symbol name.
    #[must_use]
    pub fn get(&self, symbol: &str) -> Option<&ApiEntry> {
        self.by_symbol.get(symbol).map(|&i| &self.entries[i])
    }

    /// Entries sorted case-sensitively by symbol name.
    #[must_use]
    pub fn ordered_entries(&self) -> OrderedEntries<'_> {
        let order = self.order.get_or_init(|| {
            let mut order: Vec<usize> = (0..self.entries.len()).collect();
            order.sort_by(|&a, &b| self.entries[a].symbol().cmp(self.entries[b].symbol()));
            order
        });
        OrderedEntries {
            entries: &self.entries,
            order,
            front: 0,
            back: order.len(),
        }
    }

    fn push(&mut self, entry: ApiEntry) -> Result<(), IndexError> {
        if self.by_symbol.contains_key(entry.symbol()) {
            return Err(IndexError::DuplicateSymbol {
                module: self.id.clone(),
                symbol: entry.symbol().to_owned(),
            });
        }
        self.by_symbol
            .insert(entry.symbol().to_owned(), self.entries.len());
        self.entries.push(entry.with_module(self.id.clone()));
        self.order = OnceLock::new();
        Ok(())
    }
}

/// Restartable iterator over a module's entries in alphabetical order.
///
/// Cloning the iterator restarts iteration from the clone's position;
/// calling [`Module::ordered_entries`] again restarts from the beginning.
#[derive(Clone, Debug)]
pub struct OrderedEntries<'a> {
    entries: &'a [ApiEntry],
    order: &'a [usize],
    front: usize,
    back: usize,
}

impl OrderedEntries<'_> {
    fn empty() -> Self {
        Self {
            entries: &[],
            order: &[],
            front: 0,
            back: 0,
        }
    }
}

impl<'a> Iterator for OrderedEntries<'a> {
    type Item = &'a ApiEntry;

    fn next(&mut self) -> Option<Self::Item> {
        if self.front >= self.back {
            return None;
        }
        let entry = &self.entries[self.order[self.front]];
        self.front += 1;
        Some(entry)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.back - self.front;
        (remaining, Some(remaining))
    }
}

impl DoubleEndedIterator for OrderedEntries<'_> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.front >= self.back {
            return None;
        }
        self.back -= 1;
        Some(&self.entries[self.order[self.back]])
    }
}

impl ExactSizeIterator for OrderedEntries<'_> {}

impl FusedIterator for OrderedEntries<'_> {}

/// All modules of a documentation run, keyed by module id.
#[derive(Clone, Debug, Default)]
pub struct ModuleIndex {
    modules: BTreeMap<String, Module>,
}

impl ModuleIndex {
    /// Create an empty index.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register module metadata, creating the module if needed.
    ///
    /// `None` values leave the current title/api untouched.
    ///
    /// # Errors
    ///
    /// Returns [`IndexError::InvalidModuleId`] if `id` fails [`check_module_id`].
    pub fn declare_module(
        &mut self,
        id: &str,
        title: Option<&str>,
        api: Option<&str>,
    ) -> Result<(), IndexError> {
        let module = self.module_entry(id)?;
        if let Some(title) = title.filter(|t| !t.trim().is_empty()) {
            title.trim().clone_into(&mut module.title);
        }
        if let Some(api) = api.filter(|a| !a.trim().is_empty()) {
            module.api = Some(api.trim().to_owned());
        }
        Ok(())
    }

    /// Append an entry to a module, creating the module if needed.
    ///
    /// The entry's module field is set to `module_id`.
    ///
    /// # Errors
    ///
    /// Returns [`IndexError::DuplicateSymbol`] if the module already holds an
    /// entry with the exact same symbol name, or
    /// [`IndexError::InvalidModuleId`] for an unusable module id.
    pub fn add_entry(&mut self, module_id: &str, entry: ApiEntry) -> Result<(), IndexError> {
        self.module_entry(module_id)?.push(entry)
    }

    /// Entries of a module in alphabetical order (empty for unknown modules).
    #[must_use]
    pub fn ordered_entries(&self, module_id: &str) -> OrderedEntries<'_> {
        self.modules
            .get(module_id)
            .map_or_else(OrderedEntries::empty, Module::ordered_entries)
    }

    /// Look up a module by id.
    #[must_use]
    pub fn module(&self, id: &str) -> Option<&Module> {
        self.modules.get(id)
    }

    /// Modules in lexicographic id order.
    pub fn modules(&self) -> impl ExactSizeIterator<Item = &Module> {
        self.modules.values()
    }

    /// Number of modules.
    #[must_use]
    pub fn len(&self) -> usize {
        self.modules.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    /// Total number of entries across all modules.
    #[must_use]
    pub fn entry_count(&self) -> usize {
        self.modules.values().map(Module::len).sum()
    }

    fn module_entry(&mut self, id: &str) -> Result<&mut Module, IndexError> {
        if !self.modules.contains_key(id) {
            check_module_id(id)?;
        }
        Ok(self
            .modules
            .entry(id.to_owned())
            .or_insert_with(|| Module::new(id)))
    }
}

/// Derive a display title from a module id.
///
/// ```
/// use apiref_meta::title_from_id;
///
/// assert_eq!(title_from_id("cache-view"), "Cache View");
/// assert_eq!(title_from_id("magick_wand"), "Magick Wand");
/// ```
#[must_use]
pub fn title_from_id(id: &str) -> String {
    id.split(['-', '_'])
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            chars.next().map_or_else(String::new, |first| {
                first.to_uppercase().chain(chars).collect()
            })
        })
        .collect::<Vec<_>>()
        .join(" ")
}
