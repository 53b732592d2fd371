//! Global symbol table.

use std::collections::{BTreeMap, HashMap};

use apiref_meta::{ModuleIndex, Warning};
use serde::{Deserialize, Serialize};

/// Error returned when the symbol table cannot be built.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum XrefError {
    /// Two symbols in one module map to the same anchor.
    #[error("Anchor `{anchor}` in module `{module}` is shared by `{first}` and `{second}`")]
    AnchorCollision {
        module: String,
        anchor: String,
        first: String,
        second: String,
    },
}

/// Anchor id for a symbol.
///
/// Anchors are the symbol name itself, case preserved. Only ASCII whitespace,
/// which is not allowed in an HTML `id`, is replaced by `_`.
///
/// ```
/// use apiref_xref::anchor_for;
///
/// assert_eq!(anchor_for("AcquireAuthenticCacheView"), "AcquireAuthenticCacheView");
/// assert_eq!(anchor_for("Magick Wand"), "Magick_Wand");
/// ```
#[must_use]
pub fn anchor_for(symbol: &str) -> String {
    symbol
        .chars()
        .map(|c| if c.is_ascii_whitespace() { '_' } else { c })
        .collect()
}

/// Where a symbol is documented.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct XrefTarget {
    pub module: String,
    pub anchor: String,
}

impl XrefTarget {
    /// Link to this target from a page of `from_module`.
    ///
    /// Same-page targets use a bare fragment.
    #[must_use]
    pub fn href(&self, from_module: &str, extension: &str) -> String {
        if self.module == from_module {
            format!("#{}", self.anchor)
        } else {
            format!("{}.{extension}#{}", self.module, self.anchor)
        }
    }
}

/// Mapping from symbol name to the modules and anchors documenting it.
///
/// Built once after loading and read-only afterwards. Iteration and JSON
/// output are ordered by symbol, then by module id.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CrossReferenceIndex {
    symbols: BTreeMap<String, Vec<XrefTarget>>,
}

impl CrossReferenceIndex {
    /// Register every entry of every module.
    ///
    /// # Errors
    ///
    /// Returns [`XrefError::AnchorCollision`] if two symbols of one module
    /// share an anchor.
    pub fn build(index: &ModuleIndex) -> Result<Self, XrefError> {
        let mut symbols: BTreeMap<String, Vec<XrefTarget>> = BTreeMap::new();

        for module in index.modules() {
            let mut anchors: HashMap<String, &str> = HashMap::with_capacity(module.len());
            for entry in module.entries() {
                let anchor = anchor_for(entry.symbol());
                if let Some(first) = anchors.insert(anchor.clone(), entry.symbol()) {
                    return Err(XrefError::AnchorCollision {
                        module: module.id().to_owned(),
                        anchor,
                        first: first.to_owned(),
                        second: entry.symbol().to_owned(),
                    });
                }
                symbols
                    .entry(entry.symbol().to_owned())
                    .or_default()
                    .push(XrefTarget {
                        module: module.id().to_owned(),
                        anchor,
                    });
            }
        }

        tracing::debug!(
            symbols = symbols.len(),
            modules = index.len(),
            "Built cross-reference table"
        );
        Ok(Self { symbols })
    }

    /// Resolve a symbol mentioned on a page of `from_module`.
    ///
    /// A definition in `from_module` wins; otherwise the definition in the
    /// lexicographically first module is used.
    #[must_use]
    pub fn resolve(&self, symbol: &str, from_module: &str) -> Option<&XrefTarget> {
        let targets = self.symbols.get(symbol)?;
        targets
            .iter()
            .find(|t| t.module == from_module)
            .or_else(|| targets.first())
    }

    /// All definitions of a symbol, in module order.
    #[must_use]
    pub fn targets(&self, symbol: &str) -> &[XrefTarget] {
        self.symbols.get(symbol).map_or(&[], Vec::as_slice)
    }

    #[must_use]
    pub fn contains(&self, symbol: &str) -> bool {
        self.symbols.contains_key(symbol)
    }

    /// Number of distinct symbols.
    #[must_use]
    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// Symbols with their definitions, in symbol order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[XrefTarget])> {
        self.symbols.iter().map(|(s, t)| (s.as_str(), t.as_slice()))
    }

    /// One [`Warning::AmbiguousSymbol`] per symbol defined in several modules.
    pub fn ambiguities(&self) -> impl Iterator<Item = Warning> + '_ {
        self.symbols
            .iter()
            .filter(|(_, targets)| targets.len() > 1)
            .map(|(symbol, targets)| Warning::AmbiguousSymbol {
                symbol: symbol.clone(),
                modules: targets.iter().map(|t| t.module.clone()).collect(),
            })
    }

    /// Pretty-printed JSON symbol map.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
