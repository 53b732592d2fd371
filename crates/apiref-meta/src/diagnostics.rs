//! Non-fatal diagnostics collected during a generation run.
//!
//! Fatal conditions are `Err` values of the individual crates. Everything
//! here is reported in the end-of-run summary and never stops generation.

use std::collections::BTreeMap;
use std::fmt;

/// Category of a [`Warning`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum WarningKind {
    UnresolvedReference,
    MalformedEntry,
    DanglingLink,
    AmbiguousSymbol,
}

impl WarningKind {
    /// Short label used in summaries.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::UnresolvedReference => "unresolved reference",
            Self::MalformedEntry => "malformed entry",
            Self::DanglingLink => "dangling link",
            Self::AmbiguousSymbol => "ambiguous symbol",
        }
    }
}

impl fmt::Display for WarningKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A non-fatal problem found while resolving or rendering.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Warning {
    /// An in-text symbol mention matched no known entry.
    UnresolvedReference {
        module: String,
        symbol: String,
        token: String,
    },
    /// An entry is missing a field or its signature does not parse.
    MalformedEntry {
        module: String,
        symbol: String,
        reason: String,
    },
    /// An emitted link points at a page or anchor that was not rendered.
    DanglingLink {
        from_module: String,
        target_module: String,
        anchor: String,
    },
    /// A symbol is defined in more than one module.
    AmbiguousSymbol {
        symbol: String,
        modules: Vec<String>,
    },
}

impl Warning {
    #[must_use]
    pub fn kind(&self) -> WarningKind {
        match self {
            Self::UnresolvedReference { .. } => WarningKind::UnresolvedReference,
            Self::MalformedEntry { .. } => WarningKind::MalformedEntry,
            Self::DanglingLink { .. } => WarningKind::DanglingLink,
            Self::AmbiguousSymbol { .. } => WarningKind::AmbiguousSymbol,
        }
    }
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnresolvedReference {
                module,
                symbol,
                token,
            } => write!(f, "{module}/{symbol}: unresolved reference `{token}`"),
            Self::MalformedEntry {
                module,
                symbol,
                reason,
            } => write!(f, "{module}/{symbol}: {reason}"),
            Self::DanglingLink {
                from_module,
                target_module,
                anchor,
            } => write!(
                f,
                "{from_module}: link to {target_module}#{anchor} has no target"
            ),
            Self::AmbiguousSymbol { symbol, modules } => write!(
                f,
                "`{symbol}` is defined in several modules: {}",
                modules.join(", ")
            ),
        }
    }
}

/// Ordered collection of warnings for the end-of-run report.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Warnings {
    items: Vec<Warning>,
}

impl Warnings {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a warning and log it.
    pub fn push(&mut self, warning: Warning) {
        tracing::warn!(kind = %warning.kind(), "{warning}");
        self.items.push(warning);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Warning> {
        self.items.iter()
    }

    /// Number of warnings per kind.
    #[must_use]
    pub fn counts(&self) -> BTreeMap<WarningKind, usize> {
        let mut counts = BTreeMap::new();
        for warning in &self.items {
            *counts.entry(warning.kind()).or_insert(0) += 1;
        }
        counts
    }

    /// One-line summary, e.g. `3 warnings (1 unresolved reference, 2 malformed entry)`.
    #[must_use]
    pub fn summary(&self) -> String {
        if self.items.is_empty() {
            return "no warnings".to_owned();
        }
        let parts: Vec<String> = self
            .counts()
            .into_iter()
            .map(|(kind, count)| format!("{count} {kind}"))
            .collect();
        let noun = if self.items.len() == 1 { "warning" } else { "warnings" };
        format!("{} {noun} ({})", self.items.len(), parts.join(", "))
    }
}

impl Extend<Warning> for Warnings {
    fn extend<I: IntoIterator<Item = Warning>>(&mut self, iter: I) {
        for warning in iter {
            self.push(warning);
        }
    }
}

impl<'a> IntoIterator for &'a Warnings {
    type Item = &'a Warning;
    type IntoIter = std::slice::Iter<'a, Warning>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn malformed(symbol: &str) -> Warning {
        Warning::MalformedEntry {
            module: "paint".to_owned(),
            symbol: symbol.to_owned(),
            reason: "parameter `channel` is undocumented".to_owned(),
        }
    }

    #[test]
    fn test_summary_empty() {
        assert_eq!(Warnings::new().summary(), "no warnings");
    }

    #[test]
    fn test_summary_counts_by_kind() {
        let mut warnings = Warnings::new();
        warnings.push(malformed("FloodfillPaintImage"));
        warnings.push(malformed("OpaquePaintImage"));
        warnings.push(Warning::UnresolvedReference {
            module: "draw".to_owned(),
            symbol: "DrawImage".to_owned(),
            token: "MagickCore".to_owned(),
        });
        assert_eq!(
            warnings.summary(),
            "3 warnings (1 unresolved reference, 2 malformed entry)"
        );
    }

    #[test]
    fn test_display() {
        assert_eq!(
            malformed("FloodfillPaintImage").to_string(),
            "paint/FloodfillPaintImage: parameter `channel` is undocumented"
        );
        let warning = Warning::AmbiguousSymbol {
            symbol: "GetPixels".to_owned(),
            modules: vec!["cache".to_owned(), "cache-view".to_owned()],
        };
        assert_eq!(warning.kind(), WarningKind::AmbiguousSymbol);
        assert_eq!(
            warning.to_string(),
            "`GetPixels` is defined in several modules: cache, cache-view"
        );
    }
}
