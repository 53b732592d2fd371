//! Symbol mentions in free text.

use std::collections::BTreeSet;
use std::sync::LazyLock;

use apiref_meta::{ApiEntry, Warning};
use regex::Regex;

use crate::table::{CrossReferenceIndex, XrefTarget};

/// Identifier, optionally written in call syntax (`Name()`).
static MENTION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b([A-Za-z_][A-Za-z0-9_]*)(\(\))?").unwrap());

/// A piece of resolved text.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Segment {
    /// Plain text, not yet escaped.
    Text(String),
    /// A mention of a known symbol. `text` is the mention as written.
    Link { text: String, target: XrefTarget },
}

/// Text split into plain and linked segments.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ResolvedText {
    pub segments: Vec<Segment>,
    /// One warning per distinct unresolved mention.
    pub warnings: Vec<Warning>,
}

impl ResolvedText {
    /// Links in text order.
    pub fn links(&self) -> impl Iterator<Item = &XrefTarget> {
        self.segments.iter().filter_map(|segment| match segment {
            Segment::Link { target, .. } => Some(target),
            Segment::Text(_) => None,
        })
    }

    fn push_text(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        if let Some(Segment::Text(last)) = self.segments.last_mut() {
            last.push_str(text);
        } else {
            self.segments.push(Segment::Text(text.to_owned()));
        }
    }
}

/// Whether an unknown token looks like it was meant as a symbol reference.
fn is_candidate(name: &str, call_syntax: bool) -> bool {
    if call_syntax {
        return true;
    }
    let upper = name.chars().filter(char::is_ascii_uppercase).count();
    let starts_upper = name.chars().next().is_some_and(|c| c.is_ascii_uppercase());
    starts_upper && upper >= 2 && name.chars().any(|c| c.is_ascii_lowercase())
}

impl CrossReferenceIndex {
    /// Replace known symbol mentions in `text` with links.
    ///
    /// `entry` is the entry whose description is being scanned: mentions of
    /// its own symbol stay plain text, and lookups prefer its module. Unknown
    /// mentions in call syntax or CamelCase stay plain text and are reported
    /// as [`Warning::UnresolvedReference`].
    #[must_use]
    pub fn resolve_text(&self, text: &str, entry: &ApiEntry) -> ResolvedText {
        let mut resolved = ResolvedText::default();
        let mut reported: BTreeSet<&str> = BTreeSet::new();
        let mut last = 0;

        for caps in MENTION_RE.captures_iter(text) {
            let (Some(whole), Some(name)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            let call_syntax = caps.get(2).is_some();
            let name = name.as_str();

            if name == entry.symbol() {
                continue;
            }
            if let Some(target) = self.resolve(name, entry.module()) {
                resolved.push_text(&text[last..whole.start()]);
                resolved.segments.push(Segment::Link {
                    text: whole.as_str().to_owned(),
                    target: target.clone(),
                });
                last = whole.end();
            } else if is_candidate(name, call_syntax) && reported.insert(name) {
                tracing::debug!(
                    module = entry.module(),
                    symbol = entry.symbol(),
                    token = name,
                    "Unresolved reference"
                );
                resolved.warnings.push(Warning::UnresolvedReference {
                    module: entry.module().to_owned(),
                    symbol: entry.symbol().to_owned(),
                    token: name.to_owned(),
                });
            }
        }
        resolved.push_text(&text[last..]);
        resolved
    }
}
