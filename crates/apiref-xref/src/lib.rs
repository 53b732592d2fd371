//! Cross-reference resolution for apiref.
//!
//! [`CrossReferenceIndex::build`] walks every module once and maps each
//! symbol to the module and anchor documenting it. The table is read-only
//! afterwards; [`CrossReferenceIndex::resolve_text`] turns symbol mentions in
//! descriptions into [`Segment::Link`]s.
//!
//! # Example
//!
//! ```
//! use apiref_meta::{ApiEntry, ModuleIndex};
//! use apiref_xref::CrossReferenceIndex;
//!
//! let mut index = ModuleIndex::new();
//! index.add_entry("cache", ApiEntry::new("DestroyCacheView", "void DestroyCacheView(void)")?)?;
//! index.add_entry("draw", ApiEntry::new("DrawImage", "void DrawImage(void)")?)?;
//!
//! let table = CrossReferenceIndex::build(&index)?;
//! let draw = index.module("draw").unwrap().get("DrawImage").unwrap();
//! let resolved = table.resolve_text("Call DestroyCacheView() when done.", draw);
//! assert_eq!(resolved.links().next().unwrap().href("draw", "html"), "cache.html#DestroyCacheView");
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod scan;
mod table;

pub use scan::{ResolvedText, Segment};
pub use table::{CrossReferenceIndex, XrefError, XrefTarget, anchor_for};
