//! Site assembly for apiref.
//!
//! [`SiteBuilder`] drives one generation run over a loaded
//! [`ModuleIndex`](apiref_meta::ModuleIndex):
//!
//! 1. Build the cross-reference table. Anchor collisions abort the run.
//! 2. Render every module in lexicographic id order, optionally on the rayon
//!    thread pool. Page order is kept regardless.
//! 3. Check that every emitted link points at a rendered anchor.
//! 4. Write module pages, the site index and `symbols.json`.
//!
//! Fatal errors stop the run before step 4, so a failed run leaves the
//! output directory untouched. Non-fatal problems are collected into the
//! [`BuildReport`].

mod builder;
mod links;

pub use builder::{BuildError, BuildReport, SYMBOLS_FILE, SiteBuilder};
pub use links::check_links;
