//! HTML rendering of apiref module pages.
//!
//! Rendering is a pure function of a module's ordered entries, the
//! cross-reference table and an immutable [`PageTemplate`]; nothing in the
//! data model is mutated. Problems with individual entries never fail a page:
//! they are rendered with placeholders and reported as warnings.
//!
//! # Example
//!
//! ```
//! use apiref_meta::{ApiEntry, ModuleIndex, Parameter};
//! use apiref_renderer::{PageRenderer, PageTemplate, extract_signature_blocks};
//! use apiref_xref::CrossReferenceIndex;
//!
//! let mut index = ModuleIndex::new();
//! let entry = ApiEntry::synthesized(
//!     "CloneCacheView",
//!     "CacheView *",
//!     vec![Parameter::new("cache_view", "const CacheView *").with_description("the cache view.")],
//! )?
//! .with_description("CloneCacheView() makes an exact copy of the specified cache view.");
//! index.add_entry("cache-view", entry)?;
//! let xref = CrossReferenceIndex::build(&index)?;
//!
//! let template = PageTemplate::new("MagickCore, C API");
//! let page = PageRenderer::new(&template, &xref).render(index.module("cache-view").unwrap())?;
//! assert_eq!(
//!     extract_signature_blocks(&page.html),
//!     vec!["CacheView *CloneCacheView(const CacheView *cache_view)"]
//! );
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod html;
mod index_page;
mod page;
mod template;

pub use html::{escape_html, extract_signature_blocks, unescape_html};
pub use index_page::render_site_index;
pub use page::{PageRenderer, RenderedPage};
pub use template::{Layout, PageTemplate, RenderError};
