//! Site index page listing every module.

use std::collections::BTreeMap;
use std::fmt::Write;

use apiref_meta::{Module, ModuleIndex};

use crate::html::escape_html;
use crate::template::{PageShell, PageTemplate, RenderError};

/// Heading for modules without an API family label.
const UNGROUPED_HEADING: &str = "Modules";

/// Render the site index: modules grouped by API family, each group in module
/// id order. Modules without a family come last.
///
/// # Errors
///
/// Returns [`RenderError::Layout`] if the external layout fails.
pub fn render_site_index(template: &PageTemplate, index: &ModuleIndex) -> Result<String, RenderError> {
    let mut groups: BTreeMap<&str, Vec<&Module>> = BTreeMap::new();
    let mut ungrouped: Vec<&Module> = Vec::new();
    for module in index.modules() {
        match module.api() {
            Some(api) => groups.entry(api).or_default().push(module),
            None => ungrouped.push(module),
        }
    }

    let mut content = String::with_capacity(256 + index.len() * 96);
    let _ = writeln!(content, "<h1>{}</h1>", escape_html(template.site_title()));
    for (api, modules) in &groups {
        render_group(&mut content, template, api, modules);
    }
    if !ungrouped.is_empty() {
        render_group(&mut content, template, UNGROUPED_HEADING, &ungrouped);
    }

    let index_href = template.index_file_name();
    template.wrap(&PageShell {
        title: template.site_title(),
        site_title: template.site_title(),
        module: None,
        content: &content,
        index_href: &index_href,
    })
}

fn render_group(out: &mut String, template: &PageTemplate, heading: &str, modules: &[&Module]) {
    let _ = writeln!(out, "\n<h2>{}</h2>\n<ul>", escape_html(heading));
    for module in modules {
        let _ = writeln!(
            out,
            "<li><a href=\"{}\">{}</a> ({})</li>",
            escape_html(&template.file_name(module.id())),
            escape_html(module.title()),
            module.len()
        );
    }
    out.push_str("</ul>\n");
}

#[cfg(test)]
mod tests {
    use apiref_meta::ApiEntry;

    use super::*;

    fn entry(symbol: &str) -> ApiEntry {
        ApiEntry::new(symbol, format!("void {symbol}(void)")).unwrap()
    }

    #[test]
    fn test_index_groups_by_api() {
        let mut index = ModuleIndex::new();
        index.add_entry("draw", entry("DrawImage")).unwrap();
        index.add_entry("cache", entry("GetAuthenticPixels")).unwrap();
        index.add_entry("cache", entry("QueueAuthenticPixels")).unwrap();
        index.add_entry("magick-wand", entry("NewMagickWand")).unwrap();
        index.add_entry("notes", entry("Misc")).unwrap();
        index.declare_module("draw", Some("Drawing"), Some("MagickCore")).unwrap();
        index.declare_module("cache", Some("Pixel Cache"), Some("MagickCore")).unwrap();
        index.declare_module("magick-wand", None, Some("MagickWand")).unwrap();

        let html = render_site_index(&PageTemplate::new("ImageMagick"), &index).unwrap();

        let core = html.find("<h2>MagickCore</h2>").unwrap();
        let wand = html.find("<h2>MagickWand</h2>").unwrap();
        let other = html.find("<h2>Modules</h2>").unwrap();
        assert!(core < wand && wand < other);

        let cache = html.find("<li><a href=\"cache.html\">Pixel Cache</a> (2)</li>").unwrap();
        let draw = html.find("<li><a href=\"draw.html\">Drawing</a> (1)</li>").unwrap();
        assert!(core < cache && cache < draw && draw < wand);
        assert!(html.contains("<a href=\"magick-wand.html\">Magick Wand</a>"));
        assert!(!html.contains("<nav>"));
    }

    #[test]
    fn test_index_empty_site() {
        let html = render_site_index(&PageTemplate::new("Empty"), &ModuleIndex::new()).unwrap();
        assert!(html.contains("<h1>Empty</h1>"));
        assert!(!html.contains("<ul>"));
    }
}
