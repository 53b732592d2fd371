//! Module page rendering.
//!
//! A page is a pure function of the module's ordered entries, the
//! cross-reference table and the [`PageTemplate`]. The body follows the
//! layout of the classic `MagickCore` API pages:
//!
//! ```text
//! <h1>Cache Views</h1>
//! <p class="text-center"><a href="#A">A</a> &bull; <a href="#B">B</a></p>
//!
//! <h2><a href="#A" id="A">A</a></h2>
//! <p>description with links</p>
//! <p>The format of the A method is:</p>
//! <pre class="text">
//! verbatim signature
//! </pre>
//! <p>A description of each parameter follows:</p>
//! <dl class="dl-horizontal">
//! <dt>name</dt>
//! <dd>description</dd>
//! </dl>
//! ```

use std::fmt::Write;

use apiref_meta::{ApiEntry, Module, Warning, parse_signature};
use apiref_xref::{CrossReferenceIndex, Segment, XrefTarget, anchor_for};

use crate::html::{SIGNATURE_OPEN, escape_html};
use crate::template::{PageShell, PageTemplate, RenderError};

/// Output of rendering one module.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RenderedPage {
    pub module: String,
    pub title: String,
    pub file_name: String,
    pub html: String,
    /// Anchors defined on the page, in page order.
    pub anchors: Vec<String>,
    /// Every emitted symbol link, in page order.
    pub links: Vec<XrefTarget>,
    pub warnings: Vec<Warning>,
}

/// A row of the parameter description list.
struct ParameterRow<'a> {
    names: Vec<String>,
    description: Option<&'a str>,
}

/// Renders module pages against one template and symbol table.
#[derive(Clone, Copy)]
pub struct PageRenderer<'a> {
    template: &'a PageTemplate,
    xref: &'a CrossReferenceIndex,
}

impl<'a> PageRenderer<'a> {
    #[must_use]
    pub fn new(template: &'a PageTemplate, xref: &'a CrossReferenceIndex) -> Self {
        Self { template, xref }
    }

    /// Render a complete module page.
    ///
    /// Malformed entries are rendered anyway and reported in
    /// [`RenderedPage::warnings`].
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::Layout`] if the external layout fails.
    pub fn render(&self, module: &Module) -> Result<RenderedPage, RenderError> {
        let mut page = PageBody::new(module.id());
        page.render_module(self, module);

        let title = self.template.page_title(module.title());
        let index_href = self.template.index_file_name();
        let html = self.template.wrap(&PageShell {
            title: &title,
            site_title: self.template.site_title(),
            module: Some(module.id()),
            content: &page.html,
            index_href: &index_href,
        })?;

        tracing::debug!(
            module = module.id(),
            entries = module.len(),
            warnings = page.warnings.len(),
            "Rendered page"
        );
        Ok(RenderedPage {
            module: module.id().to_owned(),
            title,
            file_name: self.template.file_name(module.id()),
            html,
            anchors: page.anchors,
            links: page.links,
            warnings: page.warnings,
        })
    }

    /// Render the body fragment of a module page, without the document shell.
    #[must_use]
    pub fn render_body(&self, module: &Module) -> String {
        let mut page = PageBody::new(module.id());
        page.render_module(self, module);
        page.html
    }
}

/// Accumulates the body of one page.
struct PageBody<'m> {
    module: &'m str,
    html: String,
    anchors: Vec<String>,
    links: Vec<XrefTarget>,
    warnings: Vec<Warning>,
}

impl<'m> PageBody<'m> {
    fn new(module: &'m str) -> Self {
        Self {
            module,
            html: String::with_capacity(8192),
            anchors: Vec::new(),
            links: Vec::new(),
            warnings: Vec::new(),
        }
    }

    fn render_module(&mut self, renderer: &PageRenderer<'_>, module: &Module) {
        let _ = writeln!(self.html, "<h1>{}</h1>", escape_html(module.title()));

        let entries: Vec<&ApiEntry> = module.ordered_entries().collect();
        if !entries.is_empty() {
            self.html.push_str("<p class=\"text-center\">");
            for (i, entry) in entries.iter().enumerate() {
                if i > 0 {
                    self.html.push_str(renderer.template.separator());
                }
                let anchor = anchor_for(entry.symbol());
                let _ = write!(
                    self.html,
                    "<a href=\"#{}\">{}</a>",
                    escape_html(&anchor),
                    escape_html(entry.symbol())
                );
                self.links.push(XrefTarget {
                    module: self.module.to_owned(),
                    anchor,
                });
            }
            self.html.push_str("</p>\n");
        }

        for entry in entries {
            self.render_entry(renderer, entry);
        }
    }

    fn render_entry(&mut self, renderer: &PageRenderer<'_>, entry: &ApiEntry) {
        let template = renderer.template;
        let symbol = escape_html(entry.symbol());
        let anchor = anchor_for(entry.symbol());
        let href = template
            .source_link(self.module)
            .unwrap_or_else(|| format!("#{anchor}"));

        let _ = writeln!(
            self.html,
            "\n<h2><a href=\"{}\" id=\"{}\">{symbol}</a></h2>\n",
            escape_html(&href),
            escape_html(&anchor)
        );
        self.anchors.push(anchor);

        self.render_description(renderer, entry);

        let _ = writeln!(self.html, "<p>The format of the {symbol} method is:</p>\n");
        let _ = writeln!(
            self.html,
            "{SIGNATURE_OPEN}\n{}\n</pre>\n",
            escape_html(entry.signature())
        );

        let rows = self.parameter_rows(template, entry);
        if rows.is_empty() {
            return;
        }
        self.html
            .push_str("<p>A description of each parameter follows:</p>\n\n<dl class=\"dl-horizontal\">\n");
        for row in rows {
            let _ = writeln!(self.html, "<dt>{}</dt>", escape_html(&row.names.join(",")));
            match row.description {
                Some(description) => {
                    let _ = writeln!(self.html, "<dd>{}</dd>", escape_html(description));
                }
                None => {
                    let _ = writeln!(
                        self.html,
                        "<dd class=\"undocumented\">{}</dd>",
                        escape_html(template.placeholder())
                    );
                }
            }
        }
        self.html.push_str("</dl>\n");
    }

    fn render_description(&mut self, renderer: &PageRenderer<'_>, entry: &ApiEntry) {
        let paragraphs = split_paragraphs(entry.description());
        if paragraphs.is_empty() {
            self.malformed(entry, "description is missing".to_owned());
            return;
        }

        for paragraph in paragraphs {
            let resolved = renderer.xref.resolve_text(&paragraph, entry);
            self.html.push_str("<p>");
            for segment in resolved.segments {
                match segment {
                    Segment::Text(text) => self.html.push_str(&escape_html(&text)),
                    Segment::Link { text, target } => {
                        let href = target.href(self.module, renderer.template.extension());
                        let _ = write!(
                            self.html,
                            "<a href=\"{}\">{}</a>",
                            escape_html(&href),
                            escape_html(&text)
                        );
                        self.links.push(target);
                    }
                }
            }
            self.html.push_str("</p>\n\n");
            self.warnings.extend(resolved.warnings);
        }
    }

    /// Parameter list rows in declaration order, checked against the signature.
    fn parameter_rows<'e>(&mut self, template: &PageTemplate, entry: &'e ApiEntry) -> Vec<ParameterRow<'e>> {
        let declared = entry.parameter_names();
        let mut rows: Vec<ParameterRow<'e>> = entry
            .parameters()
            .iter()
            .map(|p| ParameterRow {
                names: vec![p.name().to_owned()],
                description: p.description(),
            })
            .collect();

        match parse_signature(entry.signature()) {
            Err(err) => self.malformed(entry, format!("signature does not parse: {err}")),
            Ok(parsed) => {
                if parsed.name != entry.symbol() {
                    self.malformed(entry, format!("signature names `{}`", parsed.name));
                }
                let in_signature = parsed.parameter_names();
                if declared.is_empty() {
                    // Only the signature knows the parameters; list them undocumented.
                    rows = parsed
                        .parameters
                        .iter()
                        .filter(|p| !p.name.is_empty() && p.name != "...")
                        .map(|p| ParameterRow {
                            names: vec![p.name.clone()],
                            description: None,
                        })
                        .collect();
                } else if in_signature != declared {
                    self.malformed(
                        entry,
                        format!(
                            "signature parameters ({}) differ from declared parameters ({})",
                            in_signature.join(", "),
                            declared.join(", ")
                        ),
                    );
                }
            }
        }

        for row in &rows {
            if row.description.is_none() {
                for name in &row.names {
                    self.malformed(entry, format!("parameter `{name}` is undocumented"));
                }
            }
        }

        if template.group_parameters() {
            group_rows(rows)
        } else {
            rows
        }
    }

    fn malformed(&mut self, entry: &ApiEntry, reason: String) {
        tracing::debug!(module = self.module, symbol = entry.symbol(), %reason, "Malformed entry");
        self.warnings.push(Warning::MalformedEntry {
            module: self.module.to_owned(),
            symbol: entry.symbol().to_owned(),
            reason,
        });
    }
}

/// Merge consecutive documented rows that share an identical description.
fn group_rows(rows: Vec<ParameterRow<'_>>) -> Vec<ParameterRow<'_>> {
    let mut grouped: Vec<ParameterRow<'_>> = Vec::with_capacity(rows.len());
    for row in rows {
        if let Some(last) = grouped.last_mut()
            && let (Some(prev), Some(current)) = (last.description, row.description)
            && prev == current
        {
            last.names.extend(row.names);
            continue;
        }
        grouped.push(row);
    }
    grouped
}

/// Split text into blank-line separated paragraphs, trimmed.
fn split_paragraphs(text: &str) -> Vec<String> {
    let mut paragraphs = Vec::new();
    let mut current: Vec<&str> = Vec::new();
    for line in text.lines() {
        if line.trim().is_empty() {
            if !current.is_empty() {
                paragraphs.push(current.join("\n"));
                current.clear();
            }
        } else {
            current.push(line.trim_end());
        }
    }
    if !current.is_empty() {
        paragraphs.push(current.join("\n"));
    }
    paragraphs
        .into_iter()
        .map(|p| p.trim().to_owned())
        .collect()
}

#[cfg(test)]
mod tests {
    use apiref_meta::{ModuleIndex, Parameter, tokenize};
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::html::extract_signature_blocks;

    static_assertions::assert_impl_all!(RenderedPage: Send, Sync);

    fn rectangle_entry() -> ApiEntry {
        let parameters = vec![
            Parameter::new("cache_view", "const CacheView *").with_description("the cache view."),
            Parameter::new("x", "const ssize_t").with_description(
                "These values define the perimeter of a region of pixels.",
            ),
            Parameter::new("y", "const ssize_t").with_description(
                "These values define the perimeter of a region of pixels.",
            ),
            Parameter::new("columns", "const size_t").with_description(
                "These values define the perimeter of a region of pixels.",
            ),
            Parameter::new("rows", "const size_t").with_description(
                "These values define the perimeter of a region of pixels.",
            ),
            Parameter::new("exception", "ExceptionInfo *")
                .with_description("return any errors or warnings in this structure."),
        ];
        ApiEntry::synthesized("GetCacheViewAuthenticPixels", "Quantum *", parameters)
            .unwrap()
            .with_description("GetCacheViewAuthenticPixels() gets pixels from the in-memory or disk pixel cache.")
    }

    fn fixture() -> (ModuleIndex, CrossReferenceIndex) {
        let mut index = ModuleIndex::new();
        index.add_entry("cache-view", rectangle_entry()).unwrap();
        index
            .add_entry(
                "cache-view",
                ApiEntry::synthesized(
                    "DestroyCacheView",
                    "CacheView *",
                    vec![Parameter::new("cache_view", "CacheView *").with_description("the cache view.")],
                )
                .unwrap()
                .with_description(
                    "DestroyCacheView() destroys the specified view.\n\n\
                     Use GetCacheViewAuthenticPixels() to read pixels, or DrawImage to draw.",
                ),
            )
            .unwrap();
        index
            .add_entry(
                "draw",
                ApiEntry::new(
                    "DrawImage",
                    "MagickBooleanType DrawImage(Image *image,const DrawInfo *draw_info,\n  ExceptionInfo *exception)",
                )
                .unwrap()
                .with_parameters(vec![
                    Parameter::new("image", "Image *").with_description("the image."),
                    Parameter::new("draw_info", "const DrawInfo *").with_description("the draw info."),
                    Parameter::new("exception", "ExceptionInfo *")
                        .with_description("return any errors or warnings in this structure."),
                ])
                .with_description("DrawImage() draws a graphic primitive on your image."),
            )
            .unwrap();
        let xref = CrossReferenceIndex::build(&index).unwrap();
        (index, xref)
    }

    fn render(index: &ModuleIndex, xref: &CrossReferenceIndex, template: &PageTemplate, module: &str) -> RenderedPage {
        PageRenderer::new(template, xref)
            .render(index.module(module).unwrap())
            .unwrap()
    }

    #[test]
    fn test_index_line_alphabetical() {
        let (index, xref) = fixture();
        let page = render(&index, &xref, &PageTemplate::default(), "cache-view");
        assert!(page.html.contains(
            "<p class=\"text-center\"><a href=\"#DestroyCacheView\">DestroyCacheView</a> &bull; \
             <a href=\"#GetCacheViewAuthenticPixels\">GetCacheViewAuthenticPixels</a></p>"
        ));
        assert_eq!(page.anchors, vec!["DestroyCacheView", "GetCacheViewAuthenticPixels"]);
        assert_eq!(page.file_name, "cache-view.html");
        assert_eq!(page.title, "API Reference: Cache View");
    }

    #[test]
    fn test_heading_uses_source_link() {
        let (index, xref) = fixture();
        let template =
            PageTemplate::new("MagickCore").with_source_url("https://imagemagick.org/api/MagickCore/{module}_8c.html");
        let page = render(&index, &xref, &template, "draw");
        assert!(page.html.contains(
            "<h2><a href=\"https://imagemagick.org/api/MagickCore/draw_8c.html\" id=\"DrawImage\">DrawImage</a></h2>"
        ));
    }

    #[test]
    fn test_heading_defaults_to_permalink() {
        let (index, xref) = fixture();
        let page = render(&index, &xref, &PageTemplate::default(), "draw");
        assert!(page.html.contains("<h2><a href=\"#DrawImage\" id=\"DrawImage\">DrawImage</a></h2>"));
        assert!(page.html.contains("<p>The format of the DrawImage method is:</p>"));
    }

    #[test]
    fn test_description_links_across_modules() {
        let (index, xref) = fixture();
        let page = render(&index, &xref, &PageTemplate::default(), "cache-view");

        assert!(page.html.contains("<p>DestroyCacheView() destroys the specified view.</p>"));
        assert!(page.html.contains(
            "<p>Use <a href=\"#GetCacheViewAuthenticPixels\">GetCacheViewAuthenticPixels()</a> to read pixels, \
             or <a href=\"draw.html#DrawImage\">DrawImage</a> to draw.</p>"
        ));
        assert!(page.links.contains(&XrefTarget {
            module: "draw".to_owned(),
            anchor: "DrawImage".to_owned(),
        }));
    }

    #[test]
    fn test_signature_round_trip() {
        let (index, xref) = fixture();
        for module in index.modules() {
            let page = render(&index, &xref, &PageTemplate::default(), module.id());
            let blocks = extract_signature_blocks(&page.html);
            let entries: Vec<_> = module.ordered_entries().collect();
            assert_eq!(blocks.len(), entries.len());

            for (block, entry) in blocks.iter().zip(entries) {
                assert_eq!(block, entry.signature());
                assert_eq!(tokenize(block), tokenize(entry.signature()));
                let parsed = parse_signature(block).unwrap();
                assert_eq!(parsed.parameter_names(), entry.parameter_names());
            }
        }
    }

    #[test]
    fn test_parameter_order_preserved() {
        let (index, xref) = fixture();
        let template = PageTemplate::default().with_group_parameters(false);
        let page = render(&index, &xref, &template, "cache-view");

        let section = &page.html[page.html.find("id=\"GetCacheViewAuthenticPixels\"").unwrap()..];
        let terms: Vec<_> = section
            .match_indices("<dt>")
            .map(|(i, _)| {
                let rest = &section[i + 4..];
                &rest[..rest.find("</dt>").unwrap()]
            })
            .collect();
        assert_eq!(terms, vec!["cache_view", "x", "y", "columns", "rows", "exception"]);
    }

    #[test]
    fn test_parameters_grouped_by_description() {
        let (index, xref) = fixture();
        let page = render(&index, &xref, &PageTemplate::default(), "cache-view");
        assert!(page.html.contains(
            "<dt>x,y,columns,rows</dt>\n<dd>These values define the perimeter of a region of pixels.</dd>"
        ));
        assert!(page.warnings.is_empty(), "{:?}", page.warnings);
    }

    #[test]
    fn test_missing_parameter_description_uses_placeholder() {
        let mut index = ModuleIndex::new();
        let entry = ApiEntry::synthesized(
            "SetImageChannelMask",
            "ChannelType",
            vec![
                Parameter::new("image", "Image *").with_description("the image."),
                Parameter::new("channel", "const ChannelType"),
            ],
        )
        .unwrap()
        .with_description("SetImageChannelMask() sets the image channel mask.");
        index.add_entry("image", entry).unwrap();
        let xref = CrossReferenceIndex::build(&index).unwrap();

        let template = PageTemplate::default().with_placeholder("not documented");
        let page = render(&index, &xref, &template, "image");

        assert!(page.html.contains("<dt>channel</dt>\n<dd class=\"undocumented\">not documented</dd>"));
        assert_eq!(
            page.warnings,
            vec![Warning::MalformedEntry {
                module: "image".to_owned(),
                symbol: "SetImageChannelMask".to_owned(),
                reason: "parameter `channel` is undocumented".to_owned(),
            }]
        );
    }

    #[test]
    fn test_malformed_signature_still_rendered() {
        let mut index = ModuleIndex::new();
        let entry = ApiEntry::new("IsBlobExempt", "MagickBooleaNType IsBlobExempt(const Image *image")
            .unwrap()
            .with_parameter(Parameter::new("image", "const Image *").with_description("the image."))
            .with_description("IsBlobExempt() returns true if the blob is exempt.");
        index.add_entry("blob", entry).unwrap();
        let xref = CrossReferenceIndex::build(&index).unwrap();

        let page = render(&index, &xref, &PageTemplate::default(), "blob");
        assert!(page.html.contains("MagickBooleaNType IsBlobExempt(const Image *image\n</pre>"));
        assert!(page.html.contains("<dt>image</dt>"));
        assert!(matches!(
            &page.warnings[..],
            [Warning::MalformedEntry { reason, .. }] if reason.starts_with("signature does not parse")
        ));
    }

    #[test]
    fn test_signature_parameter_mismatch_reported() {
        let mut index = ModuleIndex::new();
        let entry = ApiEntry::new("FlipImage", "Image *FlipImage(const Image *image,ExceptionInfo *exception)")
            .unwrap()
            .with_parameter(Parameter::new("image", "const Image *").with_description("the image."))
            .with_description("FlipImage() creates a vertical mirror image.");
        index.add_entry("transform", entry).unwrap();
        let xref = CrossReferenceIndex::build(&index).unwrap();

        let page = render(&index, &xref, &PageTemplate::default(), "transform");
        assert_eq!(page.warnings.len(), 1);
        assert_eq!(
            page.warnings[0].to_string(),
            "transform/FlipImage: signature parameters (image, exception) differ from declared parameters (image)"
        );
    }

    #[test]
    fn test_undeclared_parameters_listed_from_signature() {
        let mut index = ModuleIndex::new();
        let entry = ApiEntry::new("NegateImage", "MagickBooleanType NegateImage(Image *image,\n  const MagickBooleanType grayscale)")
            .unwrap()
            .with_description("NegateImage() negates the colors in the reference image.");
        index.add_entry("enhance", entry).unwrap();
        let xref = CrossReferenceIndex::build(&index).unwrap();

        let page = render(&index, &xref, &PageTemplate::default(), "enhance");
        assert!(page.html.contains("<dt>image</dt>\n<dd class=\"undocumented\">undocumented</dd>"));
        assert!(page.html.contains("<dt>grayscale</dt>"));
        assert_eq!(page.warnings.len(), 2);
    }

    #[test]
    fn test_no_parameters_omits_list() {
        let mut index = ModuleIndex::new();
        let entry = ApiEntry::synthesized("GetMagickVersion", "const char *", Vec::new())
            .unwrap()
            .with_description("GetMagickVersion() returns the library version.");
        index.add_entry("version", entry).unwrap();
        let xref = CrossReferenceIndex::build(&index).unwrap();

        let page = render(&index, &xref, &PageTemplate::default(), "version");
        assert!(page.html.contains("const char *GetMagickVersion(void)"));
        assert!(!page.html.contains("<dl"));
        assert!(page.warnings.is_empty());
    }

    #[test]
    fn test_signature_is_escaped() {
        let mut index = ModuleIndex::new();
        let entry = ApiEntry::new(
            "SetImageProgressMonitor",
            "MagickProgressMonitor SetImageProgressMonitor(Image *image,\n  const MagickProgressMonitor progress_monitor,void *client_data)",
        )
        .unwrap()
        .with_description("Sets the progress monitor. Returns <previous> monitor & data.");
        index.add_entry("monitor", entry).unwrap();
        let xref = CrossReferenceIndex::build(&index).unwrap();

        let body = PageRenderer::new(&PageTemplate::default(), &xref).render_body(index.module("monitor").unwrap());
        assert!(body.contains("<p>Sets the progress monitor. Returns &lt;previous&gt; monitor &amp; data.</p>"));
        assert!(!body.contains("<!DOCTYPE"));
    }

    #[test]
    fn test_split_paragraphs() {
        assert_eq!(
            split_paragraphs("  first line\nsecond line\n\n \n third  \n"),
            vec!["first line\nsecond line", "third"]
        );
        assert!(split_paragraphs(" \n ").is_empty());
    }
}
