//! Presentation template shared by every page of a run.

use std::fmt::Write;

use apiref_meta::RESERVED_MODULE_ID;
use minijinja::value::Value;
use minijinja::{AutoEscape, Environment, context};

use crate::html::escape_html;

/// Error returned when a page cannot be rendered.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    /// The external layout failed to parse or render.
    #[error("Layout error: {0}")]
    Layout(String),
}

impl From<minijinja::Error> for RenderError {
    fn from(err: minijinja::Error) -> Self {
        Self::Layout(err.to_string())
    }
}

/// External page chrome, a `minijinja` template.
///
/// The template receives `title`, `site_title`, `module`, `content` and
/// `index_href`. Values are HTML-escaped on output, except `content` which is
/// already HTML.
#[derive(Clone, Debug)]
pub struct Layout {
    source: String,
}

impl Layout {
    /// Parse a layout template.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::Layout`] on template syntax errors.
    pub fn new(source: impl Into<String>) -> Result<Self, RenderError> {
        let source = source.into();
        {
            let env = Environment::new();
            env.template_from_str(&source)?;
        }
        Ok(Self { source })
    }

    pub(crate) fn render(&self, page: &PageShell<'_>) -> Result<String, RenderError> {
        let mut env = Environment::new();
        env.set_auto_escape_callback(|_| AutoEscape::Html);
        let html = env.render_str(
            &self.source,
            context! {
                title => page.title,
                site_title => page.site_title,
                module => page.module,
                content => Value::from_safe_string(page.content.to_owned()),
                index_href => page.index_href,
            },
        )?;
        Ok(html)
    }
}

/// Everything the document shell needs to wrap a page body.
pub(crate) struct PageShell<'a> {
    pub title: &'a str,
    pub site_title: &'a str,
    pub module: Option<&'a str>,
    pub content: &'a str,
    pub index_href: &'a str,
}

/// Immutable presentation settings, passed explicitly to the renderer.
///
/// # Example
///
/// ```
/// use apiref_renderer::PageTemplate;
///
/// let template = PageTemplate::new("MagickCore, C API")
///     .with_extension("php")
///     .with_source_url("https://imagemagick.org/api/MagickCore/{module}_8c.html");
/// assert_eq!(template.file_name("cache-view"), "cache-view.php");
/// assert_eq!(
///     template.source_link("draw").as_deref(),
///     Some("https://imagemagick.org/api/MagickCore/draw_8c.html")
/// );
/// ```
#[derive(Clone, Debug)]
pub struct PageTemplate {
    site_title: String,
    extension: String,
    separator: String,
    source_url: Option<String>,
    placeholder: String,
    group_parameters: bool,
    layout: Option<Layout>,
}

impl Default for PageTemplate {
    fn default() -> Self {
        Self::new("API Reference")
    }
}

impl PageTemplate {
    /// Template with default settings and the given site title.
    #[must_use]
    pub fn new(site_title: impl Into<String>) -> Self {
        Self {
            site_title: site_title.into(),
            extension: "html".to_owned(),
            separator: " &bull; ".to_owned(),
            source_url: None,
            placeholder: "undocumented".to_owned(),
            group_parameters: true,
            layout: None,
        }
    }

    /// Page file extension, without the dot.
    #[must_use]
    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = extension.into().trim_start_matches('.').to_owned();
        self
    }

    /// Raw HTML placed between symbols of the index line.
    #[must_use]
    pub fn with_separator(mut self, separator: impl Into<String>) -> Self {
        self.separator = separator.into();
        self
    }

    /// Link target of entry headings; `{module}` is replaced by the module id.
    #[must_use]
    pub fn with_source_url(mut self, pattern: impl Into<String>) -> Self {
        self.source_url = Some(pattern.into());
        self
    }

    /// Text shown for undocumented parameters.
    #[must_use]
    pub fn with_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = placeholder.into();
        self
    }

    /// Merge consecutive parameters sharing one description into a single term.
    #[must_use]
    pub fn with_group_parameters(mut self, group: bool) -> Self {
        self.group_parameters = group;
        self
    }

    #[must_use]
    pub fn with_layout(mut self, layout: Layout) -> Self {
        self.layout = Some(layout);
        self
    }

    #[must_use]
    pub fn site_title(&self) -> &str {
        &self.site_title
    }

    #[must_use]
    pub fn extension(&self) -> &str {
        &self.extension
    }

    #[must_use]
    pub fn separator(&self) -> &str {
        &self.separator
    }

    #[must_use]
    pub fn placeholder(&self) -> &str {
        &self.placeholder
    }

    #[must_use]
    pub fn group_parameters(&self) -> bool {
        self.group_parameters
    }

    #[must_use]
    pub fn layout(&self) -> Option<&Layout> {
        self.layout.as_ref()
    }

    /// Output file name of a module page.
    #[must_use]
    pub fn file_name(&self, module_id: &str) -> String {
        format!("{module_id}.{}", self.extension)
    }

    /// Output file name of the site index page.
    #[must_use]
    pub fn index_file_name(&self) -> String {
        self.file_name(RESERVED_MODULE_ID)
    }

    /// Source link of a module, if a pattern is configured.
    #[must_use]
    pub fn source_link(&self, module_id: &str) -> Option<String> {
        self.source_url
            .as_ref()
            .map(|pattern| pattern.replace("{module}", module_id))
    }

    /// Page title, e.g. `MagickCore, C API: Cache Views`.
    #[must_use]
    pub fn page_title(&self, heading: &str) -> String {
        if self.site_title.is_empty() {
            heading.to_owned()
        } else {
            format!("{}: {heading}", self.site_title)
        }
    }

    /// Wrap a page body in the layout or the built-in document shell.
    pub(crate) fn wrap(&self, page: &PageShell<'_>) -> Result<String, RenderError> {
        if let Some(layout) = &self.layout {
            return layout.render(page);
        }

        let mut html = String::with_capacity(page.content.len() + 512);
        html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
        html.push_str("<meta charset=\"utf-8\">\n");
        html.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n");
        let _ = writeln!(html, "<title>{}</title>", escape_html(page.title));
        html.push_str("</head>\n<body>\n");
        if page.module.is_some() {
            let _ = writeln!(
                html,
                "<nav><a href=\"{}\">{}</a></nav>",
                escape_html(page.index_href),
                escape_html(page.site_title)
            );
        }
        html.push_str("<main class=\"container\">\n");
        html.push_str(page.content);
        html.push_str("</main>\n</body>\n</html>\n");
        Ok(html)
    }
}
