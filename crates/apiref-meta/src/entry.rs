//! API entry value objects.
//!
//! [`ApiEntry`] is one documented function: symbol, return type, parameters in
//! declaration order, free-text description and the verbatim signature block.
//! Entries are built once during loading and never mutated afterwards.

/// Column after which synthesized signatures wrap to a continuation line.
const WRAP_COLUMN: usize = 72;

/// Indentation of continuation lines in synthesized signatures.
const CONTINUATION_INDENT: &str = "  ";

/// Error returned when an entry fails validation.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum EntryError {
    /// Symbol name is empty or whitespace.
    #[error("Entry symbol name cannot be empty")]
    EmptySymbol,
    /// Signature text is empty or whitespace.
    #[error("Entry `{0}` has an empty signature")]
    EmptySignature(String),
}

/// A single declared parameter.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Parameter {
    name: String,
    ty: String,
    description: Option<String>,
}

impl Parameter {
    /// Create an undocumented parameter.
    #[must_use]
    pub fn new(name: impl Into<String>, ty: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ty: ty.into().trim().to_owned(),
            description: None,
        }
    }

    /// Attach a description. Blank descriptions are treated as missing.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        let description = description.into();
        self.description = (!description.trim().is_empty()).then_some(description);
        self
    }

    /// Parameter name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Parameter type as declared (e.g. `const Image *`).
    #[must_use]
    pub fn ty(&self) -> &str {
        &self.ty
    }

    /// Parameter description, `None` if undocumented.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Whether the parameter carries a description.
    #[must_use]
    pub fn is_documented(&self) -> bool {
        self.description.is_some()
    }

    /// Prototype text for this parameter, keeping pointer stars on the name.
    ///
    /// ```
    /// use apiref_meta::Parameter;
    ///
    /// assert_eq!(Parameter::new("image", "const Image *").declaration(), "const Image *image");
    /// assert_eq!(Parameter::new("x", "ssize_t").declaration(), "ssize_t x");
    /// ```
    #[must_use]
    pub fn declaration(&self) -> String {
        if self.ty.is_empty() {
            return self.name.clone();
        }
        let base = self.ty.trim_end_matches(['*', ' ']);
        let stars = self.ty[base.len()..].matches('*').count();
        if stars == 0 {
            format!("{} {}", self.ty, self.name)
        } else {
            format!("{base} {}{}", "*".repeat(stars), self.name)
        }
    }
}

/// A documented API function.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ApiEntry {
    symbol: String,
    return_type: String,
    parameters: Vec<Parameter>,
    description: String,
    module: String,
    signature: String,
}

impl ApiEntry {
    /// Create an entry from its symbol name and verbatim signature text.
    ///
    /// Interior whitespace of the signature is preserved exactly; only leading
    /// blank lines and trailing whitespace are dropped.
    ///
    /// # Errors
    ///
    /// Returns [`EntryError`] if the symbol or signature is blank.
    pub fn new(symbol: impl Into<String>, signature: impl Into<String>) -> Result<Self, EntryError> {
        let symbol = symbol.into().trim().to_owned();
        if symbol.is_empty() {
            return Err(EntryError::EmptySymbol);
        }
        let signature = signature.into();
        let signature = signature.trim_end().trim_start_matches(['\n', '\r']);
        if signature.trim().is_empty() {
            return Err(EntryError::EmptySignature(symbol));
        }

        Ok(Self {
            symbol,
            return_type: String::new(),
            parameters: Vec::new(),
            description: String::new(),
            module: String::new(),
            signature: signature.to_owned(),
        })
    }

    /// Create an entry whose signature is synthesized from its parts.
    ///
    /// # Errors
    ///
    /// Returns [`EntryError::EmptySymbol`] if the symbol is blank.
    pub fn synthesized(
        symbol: impl Into<String>,
        return_type: impl Into<String>,
        parameters: Vec<Parameter>,
    ) -> Result<Self, EntryError> {
        let symbol = symbol.into();
        let return_type = return_type.into();
        if symbol.trim().is_empty() {
            return Err(EntryError::EmptySymbol);
        }
        let signature = synthesize_signature(&return_type, symbol.trim(), &parameters);
        Ok(Self::new(symbol, signature)?
            .with_return_type(return_type)
            .with_parameters(parameters))
    }

    /// Set the return type.
    #[must_use]
    pub fn with_return_type(mut self, return_type: impl Into<String>) -> Self {
        self.return_type = return_type.into().trim().to_owned();
        self
    }

    /// Append a parameter (declaration order is the call order).
    #[must_use]
    pub fn with_parameter(mut self, parameter: Parameter) -> Self {
        self.parameters.push(parameter);
        self
    }

    /// Replace the parameter list.
    #[must_use]
    pub fn with_parameters(mut self, parameters: Vec<Parameter>) -> Self {
        self.parameters = parameters;
        self
    }

    /// Set the free-text description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Set the owning module identifier.
    #[must_use]
    pub fn with_module(mut self, module: impl Into<String>) -> Self {
        self.module = module.into();
        self
    }

    #[must_use]
    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    #[must_use]
    pub fn return_type(&self) -> &str {
        &self.return_type
    }

    #[must_use]
    pub fn parameters(&self) -> &[Parameter] {
        &self.parameters
    }

    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    #[must_use]
    pub fn module(&self) -> &str {
        &self.module
    }

    /// Verbatim signature block.
    #[must_use]
    pub fn signature(&self) -> &str {
        &self.signature
    }

    /// Parameter names in declaration order.
    #[must_use]
    pub fn parameter_names(&self) -> Vec<&str> {
        self.parameters.iter().map(Parameter::name).collect()
    }
}

/// Build a prototype in the `Type Name(type a,\n  type b)` layout.
///
/// Parameters are joined with `, ` and a new continuation line is started
/// whenever the next parameter would run past column 72.
///
/// ```
/// use apiref_meta::{Parameter, synthesize_signature};
///
/// let params = [Parameter::new("cache_view", "const CacheView *")];
/// assert_eq!(
///     synthesize_signature("CacheView *", "CloneCacheView", &params),
///     "CacheView *CloneCacheView(const CacheView *cache_view)"
/// );
/// ```
#[must_use]
pub fn synthesize_signature(return_type: &str, symbol: &str, parameters: &[Parameter]) -> String {
    let return_type = return_type.trim();
    let mut out = if return_type.is_empty() {
        symbol.to_owned()
    } else if return_type.ends_with('*') {
        format!("{return_type}{symbol}")
    } else {
        format!("{return_type} {symbol}")
    };
    out.push('(');

    if parameters.is_empty() {
        out.push_str("void)");
        return out;
    }

    let mut line_len = out.len();
    let last = parameters.len() - 1;
    for (i, parameter) in parameters.iter().enumerate() {
        let mut piece = parameter.declaration();
        piece.push(if i == last { ')' } else { ',' });

        if i > 0 {
            if line_len + 1 + piece.len() > WRAP_COLUMN {
                out.push('\n');
                out.push_str(CONTINUATION_INDENT);
                line_len = CONTINUATION_INDENT.len();
            } else {
                out.push(' ');
                line_len += 1;
            }
        }
        out.push_str(&piece);
        line_len += piece.len();
    }

    out
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_new_rejects_empty_symbol() {
        assert_eq!(ApiEntry::new("  ", "void f(void)"), Err(EntryError::EmptySymbol));
    }

    #[test]
    fn test_new_rejects_empty_signature() {
        assert_eq!(
            ApiEntry::new("DestroyCacheView", "\n  \n"),
            Err(EntryError::EmptySignature("DestroyCacheView".to_owned()))
        );
    }

    #[test]
    fn test_new_preserves_interior_whitespace() {
        let signature = "\nCacheView *AcquireAuthenticCacheView(const Image *image,\n  ExceptionInfo *exception)\n";
        let entry = ApiEntry::new("AcquireAuthenticCacheView", signature).unwrap();
        assert_eq!(
            entry.signature(),
            "CacheView *AcquireAuthenticCacheView(const Image *image,\n  ExceptionInfo *exception)"
        );
    }

    #[test]
    fn test_parameter_order_is_declaration_order() {
        let entry = ApiEntry::new("GetOneCacheViewVirtualMethodPixel", "x")
            .unwrap()
            .with_parameter(Parameter::new("cache_view", "const CacheView *"))
            .with_parameter(Parameter::new("virtual_pixel_method", "const VirtualPixelMethod"))
            .with_parameter(Parameter::new("x", "const ssize_t"))
            .with_parameter(Parameter::new("y", "const ssize_t"))
            .with_parameter(Parameter::new("pixel", "Quantum *"))
            .with_parameter(Parameter::new("exception", "ExceptionInfo *"));
        assert_eq!(
            entry.parameter_names(),
            vec!["cache_view", "virtual_pixel_method", "x", "y", "pixel", "exception"]
        );
    }

    #[test]
    fn test_blank_parameter_description_is_undocumented() {
        let parameter = Parameter::new("channel", "const ChannelType").with_description("   ");
        assert!(!parameter.is_documented());
        assert_eq!(parameter.description(), None);
    }

    #[test]
    fn test_declaration_double_pointer() {
        assert_eq!(Parameter::new("argv", "char **").declaration(), "char **argv");
    }

    #[test]
    fn test_declaration_spaced_pointer_levels() {
        assert_eq!(Parameter::new("argv", "char * *").declaration(), "char **argv");
        assert_eq!(Parameter::new("image", "Image * ").declaration(), "Image *image");
        assert_eq!(
            synthesize_signature("void", "F", &[Parameter::new("argv", "char * *")]),
            "void F(char **argv)"
        );
    }

    #[test]
    fn test_declaration_without_type() {
        assert_eq!(Parameter::new("wand", "").declaration(), "wand");
    }

    #[test]
    fn test_synthesize_wraps_like_corpus() {
        let params = vec![
            Parameter::new("image", "const Image *"),
            Parameter::new("exception", "ExceptionInfo *"),
        ];
        assert_eq!(
            synthesize_signature("CacheView *", "AcquireAuthenticCacheView", &params),
            "CacheView *AcquireAuthenticCacheView(const Image *image,\n  ExceptionInfo *exception)"
        );
    }

    #[test]
    fn test_synthesize_short_stays_on_one_line() {
        let params = vec![Parameter::new("x", "int"), Parameter::new("y", "int")];
        assert_eq!(synthesize_signature("void", "Move", &params), "void Move(int x, int y)");
    }

    #[test]
    fn test_synthesize_no_parameters() {
        assert_eq!(
            synthesize_signature("const char *", "GetMagickVersion", &[]),
            "const char *GetMagickVersion(void)"
        );
    }

    #[test]
    fn test_synthesized_entry_keeps_parts() {
        let entry = ApiEntry::synthesized(
            "DestroyCacheView",
            "CacheView *",
            vec![Parameter::new("cache_view", "CacheView *")],
        )
        .unwrap();
        assert_eq!(entry.return_type(), "CacheView *");
        assert_eq!(entry.signature(), "CacheView *DestroyCacheView(CacheView *cache_view)");
        assert_eq!(entry.parameter_names(), vec!["cache_view"]);
    }
}
