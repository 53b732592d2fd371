//! Tokenizer and parser for C prototype signature blocks.
//!
//! Signature text is kept verbatim for display; this module only reads it
//! back into tokens and parameter names so rendered blocks can be checked
//! against the declared parameter list.

use std::fmt;

/// Lexical token of a signature block. Whitespace is not a token.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Token {
    /// Identifier or keyword (`const`, `Image`, `exception`).
    Ident(String),
    /// Numeric literal (array sizes).
    Number(String),
    /// Single punctuation character (`*`, `(`, `,`).
    Punct(char),
    /// Variadic marker `...`.
    Ellipsis,
}

impl Token {
    fn is_word(&self) -> bool {
        matches!(self, Self::Ident(_) | Self::Number(_))
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ident(s) | Self::Number(s) => f.write_str(s),
            Self::Punct(c) => write!(f, "{c}"),
            Self::Ellipsis => f.write_str("..."),
        }
    }
}

/// Error returned when a signature cannot be parsed.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum SignatureError {
    /// No `(` found.
    #[error("signature has no parameter list")]
    MissingParameterList,
    /// The token before `(` is not an identifier.
    #[error("signature has no function name before `(`")]
    MissingName,
    /// Parentheses or brackets do not balance.
    #[error("unbalanced parentheses in signature")]
    Unbalanced,
    /// Two commas with nothing between them, or a trailing comma.
    #[error("empty parameter at position {0}")]
    EmptyParameter(usize),
}

/// A parameter read back from a signature.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParsedParameter {
    /// Type text with normalized spacing (e.g. `const Image *`).
    pub ty: String,
    /// Parameter name; empty for unnamed parameters.
    pub name: String,
}

/// Result of parsing a signature block.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParsedSignature {
    pub return_type: String,
    pub name: String,
    pub parameters: Vec<ParsedParameter>,
}

impl ParsedSignature {
    /// Parameter names in declaration order.
    #[must_use]
    pub fn parameter_names(&self) -> Vec<&str> {
        self.parameters.iter().map(|p| p.name.as_str()).collect()
    }
}

/// Split signature text into tokens.
///
/// ```
/// use apiref_meta::{Token, tokenize};
///
/// let tokens = tokenize("void f(int x)");
/// assert_eq!(tokens.len(), 6);
/// assert_eq!(tokens[2], Token::Punct('('));
/// ```
#[must_use]
pub fn tokenize(text: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut chars = text.char_indices().peekable();

    while let Some((start, c)) = chars.next() {
        if c.is_whitespace() {
            continue;
        }
        if c.is_alphabetic() || c == '_' {
            let mut end = start + c.len_utf8();
            while let Some(&(i, next)) = chars.peek() {
                if next.is_alphanumeric() || next == '_' {
                    end = i + next.len_utf8();
                    chars.next();
                } else {
                    break;
                }
            }
            tokens.push(Token::Ident(text[start..end].to_owned()));
        } else if c.is_ascii_digit() {
            let mut end = start + 1;
            while let Some(&(i, next)) = chars.peek() {
                if next.is_ascii_alphanumeric() {
                    end = i + 1;
                    chars.next();
                } else {
                    break;
                }
            }
            tokens.push(Token::Number(text[start..end].to_owned()));
        } else if c == '.' && text[start..].starts_with("...") {
            chars.next();
            chars.next();
            tokens.push(Token::Ellipsis);
        } else {
            tokens.push(Token::Punct(c));
        }
    }

    tokens
}

/// Parse a C prototype into return type, name and parameters.
///
/// Tolerates unknown or misspelled type names; only the structure
/// (name, balanced parentheses, comma-separated parameters) is checked.
///
/// # Errors
///
/// Returns [`SignatureError`] if the structure cannot be recognized.
pub fn parse_signature(text: &str) -> Result<ParsedSignature, SignatureError> {
    let tokens = tokenize(text);

    let open = tokens
        .iter()
        .position(|t| *t == Token::Punct('('))
        .ok_or(SignatureError::MissingParameterList)?;
    let name = match open.checked_sub(1).map(|i| &tokens[i]) {
        Some(Token::Ident(name)) => name.clone(),
        _ => return Err(SignatureError::MissingName),
    };
    let return_type = join_tokens(&tokens[..open - 1]);

    let close = matching_close(&tokens, open).ok_or(SignatureError::Unbalanced)?;
    let inner = &tokens[open + 1..close];

    let groups = split_top_level(inner)?;
    let mut parameters = Vec::with_capacity(groups.len());
    for (position, group) in groups.iter().enumerate() {
        if group.is_empty() {
            if groups.len() == 1 {
                break;
            }
            return Err(SignatureError::EmptyParameter(position));
        }
        if groups.len() == 1 && matches!(group.as_slice(), [Token::Ident(v)] if v == "void") {
            break;
        }
        parameters.push(parse_parameter(group));
    }

    Ok(ParsedSignature {
        return_type,
        name,
        parameters,
    })
}

/// Index of the `)` matching the `(` at `open`.
fn matching_close(tokens: &[Token], open: usize) -> Option<usize> {
    let mut depth = 0usize;
    for (i, token) in tokens.iter().enumerate().skip(open) {
        match token {
            Token::Punct('(') => depth += 1,
            Token::Punct(')') => {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }
    None
}

/// Split on commas that are not nested in `()` or `[]`.
fn split_top_level(tokens: &[Token]) -> Result<Vec<Vec<Token>>, SignatureError> {
    let mut groups = vec![Vec::new()];
    let mut depth = 0i32;
    for token in tokens {
        match token {
            Token::Punct('(' | '[') => depth += 1,
            Token::Punct(')' | ']') => {
                depth -= 1;
                if depth < 0 {
                    return Err(SignatureError::Unbalanced);
                }
            }
            Token::Punct(',') if depth == 0 => {
                groups.push(Vec::new());
                continue;
            }
            _ => {}
        }
        if let Some(group) = groups.last_mut() {
            group.push(token.clone());
        }
    }
    if depth != 0 {
        return Err(SignatureError::Unbalanced);
    }
    Ok(groups)
}

fn parse_parameter(group: &[Token]) -> ParsedParameter {
    if matches!(group, [Token::Ellipsis]) {
        return ParsedParameter {
            ty: String::new(),
            name: "...".to_owned(),
        };
    }

    // Function pointer: `Type (*name)(args)`.
    if let Some(open) = group.iter().position(|t| *t == Token::Punct('('))
        && open > 0
    {
        let inner_end = matching_close(group, open).unwrap_or(group.len());
        let name_pos = group[open..inner_end]
            .iter()
            .rposition(|t| matches!(t, Token::Ident(_)))
            .map(|i| open + i);
        if let Some(pos) = name_pos {
            let mut ty = group.to_vec();
            let name = ty.remove(pos).to_string();
            return ParsedParameter {
                ty: join_tokens(&ty),
                name,
            };
        }
    }

    // Drop trailing array suffixes like `[]` or `[4]`.
    let mut end = group.len();
    while end > 0 && group[end - 1] == Token::Punct(']') {
        match group[..end].iter().rposition(|t| *t == Token::Punct('[')) {
            Some(open) => end = open,
            None => break,
        }
    }

    match group[..end].last() {
        Some(Token::Ident(name)) if end > 1 || group.len() == 1 => {
            let mut ty = group[..end - 1].to_vec();
            ty.extend_from_slice(&group[end..]);
            ParsedParameter {
                ty: join_tokens(&ty),
                name: name.clone(),
            }
        }
        _ => ParsedParameter {
            ty: join_tokens(group),
            name: String::new(),
        },
    }
}

/// Render tokens as type text: words separated by spaces, `*` attached to
/// what follows.
fn join_tokens(tokens: &[Token]) -> String {
    let mut out = String::new();
    let mut prev: Option<&Token> = None;
    for token in tokens {
        let needs_space = match (prev, token) {
            (None, _) => false,
            (Some(p), t) if p.is_word() && t.is_word() => true,
            (Some(p), Token::Punct('*' | '(')) => p.is_word(),
            (Some(Token::Punct(')')), t) => t.is_word(),
            _ => false,
        };
        if needs_space {
            out.push(' ');
        }
        out.push_str(&token.to_string());
        prev = Some(token);
    }
    out
}
