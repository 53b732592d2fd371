//! HTML escaping and signature block extraction.

/// Opening tag of a signature ("format") block.
pub(crate) const SIGNATURE_OPEN: &str = "<pre class=\"text\">";
const SIGNATURE_CLOSE: &str = "</pre>";

/// Escape text for use in HTML content and attribute values.
#[must_use]
pub fn escape_html(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '"' => result.push_str("&quot;"),
            '\'' => result.push_str("&#x27;"),
            _ => result.push(c),
        }
    }
    result
}

/// Reverse [`escape_html`].
///
/// Unknown entities are left as they are.
#[must_use]
pub fn unescape_html(s: &str) -> String {
    const ENTITIES: [(&str, char); 6] = [
        ("&amp;", '&'),
        ("&lt;", '<'),
        ("&gt;", '>'),
        ("&quot;", '"'),
        ("&#x27;", '\''),
        ("&#39;", '\''),
    ];

    let mut result = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(pos) = rest.find('&') {
        result.push_str(&rest[..pos]);
        rest = &rest[pos..];
        match ENTITIES.iter().find(|(entity, _)| rest.starts_with(entity)) {
            Some((entity, c)) => {
                result.push(*c);
                rest = &rest[entity.len()..];
            }
            None => {
                result.push('&');
                rest = &rest[1..];
            }
        }
    }
    result.push_str(rest);
    result
}

/// Contents of every `<pre class="text">` block, unescaped, in page order.
///
/// The newline following the opening tag and the one preceding the closing
/// tag belong to the markup and are dropped.
#[must_use]
pub fn extract_signature_blocks(html: &str) -> Vec<String> {
    let mut blocks = Vec::new();
    let mut rest = html;
    while let Some(start) = rest.find(SIGNATURE_OPEN) {
        let body = &rest[start + SIGNATURE_OPEN.len()..];
        let Some(end) = body.find(SIGNATURE_CLOSE) else {
            break;
        };
        let block = &body[..end];
        let block = block.strip_prefix('\n').unwrap_or(block);
        let block = block.strip_suffix('\n').unwrap_or(block);
        blocks.push(unescape_html(block));
        rest = &body[end + SIGNATURE_CLOSE.len()..];
    }
    blocks
}
