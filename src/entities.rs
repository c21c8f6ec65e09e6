//! Strict HTML entity encoding for text and attribute values.

use crate::error::EncodingError;

/// Encode `text` so it can be embedded in element content or a double-quoted
/// attribute value.
///
/// The markup-significant ASCII characters are replaced by named references
/// (`&amp;`, `&lt;`, `&gt;`, `&quot;`, `&apos;`, `&grave;`). Everything else is
/// emitted verbatim, since output is always UTF-8: non-ASCII characters are
/// never turned into named references, so `é` stays `é` rather than
/// becoming `&eacute;`.
///
/// Encoding is strict: control characters and Unicode noncharacters are
/// rejected with an [`EncodingError`] rather than passed through.
///
/// # Example
///
/// ```
/// use html_sanitize::entities::encode;
///
/// assert_eq!(encode(r#"<a title="x">"#).unwrap(), "&lt;a title=&quot;x&quot;&gt;");
/// assert!(encode("bell\u{7}").is_err());
/// ```
pub fn encode(text: &str) -> Result<String, EncodingError> {
    let mut out = String::with_capacity(text.len());
    for (offset, c) in text.char_indices() {
        if is_forbidden(c) {
            return Err(EncodingError {
                code_point: c as u32,
                offset,
            });
        }
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            '`' => out.push_str("&grave;"),
            _ => out.push(c),
        }
    }
    Ok(out)
}

/// Check `text` for the code points [`encode`] rejects, without escaping
/// anything.
pub fn validate(text: &str) -> Result<(), EncodingError> {
    match text.char_indices().find(|&(_, c)| is_forbidden(c)) {
        Some((offset, c)) => Err(EncodingError {
            code_point: c as u32,
            offset,
        }),
        None => Ok(()),
    }
}

/// Code points that have no unambiguous serialization.
fn is_forbidden(c: char) -> bool {
    let cp = c as u32;
    matches!(cp, 0x00..=0x08 | 0x0B | 0x0E..=0x1F | 0x7F..=0x9F | 0xFDD0..=0xFDEF)
        || (cp & 0xFFFE) == 0xFFFE
}
