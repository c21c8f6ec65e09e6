//! Content-type normalization for `<meta http-equiv>` elements.

use std::collections::HashMap;
use std::sync::OnceLock;

use regex::Regex;

use crate::dom::Attribute;

/// The only content type this crate ever emits.
pub const UTF8_CONTENT_TYPE: &str = "text/html; charset=utf-8";

fn content_type_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)^\s*text/html\s*(;\s*charset\s*=\s*utf-8\s*)?$").expect("valid regex")
    })
}

/// Replacement for the `content` attribute of a `<meta>` element, if it
/// declares a content type other than UTF-8 HTML.
///
/// Output is always UTF-8, so any other declared charset would be wrong and
/// could re-enable encoding-based evasion.
pub fn content_override(attrs: &[Attribute]) -> Option<&'static str> {
    let attrs: HashMap<String, &str> = attrs
        .iter()
        .map(|attr| (attr.name.to_ascii_lowercase(), attr.value.as_str()))
        .collect();

    let http_equiv = attrs.get("http-equiv")?;
    if !http_equiv.trim().eq_ignore_ascii_case("content-type") {
        return None;
    }

    match attrs.get("content") {
        Some(content) if content_type_regex().is_match(content) => None,
        _ => Some(UTF8_CONTENT_TYPE),
    }
}
