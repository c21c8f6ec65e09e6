//! Per-attribute whitelist and value filtering.

use crate::entities;
use crate::error::EncodingError;
use crate::policy::Policy;

/// Decide whether attribute `name` of `tag` survives, returning the value to
/// serialize.
///
/// Attributes outside the tag and global whitelists are dropped. Non-empty
/// values with a protocol whitelist must pass it, and are trimmed only after
/// passing; on rejection the whole attribute is dropped.
pub fn filter<'v>(policy: &Policy, tag: &str, name: &str, value: &'v str) -> Option<&'v str> {
    if !policy.allows_attribute(tag, name) {
        return None;
    }
    if value.is_empty() {
        return Some(value);
    }
    match policy.protocols(tag, name) {
        Some(protocols) if protocols.allows(value) => Some(value.trim()),
        Some(_) => {
            tracing::debug!("Dropping {tag} {name} attribute with a disallowed protocol");
            None
        }
        None => Some(value),
    }
}

/// Append ` name="value"` with the value strictly encoded.
pub fn write(out: &mut String, name: &str, value: &str) -> Result<(), EncodingError> {
    let value = entities::encode(value)?;
    out.push(' ');
    out.push_str(name);
    out.push_str("=\"");
    out.push_str(&value);
    out.push('"');
    Ok(())
}
