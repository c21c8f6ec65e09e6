//! URL scheme extraction and whitelist checks.

use std::sync::OnceLock;

use regex::Regex;

use crate::policy::{Policy, ProtocolSet};

/// Matches a value a browser could treat as a URL with a scheme: any run of
/// characters (excluding `/` and `#`) followed by a colon, even when the
/// colon is written as a decimal or hex character reference, with or without
/// zero padding and the closing semicolon.
fn protocol_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)^\s*([^/#]*?)(?::|&#0*58|&#x0*3a)").expect("valid regex"))
}

/// Extract the lower-cased scheme of `value`, or `None` for a relative URL.
pub fn scheme(value: &str) -> Option<String> {
    protocol_regex()
        .captures(value)
        .map(|caps| caps[1].to_lowercase())
}

impl ProtocolSet {
    /// Whether `value` uses a whitelisted scheme, or has no scheme and
    /// relative URLs are allowed.
    pub fn allows(&self, value: &str) -> bool {
        match scheme(value) {
            Some(scheme) => self.contains(&scheme),
            None => self.allows_relative(),
        }
    }
}

/// Check `value` against the protocol whitelist of `tag`'s `attr`.
///
/// Returns `true` when the policy has no whitelist for the pair.
pub fn is_allowed_protocol(policy: &Policy, tag: &str, attr: &str, value: &str) -> bool {
    policy
        .protocols(tag, attr)
        .is_none_or(|protocols| protocols.allows(value))
}
