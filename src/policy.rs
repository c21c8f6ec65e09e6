//! Compiled whitelist policy.
//!
//! A [`Policy`] is built once from a [`Config`] and never mutated, so a single
//! instance can be shared (through [`Arc`]) by any number of concurrent
//! sanitize calls.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, OnceLock};

use indexmap::IndexMap;

use crate::config::{
    ALL, Config, DEFAULT_MAX_DEPTH, DEFAULT_SELF_CLOSING, DEFAULT_WHITESPACE_ELEMENTS, RELATIVE,
    Whitespace,
};

/// Allowed URL schemes for one element attribute.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ProtocolSet {
    schemes: HashSet<String>,
    relative: bool,
}

impl ProtocolSet {
    /// Build a set from configured scheme names; [`RELATIVE`] enables
    /// scheme-less values.
    pub fn new<I, S>(schemes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut set = Self::default();
        for scheme in schemes {
            let scheme = scheme.as_ref();
            if scheme == RELATIVE {
                set.relative = true;
            } else {
                set.schemes.insert(scheme.to_ascii_lowercase());
            }
        }
        set
    }

    /// Whether `scheme` (already lower-cased) is whitelisted.
    pub fn contains(&self, scheme: &str) -> bool {
        self.schemes.contains(scheme)
    }

    /// Whether values without a scheme are allowed.
    pub fn allows_relative(&self) -> bool {
        self.relative
    }
}

/// Immutable, compiled form of a [`Config`].
#[derive(Clone, Debug)]
pub struct Policy {
    elements: HashSet<String>,
    attributes: HashMap<String, HashSet<String>>,
    add_attributes: HashMap<String, IndexMap<String, String>>,
    protocols: HashMap<String, HashMap<String, ProtocolSet>>,
    self_closing: HashSet<String>,
    whitespace: HashMap<String, Whitespace>,
    max_depth: usize,
}

impl Policy {
    /// Compile `config` merged over the built-in defaults.
    ///
    /// Set fields replace the defaults wholesale; there is no deep merging.
    pub fn compile(config: &Config) -> Self {
        let elements = config
            .elements
            .as_deref()
            .map(lower_set)
            .unwrap_or_default();

        let attributes = config
            .attributes
            .iter()
            .flatten()
            .map(|(tag, names)| (tag.to_ascii_lowercase(), lower_set(names)))
            .collect();

        let add_attributes = config
            .add_attributes
            .iter()
            .flatten()
            .map(|(tag, attrs)| (tag.to_ascii_lowercase(), attrs.clone()))
            .collect();

        let protocols = config
            .protocols
            .iter()
            .flatten()
            .map(|(tag, attrs)| {
                let attrs = attrs
                    .iter()
                    .map(|(name, schemes)| (name.to_ascii_lowercase(), ProtocolSet::new(schemes)))
                    .collect();
                (tag.to_ascii_lowercase(), attrs)
            })
            .collect();

        let self_closing = match &config.self_closing {
            Some(tags) => lower_set(tags),
            None => DEFAULT_SELF_CLOSING.iter().map(|t| t.to_string()).collect(),
        };

        let whitespace = match &config.whitespace {
            Some(table) => table
                .iter()
                .map(|(tag, ws)| (tag.to_ascii_lowercase(), ws.clone()))
                .collect(),
            None => DEFAULT_WHITESPACE_ELEMENTS
                .iter()
                .map(|t| (t.to_string(), Whitespace::space()))
                .collect(),
        };

        let policy = Self {
            elements,
            attributes,
            add_attributes,
            protocols,
            self_closing,
            whitespace,
            max_depth: config.max_depth.unwrap_or(DEFAULT_MAX_DEPTH),
        };
        tracing::debug!(
            "Compiled policy with {} elements and {} attribute lists",
            policy.elements.len(),
            policy.attributes.len()
        );
        policy
    }

    /// The compiled [`Config::default`] policy, shared process-wide.
    pub fn shared_default() -> Arc<Policy> {
        static POLICY: OnceLock<Arc<Policy>> = OnceLock::new();
        POLICY
            .get_or_init(|| Arc::new(Policy::compile(&Config::default())))
            .clone()
    }

    /// The compiled [`Config::restricted`] policy, shared process-wide.
    pub fn shared_restricted() -> Arc<Policy> {
        static POLICY: OnceLock<Arc<Policy>> = OnceLock::new();
        POLICY
            .get_or_init(|| Arc::new(Policy::compile(&Config::restricted())))
            .clone()
    }

    /// The compiled [`Config::basic`] policy, shared process-wide.
    pub fn shared_basic() -> Arc<Policy> {
        static POLICY: OnceLock<Arc<Policy>> = OnceLock::new();
        POLICY
            .get_or_init(|| Arc::new(Policy::compile(&Config::basic())))
            .clone()
    }

    /// The compiled [`Config::relaxed`] policy, shared process-wide.
    pub fn shared_relaxed() -> Arc<Policy> {
        static POLICY: OnceLock<Arc<Policy>> = OnceLock::new();
        POLICY
            .get_or_init(|| Arc::new(Policy::compile(&Config::relaxed())))
            .clone()
    }

    /// Whether `tag` is whitelisted.
    pub fn allows_element(&self, tag: &str) -> bool {
        self.elements.contains(tag)
    }

    /// Whether `name` is allowed on `tag`, either specifically or through the
    /// global [`ALL`] list.
    pub fn allows_attribute(&self, tag: &str, name: &str) -> bool {
        let allowed = |key: &str| {
            self.attributes
                .get(key)
                .is_some_and(|names| names.contains(name))
        };
        allowed(tag) || allowed(ALL)
    }

    /// Protocol whitelist for `tag`'s `attr`, if one is configured.
    pub fn protocols(&self, tag: &str, attr: &str) -> Option<&ProtocolSet> {
        self.protocols.get(tag).and_then(|attrs| attrs.get(attr))
    }

    /// Attributes forced onto `tag`, in configured order.
    pub fn forced_attributes(&self, tag: &str) -> impl Iterator<Item = (&str, &str)> {
        self.add_attributes
            .get(tag)
            .into_iter()
            .flatten()
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }

    /// Whether `tag` is a void element: no children and no closing tag.
    pub fn is_self_closing(&self, tag: &str) -> bool {
        self.self_closing.contains(tag)
    }

    /// Boundary text emitted in place of a removed `tag`, if any.
    pub fn whitespace(&self, tag: &str) -> Option<&Whitespace> {
        self.whitespace.get(tag)
    }

    /// Maximum literal element nesting depth.
    pub fn max_depth(&self) -> usize {
        self.max_depth
    }
}

impl Default for Policy {
    fn default() -> Self {
        Self::compile(&Config::default())
    }
}

fn lower_set(names: &[String]) -> HashSet<String> {
    names.iter().map(|n| n.to_ascii_lowercase()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_policy_allows_nothing() {
        let policy = Policy::default();
        assert!(!policy.allows_element("b"));
        assert!(!policy.allows_attribute("a", "href"));
        assert!(policy.protocols("a", "href").is_none());
        assert_eq!(policy.forced_attributes("a").count(), 0);
    }

    #[test]
    fn default_policy_carries_void_and_whitespace_tables() {
        let policy = Policy::default();
        assert!(policy.is_self_closing("br"));
        assert!(policy.is_self_closing("img"));
        assert!(!policy.is_self_closing("p"));
        assert_eq!(policy.whitespace("p"), Some(&Whitespace::space()));
        assert!(policy.whitespace("span").is_none());
        assert_eq!(policy.max_depth(), DEFAULT_MAX_DEPTH);
    }

    #[test]
    fn set_fields_replace_defaults() {
        let policy = Policy::compile(
            &Config::new()
                .self_closing(["hr"])
                .whitespace("div", "\n", "\n"),
        );
        assert!(policy.is_self_closing("hr"));
        assert!(!policy.is_self_closing("br"));
        assert!(policy.whitespace("p").is_none());
        assert_eq!(policy.whitespace("div"), Some(&Whitespace::new("\n", "\n")));
    }

    #[test]
    fn names_are_lower_cased() {
        let policy = Policy::compile(
            &Config::new()
                .elements(["B", "Img"])
                .attributes("IMG", ["SRC"])
                .protocols("IMG", "SRC", ["HTTPS", RELATIVE]),
        );
        assert!(policy.allows_element("b"));
        assert!(policy.allows_element("img"));
        assert!(policy.allows_attribute("img", "src"));

        let set = policy.protocols("img", "src").unwrap();
        assert!(set.contains("https"));
        assert!(set.allows_relative());
    }

    #[test]
    fn global_attributes_apply_to_every_tag() {
        let policy = Policy::compile(
            &Config::new()
                .attributes(ALL, ["class"])
                .attributes("p", ["title"]),
        );
        assert!(policy.allows_attribute("p", "class"));
        assert!(policy.allows_attribute("div", "class"));
        assert!(policy.allows_attribute("p", "title"));
        assert!(!policy.allows_attribute("div", "title"));
    }

    #[test]
    fn relative_sentinel_is_not_a_scheme() {
        let set = ProtocolSet::new(["http", RELATIVE]);
        assert!(set.contains("http"));
        assert!(!set.contains(RELATIVE));
        assert!(set.allows_relative());
        assert!(!ProtocolSet::new(["http"]).allows_relative());
    }

    #[test]
    fn shared_presets_are_reused() {
        assert!(Arc::ptr_eq(&Policy::shared_basic(), &Policy::shared_basic()));
        assert!(Policy::shared_relaxed().allows_element("table"));
        assert!(!Policy::shared_restricted().allows_element("a"));
        assert!(!Policy::shared_default().allows_element("b"));
    }

    #[test]
    fn basic_forces_rel_nofollow() {
        let policy = Policy::shared_basic();
        let forced: Vec<_> = policy.forced_attributes("a").collect();
        assert_eq!(forced, [("rel", "nofollow")]);
    }

    #[test]
    fn policy_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Policy>();
    }
}
