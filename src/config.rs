//! Declarative sanitize configuration and the built-in presets.

use std::collections::HashMap;

use indexmap::IndexMap;

/// Protocol whitelist token that permits relative URLs (no scheme at all).
pub const RELATIVE: &str = ":relative";

/// Attribute whitelist key whose attributes are allowed on every element.
pub const ALL: &str = "_";

/// Nesting depth past which subtrees are dropped.
pub const DEFAULT_MAX_DEPTH: usize = 512;

/// Void elements: never closed, children never serialized.
pub(crate) const DEFAULT_SELF_CLOSING: &[&str] = &[
    "area", "base", "br", "col", "command", "embed", "hr", "img", "input", "keygen", "link",
    "meta", "param", "source", "track", "wbr",
];

/// Elements replaced by a single space on each side when they are removed.
pub(crate) const DEFAULT_WHITESPACE_ELEMENTS: &[&str] = &[
    "address", "article", "aside", "blockquote", "br", "dd", "div", "dl", "dt", "footer", "h1",
    "h2", "h3", "h4", "h5", "h6", "header", "hgroup", "hr", "li", "nav", "ol", "p", "pre",
    "section", "ul",
];

const RESTRICTED_ELEMENTS: &[&str] = &["b", "em", "i", "strong", "u"];

const BASIC_ELEMENTS: &[&str] = &[
    "a", "abbr", "blockquote", "br", "cite", "code", "dd", "dfn", "dl", "dt", "kbd", "li", "mark",
    "ol", "p", "pre", "q", "s", "samp", "small", "strike", "sub", "sup", "time", "ul", "var",
];

const RELAXED_ELEMENTS: &[&str] = &[
    "address", "article", "aside", "bdi", "bdo", "body", "caption", "col", "colgroup", "data",
    "del", "div", "figcaption", "figure", "footer", "h1", "h2", "h3", "h4", "h5", "h6", "head",
    "header", "hgroup", "hr", "html", "img", "ins", "main", "nav", "rp", "rt", "ruby", "section",
    "span", "style", "summary", "sup", "table", "tbody", "td", "tfoot", "th", "thead", "title",
    "tr", "wbr",
];

/// Text substituted for the boundaries of a removed element.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Whitespace {
    /// Emitted in place of the opening tag.
    pub before: String,
    /// Emitted in place of the closing tag.
    pub after: String,
}

impl Whitespace {
    /// Create a substitution with explicit `before` and `after` text.
    pub fn new(before: impl Into<String>, after: impl Into<String>) -> Self {
        Self {
            before: before.into(),
            after: after.into(),
        }
    }

    /// A single space on each side.
    pub fn space() -> Self {
        Self::new(" ", " ")
    }
}

/// User-supplied sanitize options.
///
/// Every field is optional. When compiled into a [`Policy`](crate::Policy),
/// unset fields fall back to the built-in defaults (the void element list and
/// block-level whitespace table) and set fields replace them entirely.
///
/// Names are case-insensitive; unknown tag or attribute names are inert.
///
/// # Example
///
/// ```
/// use html_sanitize::{Config, RELATIVE};
///
/// let config = Config::new()
///     .elements(["a", "p"])
///     .attributes("a", ["href"])
///     .protocols("a", "href", ["https", RELATIVE])
///     .add_attributes("a", [("rel", "nofollow")]);
///
/// let html = html_sanitize::sanitize(r#"<p><a href="/about">About</a></p>"#, &config).unwrap();
/// assert_eq!(html, r#"<p><a href="/about" rel="nofollow">About</a></p>"#);
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[cfg_attr(feature = "serde", serde(default, rename_all = "camelCase"))]
pub struct Config {
    /// Allowed element names.
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub elements: Option<Vec<String>>,

    /// Allowed attributes per element; the [`ALL`] key applies to every element.
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub attributes: Option<HashMap<String, Vec<String>>>,

    /// Attributes forced onto every emitted opening tag of an element.
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub add_attributes: Option<HashMap<String, IndexMap<String, String>>>,

    /// Allowed URL schemes per element and attribute. [`RELATIVE`] permits
    /// scheme-less values.
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub protocols: Option<HashMap<String, HashMap<String, Vec<String>>>>,

    /// Void elements.
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub self_closing: Option<Vec<String>>,

    /// Boundary text for removed elements.
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub whitespace: Option<HashMap<String, Whitespace>>,

    /// Maximum element nesting depth; deeper subtrees are dropped.
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub max_depth: Option<usize>,
}

impl Config {
    /// An empty configuration: nothing is whitelisted and the default void
    /// element and whitespace tables apply.
    pub fn new() -> Self {
        Self::default()
    }

    /// Allows only simple inline formatting (`b`, `em`, `i`, `strong`, `u`).
    pub fn restricted() -> Self {
        Self {
            elements: Some(strings(RESTRICTED_ELEMENTS)),
            ..Self::default()
        }
    }

    /// Adds common inline and structural elements, links with forced
    /// `rel="nofollow"`, and scheme whitelists for links and citations.
    pub fn basic() -> Self {
        let restricted = Self::restricted();
        let mut elements = restricted.elements.clone().unwrap_or_default();
        elements.extend(strings(BASIC_ELEMENTS));

        Self {
            elements: Some(elements),
            attributes: Some(lists(&[
                ("a", &["href"]),
                ("abbr", &["title"]),
                ("blockquote", &["cite"]),
                ("dfn", &["title"]),
                ("q", &["cite"]),
                ("time", &["datetime", "pubdate"]),
            ])),
            ..restricted
        }
        .add_attributes("a", [("rel", "nofollow")])
        .protocols("a", "href", ["ftp", "http", "https", "mailto", RELATIVE])
        .protocols("blockquote", "cite", ["http", "https", RELATIVE])
        .protocols("q", "cite", ["http", "https", RELATIVE])
    }

    /// Adds document structure, tables, images and a broad attribute
    /// whitelist. No attributes are forced.
    pub fn relaxed() -> Self {
        let basic = Self::basic();
        let mut elements = basic.elements.clone().unwrap_or_default();
        elements.extend(strings(RELAXED_ELEMENTS));

        let mut attributes = basic.attributes.clone().unwrap_or_default();
        attributes.extend(lists(&[
            (
                ALL,
                &[
                    "class", "dir", "hidden", "id", "lang", "style", "tabindex", "title",
                    "translate",
                ],
            ),
            ("a", &["href", "hreflang", "name", "rel"]),
            ("col", &["span", "width"]),
            ("colgroup", &["span", "width"]),
            ("data", &["value"]),
            ("del", &["cite", "datetime"]),
            ("img", &["align", "alt", "border", "height", "src", "width"]),
            ("ins", &["cite", "datetime"]),
            ("li", &["value"]),
            ("ol", &["reversed", "start", "type"]),
            ("style", &["media", "scoped", "type"]),
            (
                "table",
                &[
                    "align", "bgcolor", "border", "cellpadding", "cellspacing", "frame", "rules",
                    "sortable", "summary", "width",
                ],
            ),
            (
                "td",
                &[
                    "abbr", "align", "axis", "colspan", "headers", "rowspan", "valign", "width",
                ],
            ),
            (
                "th",
                &[
                    "abbr", "align", "axis", "colspan", "headers", "rowspan", "scope", "sorted",
                    "valign", "width",
                ],
            ),
            ("ul", &["type"]),
        ]));

        Self {
            elements: Some(elements),
            attributes: Some(attributes),
            add_attributes: None,
            ..basic
        }
        .protocols("del", "cite", ["http", "https", RELATIVE])
        .protocols("img", "src", ["http", "https", RELATIVE])
        .protocols("ins", "cite", ["http", "https", RELATIVE])
    }

    /// Replace the allowed element list.
    pub fn elements<I, S>(mut self, elements: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.elements = Some(elements.into_iter().map(Into::into).collect());
        self
    }

    /// Set the allowed attributes of `tag` (use [`ALL`] for every element).
    pub fn attributes<I, S>(mut self, tag: impl Into<String>, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.attributes
            .get_or_insert_with(HashMap::new)
            .insert(tag.into(), names.into_iter().map(Into::into).collect());
        self
    }

    /// Force `name="value"` pairs onto every emitted `tag`.
    pub fn add_attributes<I, K, V>(mut self, tag: impl Into<String>, attrs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.add_attributes
            .get_or_insert_with(HashMap::new)
            .insert(
                tag.into(),
                attrs.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
            );
        self
    }

    /// Set the allowed URL schemes of `tag`'s `attr`.
    pub fn protocols<I, S>(mut self, tag: impl Into<String>, attr: impl Into<String>, schemes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.protocols
            .get_or_insert_with(HashMap::new)
            .entry(tag.into())
            .or_default()
            .insert(attr.into(), schemes.into_iter().map(Into::into).collect());
        self
    }

    /// Replace the void element list.
    pub fn self_closing<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.self_closing = Some(tags.into_iter().map(Into::into).collect());
        self
    }

    /// Set the boundary text emitted when `tag` is removed.
    ///
    /// The first call replaces the default whitespace table.
    pub fn whitespace(
        mut self,
        tag: impl Into<String>,
        before: impl Into<String>,
        after: impl Into<String>,
    ) -> Self {
        self.whitespace
            .get_or_insert_with(HashMap::new)
            .insert(tag.into(), Whitespace::new(before, after));
        self
    }

    /// Limit element nesting; deeper subtrees are dropped from the output.
    pub fn max_depth(mut self, depth: usize) -> Self {
        self.max_depth = Some(depth);
        self
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn lists(entries: &[(&str, &[&str])]) -> HashMap<String, Vec<String>> {
    entries
        .iter()
        .map(|(key, items)| (key.to_string(), strings(items)))
        .collect()
}
