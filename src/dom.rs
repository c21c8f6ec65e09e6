//! Parsed node tree and the adapter over the HTML5 parser.
//!
//! Parsing (tokenization, error recovery, implied elements and character
//! reference decoding) is delegated to [`scraper`]. Its tree is converted
//! into a [`Tree<Node>`] that carries exactly what the sanitizer consults,
//! including whether an element literally appeared in the source.

use std::collections::HashMap;
use std::sync::OnceLock;

use ego_tree::{NodeRef, Tree};
use regex::Regex;
use scraper::Html;

/// A node of the parsed tree.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Node {
    /// The document or fragment root.
    Document,
    Element(Element),
    Text(String),
    Comment(String),
}

/// An element with its attributes in source order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Element {
    /// Lower-cased tag name.
    pub name: String,
    pub attrs: Vec<Attribute>,
    /// `true` when the parser inferred this element (an implied `<html>`,
    /// `<head>` or `<body>`, or the fragment context root) instead of reading
    /// it from the source.
    pub synthetic: bool,
}

/// An attribute; valueless attributes have an empty value.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Attribute {
    /// Lower-cased attribute name.
    pub name: String,
    pub value: String,
}

impl Attribute {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Parse `html` as a fragment in a `<body>` context.
///
/// The parser wraps fragments in a context `<html>` element, which is marked
/// synthetic. Literal `<html>`, `<head>` and `<body>` tags are ignored by
/// fragment parsing and never produce elements.
pub fn parse_fragment(html: &str) -> Tree<Node> {
    let parsed = Html::parse_fragment(html);
    convert(&parsed, |node, _| {
        node.parent().is_some_and(|parent| parent.parent().is_none())
    })
}

/// Parse `html` as a complete document.
///
/// `<html>`, `<head>` and `<body>` are always present in the parsed tree;
/// each is marked synthetic unless a literal start tag for it appears in the
/// source.
pub fn parse_document(html: &str) -> Tree<Node> {
    let literal = LiteralWrappers::scan(html);
    let parsed = Html::parse_document(html);
    convert(&parsed, |_, name| !literal.contains(name))
}

/// Copy the parser tree into a [`Tree<Node>`] without recursion.
///
/// `is_synthetic` decides the flag for each element given its parser node and
/// lower-cased name. Doctypes and processing instructions are dropped.
fn convert<F>(parsed: &Html, is_synthetic: F) -> Tree<Node>
where
    F: Fn(NodeRef<'_, scraper::node::Node>, &str) -> bool,
{
    let mut tree = Tree::new(Node::Document);
    let source_root = parsed.tree.root();

    let mut ids = HashMap::new();
    ids.insert(source_root.id(), tree.root().id());

    for node in source_root.descendants().skip(1) {
        let Some(&parent_id) = node.parent().and_then(|parent| ids.get(&parent.id())) else {
            continue;
        };

        let value = match node.value() {
            scraper::node::Node::Element(el) => {
                let name = el.name().to_ascii_lowercase();
                let attrs = el
                    .attrs()
                    .map(|(name, value)| Attribute::new(name.to_ascii_lowercase(), value))
                    .collect();
                let synthetic = is_synthetic(node, &name);
                Node::Element(Element {
                    name,
                    attrs,
                    synthetic,
                })
            }
            scraper::node::Node::Text(text) => Node::Text(String::from(&**text)),
            scraper::node::Node::Comment(comment) => Node::Comment(String::from(&**comment)),
            // Template contents hang off a nested fragment; attach them to
            // the template element itself.
            scraper::node::Node::Fragment => {
                ids.insert(node.id(), parent_id);
                continue;
            }
            _ => continue,
        };

        let Some(mut parent) = tree.get_mut(parent_id) else {
            continue;
        };
        let id = parent.append(value).id();
        ids.insert(node.id(), id);
    }

    tree
}

/// Elements whose content the parser keeps as raw text: no tags, no
/// character references.
pub const RAW_TEXT_ELEMENTS: &[&str] = &[
    "iframe", "noembed", "noframes", "noscript", "plaintext", "script", "style", "xmp",
];

/// Elements whose content cannot hold tags but does decode character
/// references.
const ESCAPABLE_RAW_TEXT_ELEMENTS: &[&str] = &["textarea", "title"];

/// Start tags the parser places in `<head>` without implying `<body>`.
const HEAD_CONTENT: &[&str] = &[
    "base", "basefont", "bgsound", "link", "meta", "noframes", "noscript", "script", "style",
    "template", "title",
];

/// Which document wrapper elements were opened by a literal start tag.
///
/// A wrapper start tag only counts when nothing before it already made the
/// parser imply that element; a later tag merely merges its attributes into
/// the implied one.
#[derive(Debug, Default, PartialEq, Eq)]
struct LiteralWrappers {
    html: bool,
    head: bool,
    body: bool,
}

/// Wrapper elements the parser has already opened, literally or not.
#[derive(Default)]
struct Opened {
    html: bool,
    head: bool,
    body: bool,
}

impl Opened {
    fn through_head(&mut self) {
        self.html = true;
        self.head = true;
    }

    fn through_body(&mut self) {
        self.through_head();
        self.body = true;
    }
}

/// Matches, on lower-cased input, a comment, a doctype or processing
/// instruction, or a start or end tag with its name in group 2.
fn token_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?s)<!--.*?(?:-->|\z)|<[!?][^>]*(?:>|\z)|<(/?)([a-z][^\t\n\x0C\r />]*)[\t\n\x0C\r />]")
            .expect("valid regex")
    })
}

fn is_html_whitespace(c: char) -> bool {
    matches!(c, '\t' | '\n' | '\x0C' | '\r' | ' ')
}

/// Byte offset just past the `>` that closes a tag whose attributes start at
/// `from`, skipping quoted attribute values.
fn tag_end(html: &str, from: usize) -> usize {
    let mut quote = None;
    let mut after_eq = false;
    for (i, c) in html[from..].char_indices() {
        match quote {
            Some(q) if c == q => quote = None,
            Some(_) => {}
            None => match c {
                '"' | '\'' if after_eq => quote = Some(c),
                '>' => return from + i + 1,
                c if is_html_whitespace(c) => continue,
                _ => {}
            },
        }
        after_eq = quote.is_none() && c == '=';
    }
    html.len()
}

impl LiteralWrappers {
    fn scan(html: &str) -> Self {
        let lower = html.to_ascii_lowercase();
        let mut found = Self::default();
        let mut opened = Opened::default();
        let mut pos = 0;

        while let Some(caps) = token_regex().captures_at(&lower, pos) {
            let Some(token) = caps.get(0) else {
                break;
            };
            if !lower[pos..token.start()].chars().all(is_html_whitespace) {
                opened.through_body();
            }
            pos = token.end();

            let Some(name) = caps.get(2).map(|m| m.as_str()) else {
                continue;
            };
            if !token.as_str().ends_with('>') {
                pos = tag_end(&lower, pos);
            }
            let is_end = caps.get(1).is_some_and(|m| !m.as_str().is_empty());

            if is_end {
                match name {
                    "head" => opened.through_head(),
                    "body" | "html" | "br" => opened.through_body(),
                    _ => {}
                }
                continue;
            }

            match name {
                "html" => {
                    found.html |= !opened.html;
                    opened.html = true;
                }
                "head" => {
                    found.head |= !opened.head;
                    opened.through_head();
                }
                "body" => {
                    found.body |= !opened.body;
                    opened.through_body();
                }
                name if HEAD_CONTENT.contains(&name) => opened.through_head(),
                _ => opened.through_body(),
            }

            if name == "plaintext" {
                break;
            }
            if RAW_TEXT_ELEMENTS.contains(&name) || ESCAPABLE_RAW_TEXT_ELEMENTS.contains(&name) {
                pos = lower[pos..]
                    .find(&format!("</{name}"))
                    .map_or(lower.len(), |end| pos + end);
            }
        }
        found
    }

    /// Only `html`, `head` and `body` can be implied by the parser; every
    /// other element is literal.
    fn contains(&self, name: &str) -> bool {
        match name {
            "html" => self.html,
            "head" => self.head,
            "body" => self.body,
            _ => true,
        }
    }
}
