//! Policy-driven tree sanitizer.
//!
//! A [`Sanitizer`] runs one pass per call: the raw markup goes through the
//! Unicode prefilter, is parsed into a node tree, and the tree is walked and
//! re-serialized, keeping only what the [`Policy`] whitelists.
//!
//! - [`protocol`] -- URL scheme extraction and whitelist checks.
//! - [`unicode`] -- removal of confusable code points before parsing.
//! - [`meta`] -- UTF-8 normalization of `<meta http-equiv="content-type">`.
//! - [`attribute`] -- per-attribute filtering and serialization.

pub mod attribute;
pub mod meta;
pub mod protocol;
pub mod unicode;

use std::sync::Arc;

use ego_tree::{NodeRef, Tree};

use crate::config::Config;
use crate::dom::{self, Element, Node};
use crate::entities;
use crate::error::Result;
use crate::policy::Policy;

/// Sanitizes markup against a compiled [`Policy`].
///
/// Cheap to clone and safe to share between threads; the policy is never
/// mutated.
///
/// # Example
///
/// ```
/// use html_sanitize::Sanitizer;
///
/// let sanitizer = Sanitizer::basic();
/// let html = sanitizer
///     .sanitize(r#"<a href="javascript:alert(1)" onclick="x()">click</a>"#)
///     .unwrap();
/// assert_eq!(html, r#"<a rel="nofollow">click</a>"#);
/// ```
#[derive(Clone, Debug)]
pub struct Sanitizer {
    policy: Arc<Policy>,
}

impl Sanitizer {
    /// Compile `config` into a new sanitizer.
    pub fn new(config: &Config) -> Self {
        Self::with_policy(Arc::new(Policy::compile(config)))
    }

    /// Use an already compiled, possibly shared, policy.
    pub fn with_policy(policy: Arc<Policy>) -> Self {
        Self { policy }
    }

    /// Sanitizer for [`Config::restricted`].
    pub fn restricted() -> Self {
        Self::with_policy(Policy::shared_restricted())
    }

    /// Sanitizer for [`Config::basic`].
    pub fn basic() -> Self {
        Self::with_policy(Policy::shared_basic())
    }

    /// Sanitizer for [`Config::relaxed`].
    pub fn relaxed() -> Self {
        Self::with_policy(Policy::shared_relaxed())
    }

    /// The compiled policy this sanitizer applies.
    pub fn policy(&self) -> &Policy {
        &self.policy
    }

    /// Sanitize user-supplied markup. Equivalent to [`fragment`](Self::fragment).
    pub fn sanitize(&self, html: &str) -> Result<String> {
        self.fragment(html)
    }

    /// Sanitize a markup fragment. No document wrapper is ever emitted.
    pub fn fragment(&self, html: &str) -> Result<String> {
        let html = unicode::strip_unsuitable(html);
        serialize(&dom::parse_fragment(&html), &self.policy)
    }

    /// Sanitize a full document. `<html>`, `<head>` and `<body>` are emitted
    /// only when whitelisted and literally present in the source.
    pub fn document(&self, html: &str) -> Result<String> {
        let html = unicode::strip_unsuitable(html);
        serialize(&dom::parse_document(&html), &self.policy)
    }
}

impl Default for Sanitizer {
    fn default() -> Self {
        Self::with_policy(Policy::shared_default())
    }
}

enum Step<'a> {
    /// Visit a node whose parent sits at the given literal nesting depth.
    Open(NodeRef<'a, Node>, usize),
    Close(&'a Element),
}

/// Serialize the parts of `tree` that `policy` allows.
///
/// Traversal uses an explicit stack. Elements nested deeper than the
/// policy's maximum depth are dropped together with their subtrees.
pub fn serialize(tree: &Tree<Node>, policy: &Policy) -> Result<String> {
    let mut out = String::new();
    let mut pruned = 0usize;
    let mut stack = vec![Step::Open(tree.root(), 0)];

    while let Some(step) = stack.pop() {
        match step {
            Step::Open(node, depth) => match node.value() {
                Node::Document => push_children(&mut stack, node, depth),
                Node::Element(el) => {
                    let depth = if el.synthetic { depth } else { depth + 1 };
                    if depth > policy.max_depth() {
                        pruned += 1;
                        continue;
                    }
                    open_element(&mut out, policy, el)?;
                    if !policy.is_self_closing(&el.name) {
                        stack.push(Step::Close(el));
                        push_children(&mut stack, node, depth);
                    }
                }
                Node::Text(text) => write_text(&mut out, policy, node, text)?,
                Node::Comment(_) => {}
            },
            Step::Close(el) => close_element(&mut out, policy, el),
        }
    }

    if pruned > 0 {
        tracing::warn!(
            "Dropped {pruned} subtrees nested deeper than {} elements",
            policy.max_depth()
        );
    }
    Ok(out)
}

fn push_children<'a>(stack: &mut Vec<Step<'a>>, node: NodeRef<'a, Node>, depth: usize) {
    stack.extend(node.children().rev().map(|child| Step::Open(child, depth)));
}

/// Text inside a kept raw-text element is never entity-decoded by the parser,
/// so it is emitted as is unless it could close the element.
fn write_text(out: &mut String, policy: &Policy, node: NodeRef<'_, Node>, text: &str) -> Result<()> {
    let in_raw_text = node.parent().is_some_and(|parent| match parent.value() {
        Node::Element(el) => {
            !el.synthetic
                && policy.allows_element(&el.name)
                && dom::RAW_TEXT_ELEMENTS.contains(&el.name.as_str())
        }
        _ => false,
    });

    if in_raw_text && !text.contains('<') {
        entities::validate(text)?;
        out.push_str(text);
    } else {
        out.push_str(&entities::encode(text)?);
    }
    Ok(())
}

fn open_element(out: &mut String, policy: &Policy, el: &Element) -> Result<()> {
    if el.synthetic {
        return Ok(());
    }
    if !policy.allows_element(&el.name) {
        if let Some(ws) = policy.whitespace(&el.name) {
            out.push_str(&ws.before);
        }
        return Ok(());
    }

    out.push('<');
    out.push_str(&el.name);

    let content = if el.name == "meta" {
        meta::content_override(&el.attrs)
    } else {
        None
    };
    for attr in &el.attrs {
        let raw = match content {
            Some(content) if attr.name == "content" => content,
            _ => attr.value.as_str(),
        };
        if let Some(value) = attribute::filter(policy, &el.name, &attr.name, raw) {
            attribute::write(out, &attr.name, value)?;
        }
    }
    for (name, value) in policy.forced_attributes(&el.name) {
        attribute::write(out, name, value)?;
    }

    out.push('>');
    Ok(())
}

fn close_element(out: &mut String, policy: &Policy, el: &Element) {
    if el.synthetic {
        return;
    }
    if policy.allows_element(&el.name) {
        out.push_str("</");
        out.push_str(&el.name);
        out.push('>');
    } else if let Some(ws) = policy.whitespace(&el.name) {
        out.push_str(&ws.after);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::Attribute;
    use crate::error::SanitizeError;

    fn element(name: &str, attrs: &[(&str, &str)], synthetic: bool) -> Node {
        Node::Element(Element {
            name: name.to_string(),
            attrs: attrs
                .iter()
                .map(|(name, value)| Attribute::new(*name, *value))
                .collect(),
            synthetic,
        })
    }

    #[test]
    fn synthetic_elements_are_never_emitted() {
        let mut tree = Tree::new(Node::Document);
        let mut root = tree.root_mut();
        let mut wrapper = root.append(element("b", &[], true));
        wrapper.append(Node::Text("inside".into()));

        let policy = Policy::compile(&Config::new().elements(["b"]));
        assert_eq!(serialize(&tree, &policy).unwrap(), "inside");
    }

    #[test]
    fn literal_elements_are_emitted() {
        let mut tree = Tree::new(Node::Document);
        let mut root = tree.root_mut();
        let mut b = root.append(element("b", &[("class", "x")], false));
        b.append(Node::Text("bold".into()));
        root.append(Node::Comment("gone".into()));

        let policy = Policy::compile(&Config::new().elements(["b"]));
        assert_eq!(serialize(&tree, &policy).unwrap(), "<b>bold</b>");
    }

    #[test]
    fn void_elements_skip_children_and_closing() {
        let mut tree = Tree::new(Node::Document);
        let mut root = tree.root_mut();
        let mut img = root.append(element("img", &[], false));
        img.append(Node::Text("never".into()));

        let policy = Policy::compile(&Config::new().elements(["img"]));
        assert_eq!(serialize(&tree, &policy).unwrap(), "<img>");

        let policy = Policy::default();
        assert_eq!(serialize(&tree, &policy).unwrap(), "");
    }

    #[test]
    fn removed_void_elements_only_emit_before() {
        let sanitizer = Sanitizer::default();
        assert_eq!(sanitizer.sanitize("foo<br>bar<hr>baz").unwrap(), "foo bar baz");
    }

    #[test]
    fn comments_are_dropped() {
        let sanitizer = Sanitizer::relaxed();
        assert_eq!(
            sanitizer
                .fragment("<!--[if gte IE 4]>\n<script>alert('XSS');</script>\n<![endif]-->")
                .unwrap(),
            ""
        );
        assert_eq!(sanitizer.sanitize("a<!-- b -->c").unwrap(), "ac");
    }

    #[test]
    fn forced_attributes_are_always_appended() {
        let sanitizer = Sanitizer::new(
            &Config::new()
                .elements(["a"])
                .attributes("a", ["rel"])
                .add_attributes("a", [("rel", "nofollow"), ("target", "_blank")]),
        );
        assert_eq!(
            sanitizer.sanitize(r#"<a rel="me">x</a>"#).unwrap(),
            r#"<a rel="me" rel="nofollow" target="_blank">x</a>"#
        );
    }

    #[test]
    fn forced_attribute_values_are_encoded() {
        let sanitizer = Sanitizer::new(
            &Config::new()
                .elements(["span"])
                .add_attributes("span", [("title", r#"a "b" <c>"#)]),
        );
        assert_eq!(
            sanitizer.sanitize("<span>x</span>").unwrap(),
            r#"<span title="a &quot;b&quot; &lt;c&gt;">x</span>"#
        );
    }

    #[test]
    fn meta_content_type_is_forced_to_utf8() {
        let sanitizer = Sanitizer::new(
            &Config::new()
                .elements(["meta"])
                .attributes("meta", ["content", "http-equiv"]),
        );
        assert_eq!(
            sanitizer
                .sanitize(r#"<meta http-equiv="content-type" content="text/html;charset=us-ascii">"#)
                .unwrap(),
            r#"<meta http-equiv="content-type" content="text/html; charset=utf-8">"#
        );
    }

    #[test]
    fn meta_rewrite_requires_whitelisted_content() {
        let sanitizer = Sanitizer::new(
            &Config::new()
                .elements(["meta"])
                .attributes("meta", ["http-equiv"]),
        );
        assert_eq!(
            sanitizer
                .sanitize(r#"<meta http-equiv="content-type" content="text/html;charset=us-ascii">"#)
                .unwrap(),
            r#"<meta http-equiv="content-type">"#
        );
    }

    #[test]
    fn depth_limit_drops_deep_subtrees() {
        let sanitizer = Sanitizer::new(&Config::new().elements(["b", "i", "u"]).max_depth(2));
        assert_eq!(
            sanitizer.sanitize("<b><i><u>x</u>y</i></b>z").unwrap(),
            "<b><i>y</i></b>z"
        );
    }

    #[test]
    fn deep_nesting_is_bounded() {
        let html = format!("{}x", "<div>".repeat(1_000));
        let sanitizer = Sanitizer::new(&Config::new().elements(["div"]));
        let out = sanitizer.sanitize(&html).unwrap();
        assert_eq!(out.matches("<div>").count(), 512);
        assert_eq!(out.matches("</div>").count(), 512);
        assert!(!out.contains('x'));
    }

    #[test]
    fn forbidden_code_points_fail_the_whole_call() {
        let sanitizer = Sanitizer::default();
        let err = sanitizer.sanitize("ok <b>\u{1}</b>").unwrap_err();
        assert!(matches!(err, SanitizeError::Encoding(e) if e.code_point == 1));
    }

    #[test]
    fn kept_raw_text_is_emitted_verbatim() {
        let sanitizer = Sanitizer::relaxed();
        let css = r#"a > b { content: "x & y" }"#;
        let once = sanitizer.sanitize(&format!("<style>{css}</style>")).unwrap();
        assert_eq!(once, format!("<style>{css}</style>"));
        assert_eq!(sanitizer.sanitize(&once).unwrap(), once);
    }

    #[test]
    fn kept_raw_text_with_open_bracket_is_encoded() {
        let sanitizer = Sanitizer::relaxed();
        let once = sanitizer.sanitize("<style>a<b & c</style>").unwrap();
        assert_eq!(once, "<style>a&lt;b &amp; c</style>");
        assert_eq!(sanitizer.sanitize(&once).unwrap(), once);
    }

    #[test]
    fn removed_raw_text_element_content_is_encoded() {
        assert_eq!(
            Sanitizer::default().sanitize("<style>a > b</style>").unwrap(),
            "a &gt; b"
        );
    }

    #[test]
    fn kept_raw_text_still_rejects_forbidden_code_points() {
        let err = Sanitizer::relaxed()
            .sanitize("<style>a\u{1}</style>")
            .unwrap_err();
        assert!(matches!(err, SanitizeError::Encoding(e) if e.code_point == 1));
    }

    #[test]
    fn template_contents_are_visited() {
        let template = "<template><b>x</b></template>";
        assert_eq!(Sanitizer::default().sanitize(template).unwrap(), "x");
        assert_eq!(Sanitizer::relaxed().sanitize(template).unwrap(), "<b>x</b>");
    }

    #[test]
    fn sanitizer_is_shareable() {
        fn assert_send_sync<T: Send + Sync + Clone>() {}
        assert_send_sync::<Sanitizer>();
    }
}
