//! # html_sanitize
//!
//! A whitelist-based HTML sanitizer for untrusted markup.
//!
//! ## Overview
//!
//! Input is parsed with a standards-compliant HTML5 parser and the resulting tree
//! is re-serialized, emitting only the elements, attributes and URL schemes a
//! [`Config`] allows. Everything else is removed while its text content is
//! kept, and all text and attribute values are entity-encoded. The output is
//! always well-formed and safe to embed in an HTML document.
//!
//! Four presets are provided: [`Config::new`] (text only),
//! [`Config::restricted`], [`Config::basic`] and [`Config::relaxed`].
//!
//! ## Quick start
//!
//! ```rust
//! use html_sanitize::{Config, Sanitizer};
//!
//! let html = r#"<b><a href="http://foo.com/">foo</a></b><img src="http://foo.com/bar.jpg">"#;
//!
//! assert_eq!(html_sanitize::sanitize(html, &Config::new()).unwrap(), "foo");
//! assert_eq!(
//!     Sanitizer::restricted().sanitize(html).unwrap(),
//!     "<b>foo</b>"
//! );
//! assert_eq!(
//!     Sanitizer::basic().sanitize(html).unwrap(),
//!     r#"<b><a href="http://foo.com/" rel="nofollow">foo</a></b>"#
//! );
//! ```
//!
//! Build a [`Sanitizer`] once and reuse it when sanitizing many inputs with
//! the same configuration; the free functions compile the config on every
//! call.
//!
//! ## Feature flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `serde` | **yes** | `Deserialize`/`Serialize` for [`Config`] and [`Whitespace`] with camelCase keys. |

pub mod config;
pub mod dom;
pub mod entities;
pub mod error;
pub mod policy;
pub mod sanitizer;

pub use config::{ALL, Config, RELATIVE, Whitespace};
pub use error::{EncodingError, Result, SanitizeError};
pub use policy::{Policy, ProtocolSet};
pub use sanitizer::Sanitizer;

/// Sanitize untrusted markup. Equivalent to [`fragment`].
pub fn sanitize(html: &str, config: &Config) -> Result<String> {
    Sanitizer::new(config).sanitize(html)
}

/// Sanitize a markup fragment.
pub fn fragment(html: &str, config: &Config) -> Result<String> {
    Sanitizer::new(config).fragment(html)
}

/// Sanitize a full HTML document.
pub fn document(html: &str, config: &Config) -> Result<String> {
    Sanitizer::new(config).document(html)
}
