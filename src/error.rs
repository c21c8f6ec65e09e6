//! Error types for the `html_sanitize` crate.

/// A value contained a code point that strict entity encoding refuses to emit.
///
/// Raised instead of producing output that a browser could interpret in more
/// than one way.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Cannot encode forbidden code point U+{code_point:04X} at byte offset {offset}")]
pub struct EncodingError {
    /// The offending code point.
    pub code_point: u32,
    /// Byte offset of the code point within the encoded value.
    pub offset: usize,
}

/// All errors that can occur while sanitizing HTML.
///
/// Malformed markup, unknown configuration names and rejected attributes are
/// never errors; they are silently dropped.
#[derive(Debug, thiserror::Error)]
pub enum SanitizeError {
    /// Text or an attribute value could not be encoded in strict mode.
    #[error(transparent)]
    Encoding(#[from] EncodingError),
}

/// A type alias for `Result<T, SanitizeError>`.
pub type Result<T> = std::result::Result<T, SanitizeError>;
