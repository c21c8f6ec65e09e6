//! Removal of code points that render inconsistently across browsers.
//!
//! See the W3C "Unicode in XML and other Markup Languages" character list.

use std::borrow::Cow;

/// Strip unsuitable code points from raw markup before it is parsed.
///
/// This is a plain character deletion, not an HTML-aware pass. The input is
/// borrowed unchanged when nothing needs removing.
pub fn strip_unsuitable(html: &str) -> Cow<'_, str> {
    if html.chars().any(is_unsuitable) {
        Cow::Owned(html.chars().filter(|&c| !is_unsuitable(c)).collect())
    } else {
        Cow::Borrowed(html)
    }
}

fn is_unsuitable(c: char) -> bool {
    matches!(
        c,
        // deprecated grave and acute clones
        '\u{0340}' | '\u{0341}'
        // deprecated Khmer
        | '\u{17A3}' | '\u{17D3}'
        // line and paragraph separators
        | '\u{2028}' | '\u{2029}'
        // bidi embedding controls
        | '\u{202A}'..='\u{202E}'
        // symmetric swapping, Arabic form shaping, national digit shapes
        | '\u{206A}'..='\u{206F}'
        // interlinear annotation
        | '\u{FFF9}'..='\u{FFFB}'
        | '\u{FEFF}'
        | '\u{FFFC}'
        // musical notation scoping
        | '\u{1D173}'..='\u{1D17A}'
        // language tags
        | '\u{E0000}'..='\u{E007F}'
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_input_is_borrowed() {
        let html = "<p>plain ünïcödé</p>";
        assert!(matches!(strip_unsuitable(html), Cow::Borrowed(_)));
    }

    #[test]
    fn strips_combining_clones_and_khmer() {
        assert_eq!(strip_unsuitable("a\u{340}b\u{341}c"), "abc");
        assert_eq!(strip_unsuitable("a\u{17a3}b\u{17d3}c"), "abc");
    }

    #[test]
    fn strips_separators_and_bidi_controls() {
        assert_eq!(strip_unsuitable("a\u{2028}b\u{2029}c"), "abc");
        assert_eq!(strip_unsuitable("a\u{202a}b\u{202b}c\u{202c}d\u{202d}e\u{202e}"), "abcde");
    }

    #[test]
    fn strips_deprecated_format_controls() {
        assert_eq!(strip_unsuitable("a\u{206a}b\u{206b}c"), "abc");
        assert_eq!(strip_unsuitable("a\u{206c}b\u{206d}c"), "abc");
        assert_eq!(strip_unsuitable("a\u{206e}b\u{206f}c"), "abc");
    }

    #[test]
    fn strips_annotation_bom_and_object_replacement() {
        assert_eq!(strip_unsuitable("a\u{fff9}b\u{fffa}c\u{fffb}"), "abc");
        assert_eq!(strip_unsuitable("a\u{feff}bc"), "abc");
        assert_eq!(strip_unsuitable("a\u{fffc}bc"), "abc");
    }

    #[test]
    fn strips_supplementary_plane_ranges() {
        let musical: String = ('\u{1D173}'..='\u{1D17A}')
            .zip("bcdefghi".chars())
            .flat_map(|(m, c)| [m, c])
            .collect();
        assert_eq!(strip_unsuitable(&format!("a{musical}")), "abcdefghi");

        let tags: String = ('\u{E0000}'..='\u{E007F}').collect();
        assert_eq!(strip_unsuitable(&format!("a{tags}b")), "ab");
    }

    #[test]
    fn keeps_neighbouring_code_points() {
        let kept = "\u{33f}\u{342}\u{2027}\u{202f}\u{2069}\u{fff8}\u{fffd}\u{1d172}\u{1d17b}\u{e0080}";
        assert_eq!(strip_unsuitable(kept), kept);
    }
}
