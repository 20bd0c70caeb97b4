//! Text helpers shared by the tokenizer and the CLI
//!
//! USFM whitespace rules differ from `char::is_whitespace`: the ideographic
//! space (U+3000) is content and the zero-width space behaves like a
//! separator.
//!
//! # Example
//!
//! ```rust
//! use usfm_core::utils::text::strip_bom;
//!
//! let (stripped, had_bom) = strip_bom("\u{FEFF}\\id MAT");
//! assert_eq!(stripped, "\\id MAT");
//! assert!(had_bom);
//! ```

/// Zero-width space
pub const ZERO_WIDTH_SPACE: char = '\u{200B}';

/// Ideographic space, never collapsed
pub const IDEOGRAPHIC_SPACE: char = '\u{3000}';

/// No-break space produced from `~`
pub const NO_BREAK_SPACE: char = '\u{00A0}';

/// Strip a leading UTF-8 byte order mark
///
/// Returns the remaining text and whether a BOM was present.
#[must_use]
pub fn strip_bom(text: &str) -> (&str, bool) {
    text.strip_prefix('\u{FEFF}')
        .map_or((text, false), |rest| (rest, true))
}

/// Whitespace that may be collapsed when regularizing a text run
#[must_use]
pub fn is_nonsemantic_whitespace(c: char) -> bool {
    (c != IDEOGRAPHIC_SPACE && c.is_whitespace()) || c == ZERO_WIDTH_SPACE
}

/// Whitespace that separates a marker from its data
#[must_use]
pub fn is_marker_whitespace(c: char) -> bool {
    c.is_whitespace()
}
