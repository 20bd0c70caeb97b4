//! Character scanning helpers for the USFM tokenizer
//!
//! Byte offsets are used throughout: every delimiter the tokenizer looks for
//! (`\`, `|`, `*`) is ASCII, so byte searches never split a character.
//! [`CharNavigator`] converts offsets to 1-based line/column positions as
//! the tokenizer moves forward.

use crate::utils::text::{is_nonsemantic_whitespace, ZERO_WIDTH_SPACE};

/// Forward-only line/column tracker
///
/// Positions requested through [`CharNavigator::advance_to`] must not
/// decrease; each character of the source is visited once.
#[derive(Debug, Clone)]
pub struct CharNavigator<'a> {
    /// Source text being scanned
    source: &'a str,
    /// Current byte position in source
    position: usize,
    /// Current line number (1-based)
    line: usize,
    /// Current column number (1-based)
    column: usize,
}

impl<'a> CharNavigator<'a> {
    /// Create new character navigator at the start of `source`
    #[must_use]
    pub const fn new(source: &'a str) -> Self {
        Self {
            source,
            position: 0,
            line: 1,
            column: 1,
        }
    }

    /// Get current position
    #[must_use]
    pub const fn position(&self) -> usize {
        self.position
    }

    /// Get current line
    #[must_use]
    pub const fn line(&self) -> usize {
        self.line
    }

    /// Get current column
    #[must_use]
    pub const fn column(&self) -> usize {
        self.column
    }

    /// Move forward to `target` and return its line and column
    ///
    /// Targets behind the current position return the current position.
    pub fn advance_to(&mut self, target: usize) -> (usize, usize) {
        let target = target.min(self.source.len());
        if target > self.position {
            let mut chars = self.source[self.position..target].chars().peekable();
            while let Some(c) = chars.next() {
                match c {
                    '\n' => {
                        self.line += 1;
                        self.column = 1;
                    }
                    '\r' => {
                        let crlf = chars.peek().map_or_else(
                            || self.source[target..].starts_with('\n'),
                            |&next| next == '\n',
                        );
                        if !crlf {
                            self.line += 1;
                            self.column = 1;
                        }
                    }
                    _ => self.column += 1,
                }
            }
            self.position = target;
        }
        (self.line, self.column)
    }
}

/// Character at a byte offset
#[must_use]
pub fn char_at(text: &str, index: usize) -> Option<char> {
    text.get(index..).and_then(|rest| rest.chars().next())
}

/// Byte offset of the next backslash strictly after `index`
///
/// Returns the text length when there is none.
#[must_use]
pub fn next_marker_index(text: &str, index: usize) -> usize {
    if index + 1 >= text.len() {
        return text.len();
    }
    text.as_bytes()[index + 1..]
        .iter()
        .position(|&b| b == b'\\')
        .map_or(text.len(), |pos| index + 1 + pos)
}

/// Byte offset of the next backslash at or after `index`
#[must_use]
pub fn next_backslash_from(text: &str, index: usize) -> Option<usize> {
    text.as_bytes()
        .get(index..)?
        .iter()
        .position(|&b| b == b'\\')
        .map(|pos| index + pos)
}

/// Convert control characters to spaces and collapse whitespace runs
///
/// A zero-width space followed by whitespace is redundant and dropped.
/// Ideographic spaces are content and are never collapsed.
#[must_use]
pub fn regularize_spaces(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut was_space = false;
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        if (c as u32) < 32 {
            if !was_space {
                result.push(' ');
            }
            was_space = true;
        } else if !was_space
            && c == ZERO_WIDTH_SPACE
            && chars.peek().is_some_and(|&next| is_nonsemantic_whitespace(next))
        {
            continue;
        } else if is_nonsemantic_whitespace(c) {
            if !was_space {
                result.push(c);
            }
            was_space = true;
        } else {
            result.push(c);
            was_space = false;
        }
    }
    result
}

/// Read the word following a marker and advance past it
///
/// Leading whitespace is skipped; trailing whitespace is skipped too unless
/// whitespace is preserved.
pub fn get_next_word<'t>(text: &'t str, index: &mut usize, preserve_whitespace: bool) -> &'t str {
    *index = skip_nonsemantic_whitespace(text, *index);
    let start = *index;
    while let Some(c) = char_at(text, *index) {
        if is_nonsemantic_whitespace(c) || c == '\\' {
            break;
        }
        *index += c.len_utf8();
    }
    let word = &text[start..*index];
    if !preserve_whitespace {
        *index = skip_nonsemantic_whitespace(text, *index);
    }
    word
}

/// Skip non-semantic whitespace starting at `index`
#[must_use]
pub fn skip_nonsemantic_whitespace(text: &str, mut index: usize) -> usize {
    while let Some(c) = char_at(text, index) {
        if !is_nonsemantic_whitespace(c) {
            break;
        }
        index += c.len_utf8();
    }
    index
}

/// If the marker at `marker_index` is an end marker, return its start name
///
/// `\w*` yields `"w"` and a bare `\*` yields `""`.
#[must_use]
pub fn before_end_marker(text: &str, marker_index: usize) -> Option<&str> {
    let start = marker_index + 1;
    let rest = text.get(start..)?;
    let end = rest
        .char_indices()
        .find(|&(_, c)| c == '*' || c.is_whitespace())
        .map(|(i, _)| i)?;
    rest[end..].starts_with('*').then_some(&rest[..end])
}

/// Check if the next marker at or after `index` is the milestone closer `\*`
#[must_use]
pub fn milestone_ended(text: &str, index: usize) -> bool {
    next_backslash_from(text, index).is_some_and(|pos| text[pos..].starts_with("\\*"))
}
